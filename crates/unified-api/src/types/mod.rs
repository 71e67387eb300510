//! Request and response types for the Network and Protect integration APIs.
//!
//! Field names follow the wire format via `#[serde(rename_all = "camelCase")]`.
//! Response structs default every missing field: the consoles omit fields
//! freely across firmware versions.

pub mod network;
pub mod protect;

use serde::{Deserialize, Serialize};

pub use network::*;
pub use protect::*;

/// Declares string identifier newtypes that serialize transparently.
macro_rules! string_ids {
    ($($(#[$meta:meta])* $name:ident;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub String);

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $name {
                fn from(id: &str) -> Self {
                    Self(id.to_owned())
                }
            }

            impl From<String> for $name {
                fn from(id: String) -> Self {
                    Self(id)
                }
            }
        )+
    };
}

string_ids! {
    SiteId;
    DeviceId;
    ClientId;
    VoucherId;
    /// Protect camera ID. Not a UUID.
    CameraId;
    ViewerId;
    LiveViewId;
    LightId;
    ChimeId;
    SensorId;
    AlarmTriggerId;
}

// ── Pagination ───────────────────────────────────────────────────────

/// Paged list returned by Network list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> Page<T> {
    /// Page metadata without the items.
    pub fn info(&self) -> PageInfo {
        PageInfo {
            offset: self.offset,
            limit: self.limit,
            count: self.count,
            total_count: self.total_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub offset: u32,
    pub limit: u32,
    pub count: u32,
    pub total_count: u32,
}
