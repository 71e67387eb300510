//! Polymorphic event envelopes for the Protect WebSocket streams.
//!
//! Both streams wrap a polymorphic item in `{"type": <action>, "item": {...}}`.
//! The item's concrete shape is selected by one discriminator field
//! (`type` for category events, `modelKey` for device updates). Decoding is
//! two-phase: capture the raw item, probe the discriminator, then decode the
//! raw item into the matching payload. Unknown discriminators fail the
//! decode; an envelope is never partially populated.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::Deserialize;
use serde_json::value::RawValue;
use strum::IntoEnumIterator;

use crate::error::Error;

/// A decodable stream envelope with a closed set of item kinds.
pub trait StreamEnvelope: Debug + Send + Sync + Sized + 'static {
    /// Fieldless mirror of the item enum.
    type Kind: Copy + Eq + Hash + Debug + Display + Send + Sync + IntoEnumIterator + 'static;

    /// Wire name of the discriminator field inside `item`.
    const DISCRIMINATOR: &'static str;

    fn decode(bytes: &[u8]) -> Result<Self, Error>;

    /// Envelope action, e.g. `add` or `update`.
    fn action(&self) -> &str;

    fn kind(&self) -> Self::Kind;

    fn item_id(&self) -> &str;
}

/// One payload type of a [`StreamEnvelope`], used for typed handler
/// registration.
pub trait EventVariant<E: StreamEnvelope>: Clone + Send + Sync + 'static {
    const KIND: E::Kind;

    /// Borrow this payload out of `envelope` if it holds this kind.
    fn project(envelope: &E) -> Option<&Self>;
}

/// First decoding phase: the action and the still-encoded item.
#[derive(Debug, Deserialize)]
pub(crate) struct WireEnvelope {
    #[serde(rename = "type")]
    pub action: String,
    pub item: Box<RawValue>,
}

impl WireEnvelope {
    pub(crate) fn decode(bytes: &[u8]) -> Result<Self, Error> {
        crate::client::decode(bytes)
    }
}

/// Generates a closed event union and its envelope.
///
/// ```ignore
/// event_union! {
///     envelope ProtectEvent, item ProtectEventItem, kind ProtectEventKind,
///     discriminator "type";
///     "ring" => Ring(RingEvent),
/// }
/// ```
///
/// Emits the item enum, the `Kind` enum with `tag()`/`from_tag()`, the
/// envelope struct with its two-phase decoder, and an [`EventVariant`] impl
/// per payload. Each payload type may appear in only one variant.
macro_rules! event_union {
    (
        $(#[$env_meta:meta])*
        envelope $envelope:ident, item $item:ident, kind $kind:ident,
        discriminator $field:literal;
        $( $(#[$var_meta:meta])* $tag:literal => $variant:ident($payload:ty), )+
    ) => {
        /// Decoded item, one variant per discriminator value.
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize)]
        #[serde(untagged)]
        pub enum $item {
            $( $(#[$var_meta])* $variant($payload), )+
        }

        /// Discriminator of a stream item.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::strum::EnumIter, ::strum::IntoStaticStr,
        )]
        pub enum $kind {
            $( $variant, )+
        }

        impl $kind {
            /// Wire value of this discriminator.
            pub const fn tag(self) -> &'static str {
                match self {
                    $( Self::$variant => $tag, )+
                }
            }

            pub fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $( $tag => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for $kind {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.tag())
            }
        }

        impl ::std::str::FromStr for $kind {
            type Err = $crate::error::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_tag(s).ok_or_else(|| $crate::error::Error::UnknownDiscriminator {
                    field: $field,
                    value: s.to_owned(),
                })
            }
        }

        impl $item {
            pub fn kind(&self) -> $kind {
                match self {
                    $( Self::$variant(_) => $kind::$variant, )+
                }
            }

            fn decode_as(kind: $kind, raw: &::serde_json::value::RawValue) -> Result<Self, $crate::error::Error> {
                match kind {
                    $(
                        $kind::$variant => $crate::client::decode::<$payload>(raw.get().as_bytes())
                            .map(Self::$variant),
                    )+
                }
            }
        }

        $(#[$env_meta])*
        #[derive(Debug, Clone, ::serde::Serialize)]
        pub struct $envelope {
            /// Envelope action, wire key `type`.
            #[serde(rename = "type")]
            pub action: String,
            /// Discriminator value read from the item.
            #[serde(skip)]
            pub item_type: String,
            /// Item exactly as received.
            #[serde(rename = "item")]
            pub raw_item: Box<::serde_json::value::RawValue>,
            #[serde(skip)]
            pub item: $item,
        }

        impl $crate::events::StreamEnvelope for $envelope {
            type Kind = $kind;

            const DISCRIMINATOR: &'static str = $field;

            fn decode(bytes: &[u8]) -> Result<Self, $crate::error::Error> {
                #[derive(::serde::Deserialize)]
                struct Probe {
                    #[serde(rename = $field)]
                    discriminator: String,
                }

                let wire = $crate::events::WireEnvelope::decode(bytes)?;
                let probe: Probe = $crate::client::decode(wire.item.get().as_bytes())?;
                let kind = $kind::from_tag(&probe.discriminator).ok_or_else(|| {
                    $crate::error::Error::UnknownDiscriminator {
                        field: $field,
                        value: probe.discriminator.clone(),
                    }
                })?;
                let item = $item::decode_as(kind, &wire.item)?;

                Ok(Self {
                    action: wire.action,
                    item_type: probe.discriminator,
                    raw_item: wire.item,
                    item,
                })
            }

            fn action(&self) -> &str {
                &self.action
            }

            fn kind(&self) -> $kind {
                self.item.kind()
            }

            fn item_id(&self) -> &str {
                match &self.item {
                    $( $item::$variant(payload) => &payload.id, )+
                }
            }
        }

        $(
            impl $crate::events::EventVariant<$envelope> for $payload {
                const KIND: $kind = $kind::$variant;

                #[allow(unreachable_patterns)]
                fn project(envelope: &$envelope) -> Option<&Self> {
                    match &envelope.item {
                        $item::$variant(payload) => Some(payload),
                        _ => None,
                    }
                }
            }
        )+
    };
}

mod device_event;
mod protect_event;

pub use device_event::*;
pub use protect_event::*;
