// Network application types, from `/proxy/network/integration/v1/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Application ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkInfo {
    pub application_version: String,
}

// ── Sites ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Site {
    pub id: String,
    pub name: String,
}

// ── Devices ──────────────────────────────────────────────────────────

/// Row of `GET sites/{site}/devices`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceListEntry {
    pub id: String,
    pub name: String,
    pub model: String,
    pub mac_address: String,
    pub ip_address: String,
    pub state: String,
    pub features: Vec<String>,
    pub interfaces: Vec<String>,
}

/// Adopted device details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub model: String,
    pub supported: bool,
    pub mac_address: String,
    pub ip_address: String,
    pub state: String,
    pub firmware_version: String,
    pub firmware_updatable: bool,
    pub adopted_at: Option<DateTime<Utc>>,
    pub provisioned_at: Option<DateTime<Utc>>,
    pub configuration_id: String,
    pub uplink: DeviceUplink,
    pub features: serde_json::Value,
    pub interfaces: DeviceInterfaces,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceUplink {
    pub device_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceInterfaces {
    pub ports: Vec<DevicePort>,
    pub radios: Vec<DeviceRadio>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DevicePort {
    pub idx: u32,
    pub state: String,
    pub connector: String,
    pub max_speed_mbps: u32,
    pub speed_mbps: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceRadio {
    pub wlan_standard: String,
    /// Documented as a string, sent as a number.
    #[serde(rename = "frequencyGHz")]
    pub frequency_ghz: f64,
    #[serde(rename = "channelWidthMHz")]
    pub channel_width_mhz: u32,
    pub channel: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceStatistics {
    pub uptime_sec: i64,
    pub last_heartbeat_at: Option<DateTime<Utc>>,
    pub next_heartbeat_at: Option<DateTime<Utc>>,
    pub load_average_1_min: f64,
    pub load_average_5_min: f64,
    pub load_average_15_min: f64,
    pub cpu_utilization_pct: f64,
    pub memory_utilization_pct: f64,
    pub uplink: UplinkStatistics,
    pub interfaces: InterfaceStatistics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UplinkStatistics {
    pub tx_rate_bps: i64,
    pub rx_rate_bps: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterfaceStatistics {
    pub radios: Vec<RadioStatistics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RadioStatistics {
    #[serde(rename = "frequencyGHz")]
    pub frequency_ghz: f64,
    pub tx_retries_pct: f64,
}

/// Device action body. Valid actions include `RESTART`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceActionRequest {
    pub action: String,
}

/// Port action body. Valid actions include `POWER_CYCLE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevicePortActionRequest {
    pub action: String,
}

// ── Clients ──────────────────────────────────────────────────────────

/// Connected client. Named to avoid clashing with [`crate::Client`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkClient {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub connected_at: Option<DateTime<Utc>>,
    pub ip_address: String,
    pub mac_address: String,
}

/// Client action body, e.g. `AUTHORIZE_GUEST_ACCESS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientActionRequest {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_usage_limit_m_bytes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_rate_limit_kbps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_rate_limit_kbps: Option<u32>,
}

impl ClientActionRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            time_limit_minutes: None,
            data_usage_limit_m_bytes: None,
            rx_rate_limit_kbps: None,
            tx_rate_limit_kbps: None,
        }
    }
}

// ── Hotspot vouchers ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Voucher {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub name: String,
    pub code: String,
    pub authorized_guest_limit: Option<u32>,
    pub authorized_guest_count: u32,
    pub activated_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
    pub time_limit_minutes: u32,
    pub data_usage_limit_m_bytes: Option<u32>,
    pub rx_rate_limit_kbps: Option<u32>,
    pub tx_rate_limit_kbps: Option<u32>,
}

/// Body of `POST sites/{site}/hotspot/vouchers`. Zero limits are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherGenerateRequest {
    pub count: u32,
    pub name: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub authorized_guest_limit: u32,
    pub time_limit_minutes: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub data_usage_limit_m_bytes: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub rx_rate_limit_kbps: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub tx_rate_limit_kbps: u32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &u32) -> bool {
    *n == 0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoucherGenerateResponse {
    pub vouchers: Vec<Voucher>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoucherDeleteResponse {
    pub deleted_count: u32,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn device_decodes_from_partial_body() {
        let device: Device = serde_json::from_str(r#"{"id":"device-9","name":"AP1"}"#).unwrap();
        assert_eq!(device.id, "device-9");
        assert_eq!(device.name, "AP1");
        assert!(device.adopted_at.is_none());
    }

    #[test]
    fn radio_frequency_is_numeric() {
        let radio: DeviceRadio = serde_json::from_str(
            r#"{"wlanStandard":"802.11ax","frequencyGHz":5.0,"channelWidthMHz":80,"channel":36}"#,
        )
        .unwrap();
        assert!((radio.frequency_ghz - 5.0).abs() < f64::EPSILON);
        assert_eq!(radio.channel_width_mhz, 80);
    }

    #[test]
    fn voucher_request_omits_zero_limits() {
        let req = VoucherGenerateRequest {
            count: 2,
            name: "guests".into(),
            time_limit_minutes: 60,
            ..Default::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"count": 2, "name": "guests", "timeLimitMinutes": 60})
        );
    }
}
