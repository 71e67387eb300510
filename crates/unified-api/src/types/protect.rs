// Protect application types, from `/proxy/protect/integration/v1/`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProtectInfo {
    pub application_version: String,
}

// ── Cameras ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Camera {
    pub id: String,
    pub model_key: String,
    pub state: String,
    pub name: String,
    pub is_mic_enabled: bool,
    pub osd_settings: OsdSettings,
    pub led_settings: LedSettings,
    pub lcd_message: Option<LcdMessage>,
    pub mic_volume: u32,
    pub active_patrol_slot: Option<u8>,
    pub video_mode: String,
    pub hdr_type: String,
    pub feature_flags: CameraFeatureFlags,
    pub smart_detect_settings: SmartDetectSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsdSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_name_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_date_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_logo_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_debug_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
}

/// Doorbell LCD message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcdMessage {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraFeatureFlags {
    pub support_full_hd_snapshot: bool,
    pub has_hdr: bool,
    pub smart_detect_types: Vec<String>,
    pub smart_detect_audio_types: Vec<String>,
    pub video_modes: Vec<String>,
    pub has_mic: bool,
    pub has_led_status: bool,
    pub has_speaker: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartDetectSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_types: Option<Vec<String>>,
}

/// Partial camera update. Unset fields are left untouched by the console.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraPatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osd_settings: Option<OsdSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub led_settings: Option<LedSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lcd_message: Option<LcdMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mic_volume: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdr_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smart_detect_settings: Option<SmartDetectSettings>,
}

/// RTSPS stream quality.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StreamQuality {
    High,
    Medium,
    Low,
    Package,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtspsStreamRequest {
    pub qualities: Vec<StreamQuality>,
}

/// RTSPS URLs per quality; absent qualities have no stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtspsStreams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TalkbackSession {
    pub url: String,
    pub codec: String,
    pub sampling_rate: u32,
    pub bits_per_sample: u32,
}

/// PTZ patrol or preset slot, valid in `0..4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotNumber(u8);

impl SlotNumber {
    pub const MAX: u8 = 4;

    pub fn new(slot: i64) -> Result<Self, Error> {
        u8::try_from(slot)
            .ok()
            .filter(|s| *s < Self::MAX)
            .map(Self)
            .ok_or(Error::SlotOutOfRange(slot))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for SlotNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Viewers & live views ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Viewer {
    pub id: String,
    pub model_key: String,
    pub state: String,
    pub name: String,
    pub liveview: Option<String>,
    pub stream_limit: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerSettingsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveview: Option<String>,
}

/// Live view layout. Also the body of create and patch requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_key: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub layout: u32,
    #[serde(default)]
    pub slots: Vec<LiveViewSlot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveViewSlot {
    pub cameras: Vec<String>,
    pub cycle_mode: String,
    pub cycle_interval: u32,
}

// ── Lights ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Light {
    pub id: String,
    pub model_key: String,
    pub state: String,
    pub name: String,
    pub light_mode_settings: LightModeSettings,
    pub light_device_settings: LightDeviceSettings,
    pub is_dark: bool,
    pub is_light_on: bool,
    pub is_light_force_enabled: bool,
    pub last_motion: Option<i64>,
    pub is_pir_motion_detected: bool,
    pub camera: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightModeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightDeviceSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_indicator_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pir_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pir_sensitivity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub led_level: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightPatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_light_force_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_mode_settings: Option<LightModeSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_device_settings: Option<LightDeviceSettings>,
}

// ── NVR ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Nvr {
    pub id: String,
    pub model_key: String,
    pub name: String,
    pub doorbell_settings: DoorbellSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoorbellSettings {
    pub default_message_text: String,
    pub default_message_reset_timeout_ms: u64,
    pub custom_messages: Vec<String>,
    pub custom_images: Vec<DoorbellImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoorbellImage {
    pub preview: String,
    pub sprite: String,
}

// ── Chimes ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Chime {
    pub id: String,
    pub model_key: String,
    pub state: String,
    pub name: String,
    pub camera_ids: Vec<String>,
    pub ring_settings: Vec<RingSetting>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingSetting {
    #[serde(default)]
    pub camera_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_times: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ringtone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChimePatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ring_settings: Option<Vec<RingSetting>>,
}

// ── Sensors ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sensor {
    pub id: String,
    pub model_key: String,
    pub state: String,
    pub name: String,
    pub mount_type: String,
    pub battery_status: BatteryStatus,
    pub stats: SensorStats,
    pub light_settings: SensorThresholds,
    pub humidity_settings: SensorThresholds,
    pub temperature_settings: SensorThresholds,
    pub is_opened: bool,
    pub open_status_changed_at: Option<i64>,
    pub is_motion_detected: bool,
    pub motion_detected_at: Option<i64>,
    pub motion_settings: MotionSettings,
    pub alarm_triggered_at: Option<i64>,
    pub alarm_settings: AlarmSettings,
    pub leak_detected_at: Option<i64>,
    pub tampering_detected_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatteryStatus {
    pub percentage: Option<u8>,
    pub is_low: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SensorStats {
    pub light: SensorReading,
    pub humidity: SensorReading,
    pub temperature: SensorReading,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SensorReading {
    pub value: Option<f64>,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorPatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_settings: Option<SensorThresholds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_settings: Option<SensorThresholds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_settings: Option<SensorThresholds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion_settings: Option<MotionSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_settings: Option<AlarmSettings>,
}

// ── Device assets ────────────────────────────────────────────────────

/// Category of device asset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum FileType {
    #[default]
    Animations,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetFile {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub original_name: String,
    pub path: String,
}

/// Extensions the asset store accepts, with their upload content types.
pub const UPLOAD_CONTENT_TYPES: &[(&str, &str)] = &[
    ("gif", "image/gif"),
    ("jpg", "image/jpeg"),
    ("png", "image/png"),
    ("mp3", "audio/mpeg"),
    ("mp4", "audio/mp4"),
    ("wav", "audio/wave"),
    ("caf", "audio/x-caf"),
];

/// Content type for an upload, chosen by file extension.
pub fn upload_content_type(filename: &str) -> Result<&'static str, Error> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    UPLOAD_CONTENT_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, content_type)| *content_type)
        .ok_or_else(|| Error::UnsupportedFileType {
            extension: extension.to_owned(),
            accepted: UPLOAD_CONTENT_TYPES
                .iter()
                .map(|(ext, _)| *ext)
                .collect::<Vec<_>>()
                .join(", "),
        })
}
