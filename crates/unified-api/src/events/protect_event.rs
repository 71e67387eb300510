// Category events from `subscribe/events`, discriminated by `item.type`.

use serde::{Deserialize, Serialize};

/// `{"text": ...}` wrapper used in sensor metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextObject {
    pub text: String,
}

/// `{"number": ...}` wrapper used in sensor metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatNumberObject {
    pub number: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtremeValuesMetadata {
    pub sensor_type: TextObject,
    pub sensor_value: TextObject,
    pub status: TextObject,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MountTypeMetadata {
    pub sensor_mount_type: TextObject,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatteryLowMetadata {
    pub sensor_battery_percentage: FloatNumberObject,
}

/// Declares event payloads sharing the common event fields
/// `{id, modelKey, type, start, end, device}`.
macro_rules! event_payloads {
    ($( $(#[$meta:meta])* $name:ident { $( $field:ident : $ty:ty ),* $(,)? } )+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            #[serde(rename_all = "camelCase", default)]
            pub struct $name {
                pub id: String,
                pub model_key: String,
                #[serde(rename = "type")]
                pub event_type: String,
                /// Epoch milliseconds.
                pub start: Option<i64>,
                pub end: Option<i64>,
                /// ID of the device that raised the event.
                pub device: String,
                $( pub $field: $ty, )*
            }
        )+
    };
}

event_payloads! {
    /// Doorbell ring.
    RingEvent {}
    SensorExtremeValuesEvent { metadata: ExtremeValuesMetadata }
    SensorWaterLeakEvent { metadata: MountTypeMetadata }
    SensorTamperEvent {}
    SensorBatteryLowEvent { metadata: BatteryLowMetadata }
    SensorAlarmEvent {}
    SensorOpenedEvent { metadata: MountTypeMetadata }
    SensorClosedEvent { metadata: MountTypeMetadata }
    SensorMotionEvent { metadata: MountTypeMetadata }
    LightMotionEvent { metadata: MountTypeMetadata }
    CameraMotionEvent { metadata: MountTypeMetadata }
    SmartAudioDetectEvent { smart_detect_types: Vec<String> }
    SmartDetectZoneEvent { smart_detect_types: Vec<String> }
    SmartDetectLineEvent { smart_detect_types: Vec<String> }
    SmartDetectLoiterZoneEvent { smart_detect_types: Vec<String> }
}

event_union! {
    /// Message from the Protect event stream.
    envelope ProtectEvent, item ProtectEventItem, kind ProtectEventKind,
    discriminator "type";
    "ring" => Ring(RingEvent),
    "sensorExtremeValues" => SensorExtremeValues(SensorExtremeValuesEvent),
    "sensorWaterLeak" => SensorWaterLeak(SensorWaterLeakEvent),
    "sensorTamper" => SensorTamper(SensorTamperEvent),
    "sensorBatteryLow" => SensorBatteryLow(SensorBatteryLowEvent),
    "sensorAlarm" => SensorAlarm(SensorAlarmEvent),
    "sensorOpened" => SensorOpened(SensorOpenedEvent),
    "sensorClosed" => SensorClosed(SensorClosedEvent),
    "sensorMotion" => SensorMotion(SensorMotionEvent),
    "lightMotion" => LightMotion(LightMotionEvent),
    /// Camera motion; wire value `motion`.
    "motion" => CameraMotion(CameraMotionEvent),
    "smartAudioDetect" => SmartAudioDetect(SmartAudioDetectEvent),
    "smartDetectZone" => SmartDetectZone(SmartDetectZoneEvent),
    "smartDetectLine" => SmartDetectLine(SmartDetectLineEvent),
    "smartDetectLoiterZone" => SmartDetectLoiterZone(SmartDetectLoiterZoneEvent),
}
