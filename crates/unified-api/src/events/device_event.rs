// Device updates from `subscribe/devices`, discriminated by `item.modelKey`.
//
// Updates are partial: only `id` and `modelKey` are guaranteed. Everything
// beyond the common fields is kept in `extra`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

macro_rules! device_payloads {
    ($( $(#[$meta:meta])* $name:ident )+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            #[serde(rename_all = "camelCase")]
            pub struct $name {
                pub id: String,
                pub model_key: String,
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub name: Option<String>,
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub state: Option<String>,
                #[serde(flatten)]
                pub extra: HashMap<String, serde_json::Value>,
            }
        )+
    };
}

device_payloads! {
    NvrDevice
    CameraDevice
    ChimeDevice
    LightDevice
    ViewerDevice
    SpeakerDevice
    BridgeDevice
    DoorlockDevice
    SensorDevice
    AiProcessorDevice
    AiPortDevice
    LinkStationDevice
}

event_union! {
    /// Message from the Protect device stream.
    envelope ProtectDeviceEvent, item ProtectDeviceItem, kind DeviceModelKind,
    discriminator "modelKey";
    "nvr" => Nvr(NvrDevice),
    "camera" => Camera(CameraDevice),
    "chime" => Chime(ChimeDevice),
    "light" => Light(LightDevice),
    "viewer" => Viewer(ViewerDevice),
    "speaker" => Speaker(SpeakerDevice),
    "bridge" => Bridge(BridgeDevice),
    "doorlock" => Doorlock(DoorlockDevice),
    "sensor" => Sensor(SensorDevice),
    "aiprocessor" => AiProcessor(AiProcessorDevice),
    "aiport" => AiPort(AiPortDevice),
    "linkstation" => LinkStation(LinkStationDevice),
}
