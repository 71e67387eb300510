// Static endpoint registry for the Network and Protect integration APIs.
//
// Each application owns one immutable table. Operations are named by the
// closed `Endpoint` enum, so every typed method resolves its spec without a
// runtime lookup failure path.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Sub-application behind the console's `/proxy/{app}` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Application {
    Network,
    Protect,
}

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    WebSocket,
}

/// Request body encoding. Multipart carries its boundary at send time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Multipart,
}

/// One operation of a vendor API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, EnumIter)]
pub enum Endpoint {
    // ── Network ─────────────────────────────────────────────────────
    NetworkInfo,
    Sites,
    Clients,
    ClientDetails,
    ClientExecuteAction,
    Devices,
    DeviceDetails,
    DeviceStatistics,
    DeviceExecuteAction,
    DevicePortExecuteAction,
    Vouchers,
    VoucherDetails,
    VoucherGenerate,
    VoucherDelete,
    VoucherDeleteByFilter,

    // ── Protect ─────────────────────────────────────────────────────
    ProtectInfo,
    SubscribeProtectEvents,
    SubscribeDeviceEvents,
    Cameras,
    CameraDetails,
    CameraPatch,
    CameraCreateRtspsStream,
    CameraDeleteRtspsStream,
    CameraGetRtspsStream,
    CameraSnapshot,
    CameraDisableMicPermanently,
    CameraTalkbackSession,
    CameraPtzPatrolStart,
    CameraPtzPatrolStop,
    CameraPtzGoto,
    Viewers,
    ViewerDetails,
    ViewerSettings,
    LiveViews,
    LiveViewDetails,
    LiveViewCreate,
    LiveViewPatch,
    Lights,
    LightDetails,
    LightPatch,
    Nvrs,
    Chimes,
    ChimeDetails,
    ChimePatch,
    Sensors,
    SensorDetails,
    SensorPatch,
    Files,
    FileUpload,
    AlarmManagerWebhook,
}

impl Endpoint {
    /// The immutable spec for this operation.
    pub fn spec(self) -> &'static EndpointSpec {
        NETWORK
            .iter()
            .chain(PROTECT.iter())
            .find(|spec| spec.endpoint == self)
            .unwrap_or_else(|| panic!("endpoint {self} is not registered"))
    }
}

/// Everything needed to render and classify a call to one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    pub endpoint: Endpoint,
    /// Operation key within its application's registry.
    pub key: &'static str,
    pub application: Application,
    /// Path below `integration/v1/`, with one `%s` per path argument.
    pub path: &'static str,
    pub method: Method,
    pub expected_status: u16,
    pub protocol: Protocol,
    pub num_path_args: usize,
    /// Distinct query keys the operation accepts.
    pub num_query_args: usize,
    pub has_body: bool,
    pub content_type: ContentType,
    pub description: &'static str,
}

impl EndpointSpec {
    const fn new(
        endpoint: Endpoint,
        key: &'static str,
        application: Application,
        method: Method,
        path: &'static str,
        num_path_args: usize,
        description: &'static str,
    ) -> Self {
        Self {
            endpoint,
            key,
            application,
            path,
            method,
            expected_status: 200,
            protocol: Protocol::Http,
            num_path_args,
            num_query_args: 0,
            has_body: false,
            content_type: ContentType::Json,
            description,
        }
    }

    const fn status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    const fn query(mut self, count: usize) -> Self {
        self.num_query_args = count;
        self
    }

    const fn body(mut self) -> Self {
        self.has_body = true;
        self
    }

    const fn multipart(mut self) -> Self {
        self.has_body = true;
        self.content_type = ContentType::Multipart;
        self
    }

    const fn websocket(mut self) -> Self {
        self.protocol = Protocol::WebSocket;
        self
    }
}

/// Look up an operation by its registry key, e.g. `"DeviceDetails"`.
///
/// Keys are fixed at compile time by callers; a miss panics.
pub fn lookup(application: Application, key: &str) -> &'static EndpointSpec {
    registry(application)
        .iter()
        .find(|spec| spec.key == key)
        .unwrap_or_else(|| panic!("no {application} endpoint named {key:?}"))
}

/// The full table for one application.
pub fn registry(application: Application) -> &'static [EndpointSpec] {
    match application {
        Application::Network => &NETWORK,
        Application::Protect => &PROTECT,
    }
}

// ── Network ─────────────────────────────────────────────────────────

const fn network(
    endpoint: Endpoint,
    key: &'static str,
    method: Method,
    path: &'static str,
    num_path_args: usize,
    description: &'static str,
) -> EndpointSpec {
    EndpointSpec::new(
        endpoint,
        key,
        Application::Network,
        method,
        path,
        num_path_args,
        description,
    )
}

static NETWORK: [EndpointSpec; 15] = [
    network(Endpoint::NetworkInfo, "Info", Method::Get, "info", 0, "Get application information"),
    network(Endpoint::Sites, "Sites", Method::Get, "sites", 0, "List local sites managed by this Network application")
        .query(3),
    network(Endpoint::Clients, "Clients", Method::Get, "sites/%s/clients", 1, "List clients of a site")
        .query(3),
    network(Endpoint::ClientDetails, "ClientDetails", Method::Get, "sites/%s/clients/%s", 2, "Get client details"),
    network(
        Endpoint::ClientExecuteAction,
        "ClientExecuteAction",
        Method::Post,
        "sites/%s/clients/%s/actions",
        2,
        "Execute an action on a client",
    )
    .body(),
    network(Endpoint::Devices, "Devices", Method::Get, "sites/%s/devices", 1, "List adopted devices of a site")
        .query(2),
    network(Endpoint::DeviceDetails, "DeviceDetails", Method::Get, "sites/%s/devices/%s", 2, "Get device details"),
    network(
        Endpoint::DeviceStatistics,
        "DeviceStatistics",
        Method::Get,
        "sites/%s/devices/%s/statistics/latest",
        2,
        "Get latest device statistics",
    ),
    network(
        Endpoint::DeviceExecuteAction,
        "DeviceExecuteAction",
        Method::Post,
        "sites/%s/devices/%s/actions",
        2,
        "Execute an action on a device",
    )
    .body(),
    network(
        Endpoint::DevicePortExecuteAction,
        "DevicePortExecuteAction",
        Method::Post,
        "sites/%s/devices/%s/interfaces/ports/%s/actions",
        3,
        "Execute an action on a device port",
    )
    .body(),
    network(Endpoint::Vouchers, "Vouchers", Method::Get, "sites/%s/hotspot/vouchers", 1, "List vouchers of a site")
        .query(3),
    network(
        Endpoint::VoucherDetails,
        "VoucherDetails",
        Method::Get,
        "sites/%s/hotspot/vouchers/%s",
        2,
        "Get voucher details",
    ),
    network(Endpoint::VoucherGenerate, "VoucherGenerate", Method::Post, "sites/%s/hotspot/vouchers", 1, "Generate vouchers")
        .status(201)
        .body(),
    network(
        Endpoint::VoucherDelete,
        "VoucherDelete",
        Method::Delete,
        "sites/%s/hotspot/vouchers/%s",
        2,
        "Delete a voucher",
    ),
    network(
        Endpoint::VoucherDeleteByFilter,
        "VoucherDeleteByFilter",
        Method::Delete,
        "sites/%s/hotspot/vouchers",
        1,
        "Delete vouchers by filter",
    )
    .query(1),
];

// ── Protect ─────────────────────────────────────────────────────────

const fn protect(
    endpoint: Endpoint,
    key: &'static str,
    method: Method,
    path: &'static str,
    num_path_args: usize,
    description: &'static str,
) -> EndpointSpec {
    EndpointSpec::new(
        endpoint,
        key,
        Application::Protect,
        method,
        path,
        num_path_args,
        description,
    )
}

static PROTECT: [EndpointSpec; 35] = [
    protect(Endpoint::ProtectInfo, "Info", Method::Get, "meta/info", 0, "Get application information"),
    protect(
        Endpoint::SubscribeProtectEvents,
        "SubscribeProtectEvents",
        Method::Get,
        "subscribe/events",
        0,
        "Get Protect event messages",
    )
    .websocket(),
    protect(
        Endpoint::SubscribeDeviceEvents,
        "SubscribeDeviceEvents",
        Method::Get,
        "subscribe/devices",
        0,
        "Get Protect device updates",
    )
    .websocket(),
    // Cameras
    protect(Endpoint::Cameras, "Cameras", Method::Get, "cameras", 0, "Get all cameras"),
    protect(Endpoint::CameraDetails, "CameraDetails", Method::Get, "cameras/%s", 1, "Get camera details"),
    protect(Endpoint::CameraPatch, "CameraPatch", Method::Patch, "cameras/%s", 1, "Patch camera settings").body(),
    protect(
        Endpoint::CameraCreateRtspsStream,
        "CameraCreateRTSPSStream",
        Method::Post,
        "cameras/%s/rtsps-stream",
        1,
        "Create RTSPS streams for a camera",
    )
    .body(),
    protect(
        Endpoint::CameraDeleteRtspsStream,
        "CameraDeleteRTSPSStream",
        Method::Delete,
        "cameras/%s/rtsps-stream",
        1,
        "Delete RTSPS streams of a camera",
    )
    .query(1)
    .status(204),
    protect(
        Endpoint::CameraGetRtspsStream,
        "CameraGetRTSPSStream",
        Method::Get,
        "cameras/%s/rtsps-stream",
        1,
        "Get existing RTSPS streams of a camera",
    ),
    protect(Endpoint::CameraSnapshot, "CameraGetSnapshot", Method::Get, "cameras/%s/snapshot", 1, "Get a camera snapshot")
        .query(1),
    protect(
        Endpoint::CameraDisableMicPermanently,
        "CameraDisableMicPermanently",
        Method::Post,
        "cameras/%s/disable-mic-permanently",
        1,
        "Permanently disable a camera microphone",
    ),
    protect(
        Endpoint::CameraTalkbackSession,
        "CameraTalkbackSession",
        Method::Post,
        "cameras/%s/talkback-session",
        1,
        "Create a talkback session",
    ),
    protect(
        Endpoint::CameraPtzPatrolStart,
        "CameraPTZPatrolStart",
        Method::Post,
        "cameras/%s/ptz/patrol/start/%s",
        2,
        "Start a PTZ patrol",
    )
    .status(204),
    protect(
        Endpoint::CameraPtzPatrolStop,
        "CameraPTZPatrolStop",
        Method::Post,
        "cameras/%s/ptz/patrol/stop",
        1,
        "Stop the active PTZ patrol",
    )
    .status(204),
    protect(
        Endpoint::CameraPtzGoto,
        "CameraPTZGotoPresetPosition",
        Method::Post,
        "cameras/%s/ptz/goto/%s",
        2,
        "Move a PTZ camera to a preset position",
    )
    .status(204),
    // Viewers
    protect(Endpoint::Viewers, "Viewers", Method::Get, "viewers", 0, "Get all viewers"),
    protect(Endpoint::ViewerDetails, "ViewerDetails", Method::Get, "viewers/%s", 1, "Get viewer details"),
    protect(Endpoint::ViewerSettings, "ViewerSettings", Method::Patch, "viewers/%s", 1, "Patch viewer settings").body(),
    // Live views
    protect(Endpoint::LiveViews, "LiveViews", Method::Get, "liveviews", 0, "Get all live views"),
    protect(Endpoint::LiveViewDetails, "LiveViewDetails", Method::Get, "liveviews/%s", 1, "Get live view details"),
    protect(Endpoint::LiveViewCreate, "LiveViewCreate", Method::Post, "liveviews", 0, "Create a live view").body(),
    protect(Endpoint::LiveViewPatch, "LiveViewPatch", Method::Patch, "liveviews/%s", 1, "Patch a live view").body(),
    // Lights
    protect(Endpoint::Lights, "Lights", Method::Get, "lights", 0, "Get all lights"),
    protect(Endpoint::LightDetails, "LightDetails", Method::Get, "lights/%s", 1, "Get light details"),
    protect(Endpoint::LightPatch, "LightPatch", Method::Patch, "lights/%s", 1, "Patch light settings").body(),
    // NVR
    protect(Endpoint::Nvrs, "NVRs", Method::Get, "nvrs", 0, "Get NVR details"),
    // Chimes
    protect(Endpoint::Chimes, "Chimes", Method::Get, "chimes", 0, "Get all chimes"),
    protect(Endpoint::ChimeDetails, "ChimeDetails", Method::Get, "chimes/%s", 1, "Get chime details"),
    protect(Endpoint::ChimePatch, "ChimePatch", Method::Patch, "chimes/%s", 1, "Patch chime settings").body(),
    // Sensors
    protect(Endpoint::Sensors, "Sensors", Method::Get, "sensors", 0, "Get all sensors"),
    protect(Endpoint::SensorDetails, "SensorDetails", Method::Get, "sensors/%s", 1, "Get sensor details"),
    protect(Endpoint::SensorPatch, "SensorPatch", Method::Patch, "sensors/%s", 1, "Patch sensor settings").body(),
    // Device assets
    protect(Endpoint::Files, "Files", Method::Get, "files/%s", 1, "Get device asset files by type"),
    protect(Endpoint::FileUpload, "FileUpload", Method::Post, "files/%s", 1, "Upload device asset file").multipart(),
    // Alarm manager
    protect(
        Endpoint::AlarmManagerWebhook,
        "AlarmManagerWebhook",
        Method::Post,
        "alarm-manager/webhook/%s",
        1,
        "Send a webhook to the alarm manager to trigger configured alarms",
    )
    .status(204),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn path_arity_matches_placeholders() {
        for application in Application::iter() {
            for spec in registry(application) {
                assert_eq!(
                    spec.path.matches("%s").count(),
                    spec.num_path_args,
                    "{application}/{} ({})",
                    spec.key,
                    spec.path
                );
            }
        }
    }

    #[test]
    fn every_endpoint_registered_exactly_once() {
        let mut seen = HashSet::new();
        for spec in NETWORK.iter().chain(PROTECT.iter()) {
            assert!(seen.insert(spec.endpoint), "{} registered twice", spec.endpoint);
        }
        for endpoint in Endpoint::iter() {
            assert!(seen.contains(&endpoint), "{endpoint} missing from registry");
            assert_eq!(endpoint.spec().endpoint, endpoint);
        }
    }

    #[test]
    fn keys_unique_per_application() {
        for application in Application::iter() {
            let mut keys = HashSet::new();
            for spec in registry(application) {
                assert_eq!(spec.application, application);
                assert!(keys.insert(spec.key), "duplicate key {}", spec.key);
            }
        }
    }

    #[test]
    fn device_details_lookup() {
        let spec = lookup(Application::Network, "DeviceDetails");
        assert_eq!(spec.path, "sites/%s/devices/%s");
        assert_eq!(spec.method, Method::Get);
        assert_eq!(spec.expected_status, 200);
        assert_eq!(spec.num_path_args, 2);
    }

    #[test]
    fn both_applications_have_info() {
        assert_eq!(lookup(Application::Network, "Info").path, "info");
        assert_eq!(lookup(Application::Protect, "Info").path, "meta/info");
    }

    #[test]
    fn status_overrides() {
        assert_eq!(Endpoint::VoucherGenerate.spec().expected_status, 201);
        assert_eq!(Endpoint::CameraDeleteRtspsStream.spec().expected_status, 204);
        assert_eq!(Endpoint::AlarmManagerWebhook.spec().expected_status, 204);
    }

    #[test]
    fn subscriptions_are_websocket() {
        let streams: Vec<_> = registry(Application::Protect)
            .iter()
            .filter(|s| s.protocol == Protocol::WebSocket)
            .map(|s| s.endpoint)
            .collect();
        assert_eq!(
            streams,
            vec![Endpoint::SubscribeProtectEvents, Endpoint::SubscribeDeviceEvents]
        );
    }

    #[test]
    fn endpoint_names_parse() {
        assert_eq!("CameraPatch".parse::<Endpoint>().ok(), Some(Endpoint::CameraPatch));
        assert!("Nope".parse::<Endpoint>().is_err());
    }

    #[test]
    #[should_panic(expected = "no network endpoint named")]
    fn lookup_miss_panics() {
        let _ = lookup(Application::Network, "Cameras");
    }
}
