// Typed operations for the Protect application.

use std::path::Path;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::client::Client;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::events::{ProtectDeviceEvent, ProtectEvent};
use crate::request::{Body, Query, RequestDescriptor};
use crate::types::{
    AlarmTriggerId, AssetFile, Camera, CameraId, CameraPatchRequest, Chime, ChimeId,
    ChimePatchRequest, FileType, Light, LightId, LightPatchRequest, LiveView, LiveViewId, Nvr,
    ProtectInfo, RtspsStreamRequest, RtspsStreams, Sensor, SensorId, SensorPatchRequest,
    SlotNumber, StreamQuality, TalkbackSession, Viewer, ViewerId, ViewerSettingsRequest,
    upload_content_type,
};
use crate::websocket::{self, Subscription};

/// Borrowed view over a [`Client`] exposing Protect endpoints.
#[derive(Debug, Clone, Copy)]
pub struct ProtectApi<'a> {
    client: &'a Client,
}

impl<'a> ProtectApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn info(&self) -> Result<ProtectInfo, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::ProtectInfo))
            .await
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Open the category event stream (`subscribe/events`).
    pub async fn subscribe_events(&self) -> Result<Subscription<ProtectEvent>, Error> {
        websocket::subscribe(self.client, Endpoint::SubscribeProtectEvents).await
    }

    /// Open the device update stream (`subscribe/devices`).
    pub async fn subscribe_devices(&self) -> Result<Subscription<ProtectDeviceEvent>, Error> {
        websocket::subscribe(self.client, Endpoint::SubscribeDeviceEvents).await
    }

    // ── Cameras ──────────────────────────────────────────────────────

    pub async fn cameras(&self) -> Result<Vec<Camera>, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::Cameras))
            .await
    }

    pub async fn camera_details(&self, camera: &CameraId) -> Result<Camera, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::CameraDetails).arg(camera))
            .await
    }

    pub async fn camera_patch(
        &self,
        camera: &CameraId,
        patch: &CameraPatchRequest,
    ) -> Result<Camera, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::CameraPatch)
                    .arg(camera)
                    .body(Body::json(patch)?),
            )
            .await
    }

    pub async fn camera_create_rtsps_stream(
        &self,
        camera: &CameraId,
        request: &RtspsStreamRequest,
    ) -> Result<RtspsStreams, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::CameraCreateRtspsStream)
                    .arg(camera)
                    .body(Body::json(request)?),
            )
            .await
    }

    /// Delete streams. Qualities go in the query as repeated `qualities[]`.
    pub async fn camera_delete_rtsps_stream(
        &self,
        camera: &CameraId,
        qualities: &[StreamQuality],
    ) -> Result<(), Error> {
        let query = qualities
            .iter()
            .fold(Query::new(), |q, quality| q.with("qualities[]", quality.to_string()));
        self.client
            .execute_empty(
                RequestDescriptor::new(Endpoint::CameraDeleteRtspsStream)
                    .arg(camera)
                    .query(query),
            )
            .await
    }

    pub async fn camera_get_rtsps_stream(&self, camera: &CameraId) -> Result<RtspsStreams, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::CameraGetRtspsStream).arg(camera))
            .await
    }

    /// JPEG snapshot, returned undecoded.
    pub async fn camera_snapshot(&self, camera: &CameraId, high_quality: bool) -> Result<Bytes, Error> {
        self.client
            .execute(
                RequestDescriptor::new(Endpoint::CameraSnapshot)
                    .arg(camera)
                    .query(Query::new().with("highQuality", high_quality.to_string())),
            )
            .await
    }

    pub async fn camera_disable_mic_permanently(&self, camera: &CameraId) -> Result<Camera, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::CameraDisableMicPermanently).arg(camera))
            .await
    }

    pub async fn camera_talkback_session(&self, camera: &CameraId) -> Result<TalkbackSession, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::CameraTalkbackSession).arg(camera))
            .await
    }

    pub async fn camera_ptz_patrol_start(&self, camera: &CameraId, slot: i64) -> Result<(), Error> {
        let slot = SlotNumber::new(slot)?;
        self.client
            .execute_empty(
                RequestDescriptor::new(Endpoint::CameraPtzPatrolStart)
                    .arg(camera)
                    .arg(slot),
            )
            .await
    }

    pub async fn camera_ptz_patrol_stop(&self, camera: &CameraId) -> Result<(), Error> {
        self.client
            .execute_empty(RequestDescriptor::new(Endpoint::CameraPtzPatrolStop).arg(camera))
            .await
    }

    pub async fn camera_ptz_goto(&self, camera: &CameraId, slot: i64) -> Result<(), Error> {
        let slot = SlotNumber::new(slot)?;
        self.client
            .execute_empty(
                RequestDescriptor::new(Endpoint::CameraPtzGoto)
                    .arg(camera)
                    .arg(slot),
            )
            .await
    }

    // ── Viewers ──────────────────────────────────────────────────────

    pub async fn viewers(&self) -> Result<Vec<Viewer>, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::Viewers))
            .await
    }

    pub async fn viewer_details(&self, viewer: &ViewerId) -> Result<Viewer, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::ViewerDetails).arg(viewer))
            .await
    }

    pub async fn viewer_settings(
        &self,
        viewer: &ViewerId,
        settings: &ViewerSettingsRequest,
    ) -> Result<Viewer, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::ViewerSettings)
                    .arg(viewer)
                    .body(Body::json(settings)?),
            )
            .await
    }

    // ── Live views ───────────────────────────────────────────────────

    pub async fn live_views(&self) -> Result<Vec<LiveView>, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::LiveViews))
            .await
    }

    pub async fn live_view_details(&self, live_view: &LiveViewId) -> Result<LiveView, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::LiveViewDetails).arg(live_view))
            .await
    }

    pub async fn live_view_create(&self, live_view: &LiveView) -> Result<LiveView, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::LiveViewCreate).body(Body::json(live_view)?))
            .await
    }

    pub async fn live_view_patch(
        &self,
        id: &LiveViewId,
        live_view: &LiveView,
    ) -> Result<LiveView, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::LiveViewPatch)
                    .arg(id)
                    .body(Body::json(live_view)?),
            )
            .await
    }

    // ── Lights ───────────────────────────────────────────────────────

    pub async fn lights(&self) -> Result<Vec<Light>, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::Lights))
            .await
    }

    pub async fn light_details(&self, light: &LightId) -> Result<Light, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::LightDetails).arg(light))
            .await
    }

    pub async fn light_patch(&self, light: &LightId, patch: &LightPatchRequest) -> Result<Light, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::LightPatch)
                    .arg(light)
                    .body(Body::json(patch)?),
            )
            .await
    }

    // ── NVR ──────────────────────────────────────────────────────────

    pub async fn nvrs(&self) -> Result<Nvr, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::Nvrs))
            .await
    }

    // ── Chimes ───────────────────────────────────────────────────────

    pub async fn chimes(&self) -> Result<Vec<Chime>, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::Chimes))
            .await
    }

    pub async fn chime_details(&self, chime: &ChimeId) -> Result<Chime, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::ChimeDetails).arg(chime))
            .await
    }

    pub async fn chime_patch(&self, chime: &ChimeId, patch: &ChimePatchRequest) -> Result<Chime, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::ChimePatch)
                    .arg(chime)
                    .body(Body::json(patch)?),
            )
            .await
    }

    // ── Sensors ──────────────────────────────────────────────────────

    pub async fn sensors(&self) -> Result<Vec<Sensor>, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::Sensors))
            .await
    }

    pub async fn sensor_details(&self, sensor: &SensorId) -> Result<Sensor, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::SensorDetails).arg(sensor))
            .await
    }

    pub async fn sensor_patch(
        &self,
        sensor: &SensorId,
        patch: &SensorPatchRequest,
    ) -> Result<Sensor, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::SensorPatch)
                    .arg(sensor)
                    .body(Body::json(patch)?),
            )
            .await
    }

    // ── Device assets ────────────────────────────────────────────────

    pub async fn files(&self, file_type: FileType) -> Result<Vec<AssetFile>, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::Files).arg(file_type))
            .await
    }

    /// Upload a device asset. `filename` picks the part's content type by
    /// extension; only its final path component is sent.
    pub async fn file_upload(
        &self,
        file_type: FileType,
        filename: &str,
        contents: &[u8],
    ) -> Result<(), Error> {
        let body = multipart_file(filename, contents)?;
        trace!(
            filename,
            file_type = %file_type,
            content_type = %body.content_type(),
            "uploading file"
        );
        self.client
            .execute_empty(
                RequestDescriptor::new(Endpoint::FileUpload)
                    .arg(file_type)
                    .body(body),
            )
            .await
    }

    // ── Alarm manager ────────────────────────────────────────────────

    /// Fire the alarm-manager webhook for `trigger`.
    pub async fn alarm_manager_webhook(&self, trigger: &AlarmTriggerId) -> Result<(), Error> {
        self.client
            .execute_empty(RequestDescriptor::new(Endpoint::AlarmManagerWebhook).arg(trigger))
            .await
    }
}

// ── Multipart ────────────────────────────────────────────────────────

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Single-part `multipart/form-data` body with the file under field `file`.
fn multipart_file(filename: &str, contents: &[u8]) -> Result<Body, Error> {
    let content_type = upload_content_type(filename)?;
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    let boundary = uuid::Uuid::new_v4().simple().to_string();

    let mut buf = BytesMut::with_capacity(contents.len() + 256);
    buf.put_slice(format!("--{boundary}\r\n").as_bytes());
    buf.put_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            escape_quotes(name)
        )
        .as_bytes(),
    );
    buf.put_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    buf.put_slice(contents);
    buf.put_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Ok(Body::Multipart {
        boundary,
        bytes: buf.freeze(),
    })
}
