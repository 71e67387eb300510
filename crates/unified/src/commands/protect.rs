//! Protect application command handlers.

use std::io::Write;

use tracing::info;

use unified_api::Client;
use unified_api::types::{
    AlarmTriggerId, CameraId, CameraPatchRequest, ChimeId, ChimePatchRequest, LightId,
    LightPatchRequest, LiveView, LiveViewId, RtspsStreamRequest, SensorId, SensorPatchRequest,
    StreamQuality, ViewerId, ViewerSettingsRequest,
};

use crate::cli::{
    CamerasCommand, DeviceCommand, FilesCommand, LiveviewsCommand, OutputFormat, ProtectArgs,
    ProtectCommand, QualityArgs, ViewersCommand,
};
use crate::error::CliError;
use crate::output;

use super::{subscribe, util};

pub async fn handle(args: ProtectArgs, client: &Client, format: OutputFormat) -> Result<(), CliError> {
    let api = client.protect();
    match args.command {
        ProtectCommand::Info => output::print(format, &api.info().await?),
        ProtectCommand::Cameras { command } => cameras(client, command, format).await,
        ProtectCommand::Viewers { command } => viewers(client, command, format).await,
        ProtectCommand::Liveviews { command } => liveviews(client, command, format).await,
        ProtectCommand::Lights { command } => lights(client, command, format).await,
        ProtectCommand::Nvrs => output::print(format, &api.nvrs().await?),
        ProtectCommand::Chimes { command } => chimes(client, command, format).await,
        ProtectCommand::Sensors { command } => sensors(client, command, format).await,
        ProtectCommand::Files { command } => files(client, command, format).await,
        ProtectCommand::AlarmWebhook { trigger } => {
            api.alarm_manager_webhook(&AlarmTriggerId(trigger)).await?;
            Ok(())
        }
        ProtectCommand::Subscribe { command } => subscribe::handle(command, client, format).await,
    }
}

/// Selected qualities in wire order; at least one is required.
fn qualities(args: &QualityArgs) -> Result<Vec<StreamQuality>, CliError> {
    let selected: Vec<StreamQuality> = [
        (args.high, StreamQuality::High),
        (args.medium, StreamQuality::Medium),
        (args.low, StreamQuality::Low),
        (args.package, StreamQuality::Package),
    ]
    .into_iter()
    .filter_map(|(on, quality)| on.then_some(quality))
    .collect();

    if selected.is_empty() {
        return Err(CliError::Validation {
            field: "qualities".into(),
            reason: "pass at least one of --high, --medium, --low, --package".into(),
        });
    }
    Ok(selected)
}

// ── Cameras ─────────────────────────────────────────────────────────

async fn cameras(client: &Client, command: CamerasCommand, format: OutputFormat) -> Result<(), CliError> {
    let api = client.protect();
    match command {
        CamerasCommand::List => output::print(format, &api.cameras().await?),

        CamerasCommand::Details { camera } => {
            output::print(format, &api.camera_details(&CameraId(camera)).await?)
        }

        CamerasCommand::Patch { camera, body } => {
            let patch: CameraPatchRequest = util::read_json_file(&body.file)?;
            output::print(format, &api.camera_patch(&CameraId(camera), &patch).await?)
        }

        CamerasCommand::Snapshot {
            camera,
            high_quality,
            out,
        } => {
            let image = api.camera_snapshot(&CameraId(camera), high_quality).await?;
            match out {
                Some(path) => {
                    std::fs::write(&path, &image)?;
                    info!(path = %path.display(), bytes = image.len(), "snapshot saved");
                }
                None => std::io::stdout().lock().write_all(&image)?,
            }
            Ok(())
        }

        CamerasCommand::StreamCreate { camera, qualities: q } => {
            let request = RtspsStreamRequest {
                qualities: qualities(&q)?,
            };
            let streams = api
                .camera_create_rtsps_stream(&CameraId(camera), &request)
                .await?;
            output::print(format, &streams)
        }

        CamerasCommand::StreamDelete { camera, qualities: q } => {
            api.camera_delete_rtsps_stream(&CameraId(camera), &qualities(&q)?)
                .await?;
            Ok(())
        }

        CamerasCommand::StreamGet { camera } => {
            output::print(format, &api.camera_get_rtsps_stream(&CameraId(camera)).await?)
        }

        CamerasCommand::DisableMicPermanently { camera } => {
            let updated = api
                .camera_disable_mic_permanently(&CameraId(camera))
                .await?;
            output::print(format, &updated)
        }

        CamerasCommand::TalkbackSession { camera } => {
            output::print(format, &api.camera_talkback_session(&CameraId(camera)).await?)
        }

        CamerasCommand::PtzPatrolStart { camera, slot } => {
            api.camera_ptz_patrol_start(&CameraId(camera), slot).await?;
            Ok(())
        }

        CamerasCommand::PtzPatrolStop { camera } => {
            api.camera_ptz_patrol_stop(&CameraId(camera)).await?;
            Ok(())
        }

        CamerasCommand::PtzGoto { camera, slot } => {
            api.camera_ptz_goto(&CameraId(camera), slot).await?;
            Ok(())
        }
    }
}

// ── Viewers and live views ──────────────────────────────────────────

async fn viewers(client: &Client, command: ViewersCommand, format: OutputFormat) -> Result<(), CliError> {
    let api = client.protect();
    match command {
        ViewersCommand::List => output::print(format, &api.viewers().await?),
        ViewersCommand::Details { viewer } => {
            output::print(format, &api.viewer_details(&ViewerId(viewer)).await?)
        }
        ViewersCommand::Settings { viewer, body } => {
            let settings: ViewerSettingsRequest = util::read_json_file(&body.file)?;
            output::print(format, &api.viewer_settings(&ViewerId(viewer), &settings).await?)
        }
    }
}

async fn liveviews(client: &Client, command: LiveviewsCommand, format: OutputFormat) -> Result<(), CliError> {
    let api = client.protect();
    match command {
        LiveviewsCommand::List => output::print(format, &api.live_views().await?),
        LiveviewsCommand::Details { liveview } => {
            output::print(format, &api.live_view_details(&LiveViewId(liveview)).await?)
        }
        LiveviewsCommand::Create { body } => {
            let live_view: LiveView = util::read_json_file(&body.file)?;
            output::print(format, &api.live_view_create(&live_view).await?)
        }
        LiveviewsCommand::Patch { liveview, body } => {
            let live_view: LiveView = util::read_json_file(&body.file)?;
            let updated = api
                .live_view_patch(&LiveViewId(liveview), &live_view)
                .await?;
            output::print(format, &updated)
        }
    }
}

// ── Lights, chimes, sensors ─────────────────────────────────────────

async fn lights(client: &Client, command: DeviceCommand, format: OutputFormat) -> Result<(), CliError> {
    let api = client.protect();
    match command {
        DeviceCommand::List => output::print(format, &api.lights().await?),
        DeviceCommand::Details { id } => output::print(format, &api.light_details(&LightId(id)).await?),
        DeviceCommand::Patch { id, body } => {
            let patch: LightPatchRequest = util::read_json_file(&body.file)?;
            output::print(format, &api.light_patch(&LightId(id), &patch).await?)
        }
    }
}

async fn chimes(client: &Client, command: DeviceCommand, format: OutputFormat) -> Result<(), CliError> {
    let api = client.protect();
    match command {
        DeviceCommand::List => output::print(format, &api.chimes().await?),
        DeviceCommand::Details { id } => output::print(format, &api.chime_details(&ChimeId(id)).await?),
        DeviceCommand::Patch { id, body } => {
            let patch: ChimePatchRequest = util::read_json_file(&body.file)?;
            output::print(format, &api.chime_patch(&ChimeId(id), &patch).await?)
        }
    }
}

async fn sensors(client: &Client, command: DeviceCommand, format: OutputFormat) -> Result<(), CliError> {
    let api = client.protect();
    match command {
        DeviceCommand::List => output::print(format, &api.sensors().await?),
        DeviceCommand::Details { id } => {
            output::print(format, &api.sensor_details(&SensorId(id)).await?)
        }
        DeviceCommand::Patch { id, body } => {
            let patch: SensorPatchRequest = util::read_json_file(&body.file)?;
            output::print(format, &api.sensor_patch(&SensorId(id), &patch).await?)
        }
    }
}

// ── Files ───────────────────────────────────────────────────────────

async fn files(client: &Client, command: FilesCommand, format: OutputFormat) -> Result<(), CliError> {
    let api = client.protect();
    match command {
        FilesCommand::List { file_type } => output::print(format, &api.files(file_type).await?),
        FilesCommand::Upload { path, file_type } => {
            let contents = std::fs::read(&path)?;
            let filename = path.to_string_lossy();
            api.file_upload(file_type, &filename, &contents).await?;
            info!(file = %filename, bytes = contents.len(), "uploaded");
            Ok(())
        }
    }
}
