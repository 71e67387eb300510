//! CLI error types with miette diagnostics.
//!
//! Maps `unified_api::Error` and `unified_config::ConfigError` into
//! user-facing errors with help text and distinct exit codes.

use miette::Diagnostic;
use thiserror::Error;

use unified_api::Error as ApiError;
use unified_config::ConfigError;

/// Process exit codes. Success is 0.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const CONFIG: i32 = 9;
    pub const STATUS: i32 = 10;
    pub const DECODE: i32 = 11;
    pub const INPUT: i32 = 12;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not talk to the console")]
    #[diagnostic(
        code(unified::connection_failed),
        help(
            "Check that the console is reachable and the host is right.\n\
             Consoles ship self-signed certificates: try --insecure true"
        )
    )]
    ConnectionFailed {
        #[source]
        source: ApiError,
    },

    #[error("Interrupted")]
    #[diagnostic(code(unified::cancelled))]
    Cancelled,

    // ── Status ───────────────────────────────────────────────────────

    #[error("The console rejected the API key (HTTP {status})")]
    #[diagnostic(
        code(unified::auth_failed),
        help(
            "Create a key under Settings > Control Plane > Integrations, then\n\
             store it with: unified config set-key"
        )
    )]
    AuthFailed { status: u16 },

    #[error("Not found: {url}")]
    #[diagnostic(code(unified::not_found), help("Check the ID; list commands show valid ones."))]
    NotFound { url: String },

    #[error("Unexpected HTTP {status} from {url}{}", detail_suffix(.detail.as_deref()))]
    #[diagnostic(code(unified::api_error))]
    ApiStatus {
        status: u16,
        url: String,
        detail: Option<String>,
    },

    // ── Data ─────────────────────────────────────────────────────────

    #[error("Could not decode the console's response")]
    #[diagnostic(
        code(unified::decode),
        help("Re-run with -vvv to log the raw payload.")
    )]
    Decode {
        #[source]
        source: ApiError,
    },

    // ── Input ────────────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(unified::invalid_input))]
    InvalidInput(ApiError),

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unified::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' was not confirmed")]
    #[diagnostic(
        code(unified::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NotConfirmed { action: String },

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(unified::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(unified::io))]
    Io(#[from] std::io::Error),

    // ── Configuration ────────────────────────────────────────────────

    #[error("{}", .reasons.join("\n"))]
    #[diagnostic(
        code(unified::invalid_config),
        help("Fix the profile with: unified config init")
    )]
    InvalidConfig { reasons: Vec<String> },

    #[error("No console configured")]
    #[diagnostic(
        code(unified::no_config),
        help(
            "Create a profile with: unified config init --host <console>\n\
             Or pass --host and --api-key. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(
        code(unified::config),
        help("Run: unified config show")
    )]
    Config(#[from] ConfigError),

    // ── Output ───────────────────────────────────────────────────────

    #[error("Could not render output: {0}")]
    #[diagnostic(code(unified::output))]
    Render(String),
}

fn detail_suffix(detail: Option<&str>) -> String {
    detail
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ApiStatus { .. } => exit_code::STATUS,
            Self::Decode { .. } => exit_code::DECODE,
            Self::InvalidInput(_) | Self::Json(_) | Self::Io(_) => exit_code::INPUT,
            Self::Validation { .. } | Self::NotConfirmed { .. } => exit_code::USAGE,
            Self::InvalidConfig { .. } | Self::NoConfig { .. } | Self::Config(_) => {
                exit_code::CONFIG
            }
            Self::Cancelled | Self::Render(_) => exit_code::GENERAL,
        }
    }
}

// ── unified_api::Error → CliError ────────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::InvalidConfig { reasons } => Self::InvalidConfig { reasons },
            ApiError::Cancelled => Self::Cancelled,
            ApiError::UnexpectedStatus {
                status: status @ (401 | 403),
                ..
            } => Self::AuthFailed { status },
            ApiError::UnexpectedStatus {
                status: 404, url, ..
            } => Self::NotFound { url },
            ApiError::UnexpectedStatus {
                status,
                url,
                vendor,
            } => Self::ApiStatus {
                status,
                url,
                detail: vendor.map(|v| v.message().to_owned()),
            },
            ApiError::UnsupportedFileType { .. } | ApiError::SlotOutOfRange(_) => {
                Self::InvalidInput(err)
            }
            err if err.is_decode() => Self::Decode { source: err },
            err => Self::ConnectionFailed { source: err },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_distinct_exit_codes() {
        let status = |status| ApiError::UnexpectedStatus {
            status,
            url: "https://unifi/x".into(),
            vendor: None,
        };
        assert_eq!(CliError::from(status(401)).exit_code(), exit_code::AUTH);
        assert_eq!(CliError::from(status(403)).exit_code(), exit_code::AUTH);
        assert_eq!(CliError::from(status(404)).exit_code(), exit_code::NOT_FOUND);
        assert_eq!(CliError::from(status(500)).exit_code(), exit_code::STATUS);
    }

    #[test]
    fn input_and_decode_errors() {
        assert_eq!(
            CliError::from(ApiError::SlotOutOfRange(7)).exit_code(),
            exit_code::INPUT
        );
        assert_eq!(
            CliError::from(ApiError::UnexpectedFrame("binary")).exit_code(),
            exit_code::DECODE
        );
        assert_eq!(
            CliError::from(ApiError::WebSocketConnect("refused".into())).exit_code(),
            exit_code::CONNECTION
        );
        assert_eq!(
            CliError::from(ApiError::InvalidConfig {
                reasons: vec!["ApiKey must not be empty".into()]
            })
            .exit_code(),
            exit_code::CONFIG
        );
    }

    #[test]
    fn vendor_message_is_shown() {
        let err = CliError::ApiStatus {
            status: 400,
            url: "https://unifi/x".into(),
            detail: Some("'name' must not be empty".into()),
        };
        assert_eq!(
            err.to_string(),
            "Unexpected HTTP 400 from https://unifi/x: 'name' must not be empty"
        );
    }
}
