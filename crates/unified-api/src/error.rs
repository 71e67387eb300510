use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for the `unified-api` crate.
///
/// Precondition violations (wrong path-argument count, a body missing on an
/// endpoint that requires one) are not represented here: they are bugs in the
/// typed method wiring and panic instead.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// Client configuration failed validation. Every violated rule is listed.
    #[error("invalid client configuration: {}", .reasons.join("; "))]
    InvalidConfig { reasons: Vec<String> },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The client's cancellation token fired before the request was sent.
    #[error("request cancelled")]
    Cancelled,

    // ── Protocol ────────────────────────────────────────────────────
    /// The response status did not match the endpoint's expected status.
    ///
    /// `vendor` carries the structured error body when it decoded as one of
    /// the known vendor shapes.
    #[error("got unexpected http code {status} when requesting '{url}'")]
    UnexpectedStatus {
        status: u16,
        url: String,
        vendor: Option<Box<VendorError>>,
    },

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket handshake failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// Read or write failure on an established WebSocket.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// The server closed the WebSocket.
    #[error("WebSocket closed (code {code}): {reason}")]
    WebSocketClosed { code: u16, reason: String },

    /// A non-text data frame arrived on an event stream.
    #[error("unexpected {0} frame on event stream")]
    UnexpectedFrame(&'static str),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// An event payload carried a discriminator outside the known table.
    #[error("unknown {field} '{value}'")]
    UnknownDiscriminator { field: &'static str, value: String },

    // ── Input ───────────────────────────────────────────────────────
    /// File upload with an extension the Protect asset store rejects.
    #[error("unsupported file type, got: '{extension}', acceptable types: '{accepted}'")]
    UnsupportedFileType { extension: String, accepted: String },

    /// PTZ patrol or preset slot outside `0..4`.
    #[error("Slot must be between 0 and 3 inclusive, got {0}")]
    SlotOutOfRange(i64),
}

impl Error {
    /// HTTP status of an [`Error::UnexpectedStatus`], if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if the controller rejected the API key.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Returns `true` for failures to reach or talk to the controller.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::Tls(_)
                | Self::WebSocketConnect(_)
                | Self::WebSocket(_)
                | Self::WebSocketClosed { .. }
        )
    }

    /// Returns `true` for payloads that could not be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::Deserialization { .. }
                | Self::UnknownDiscriminator { .. }
                | Self::UnexpectedFrame(_)
        )
    }
}

// ── Vendor error bodies ─────────────────────────────────────────────

/// Structured error body returned alongside a non-success status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VendorError {
    Api(ApiErrorBody),
    Validation(ValidationErrorBody),
}

impl VendorError {
    /// Try both known shapes; `None` when the body is neither.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Api(e) => &e.message,
            Self::Validation(e) => &e.error,
        }
    }
}

/// `{statusCode, statusName, message, ...}` shape used by both applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub status_code: u16,
    pub status_name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub request_path: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Protect request-validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorBody {
    pub error: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub entity: String,
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
    #[serde(default)]
    pub body: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    #[serde(default)]
    pub instance_path: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub keyword: String,
}
