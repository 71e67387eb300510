// Request dispatcher shared by the Network and Protect surfaces.
//
// Every REST call funnels through `Client::execute`: render the URL from the
// endpoint registry, attach auth headers, send, and classify the status
// against the endpoint's expected code.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::config::ClientConfig;
use crate::error::{Error, VendorError};
use crate::network::NetworkApi;
use crate::protect::ProtectApi;
use crate::request::RequestDescriptor;
use crate::transport;

pub(crate) const API_KEY_HEADER: &str = "X-Api-Key";

/// Async client for the UniFi Network and Protect integration APIs.
///
/// Cheap to clone. All clones share one connection pool and one
/// cancellation token; cancelling it stops every subscription opened from
/// this client and refuses new REST calls.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    api_key: HeaderValue,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.config.host_name)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Client {
    // ── Constructors ─────────────────────────────────────────────────

    /// Validate `config` and build a client with its own HTTP pool.
    pub fn new(config: ClientConfig, cancel: CancellationToken) -> Result<Self, Error> {
        config.validate()?;
        let http = transport::build_http_client(&config)?;
        Self::from_reqwest(config, http, cancel)
    }

    /// Wrap an existing `reqwest::Client`. The config is still validated.
    pub fn from_reqwest(
        config: ClientConfig,
        http: reqwest::Client,
        cancel: CancellationToken,
    ) -> Result<Self, Error> {
        config.validate()?;
        let mut api_key =
            HeaderValue::from_str(config.api_key.expose_secret()).map_err(|_| {
                Error::InvalidConfig {
                    reasons: vec!["ApiKey contains characters not allowed in a header".into()],
                }
            })?;
        api_key.set_sensitive(true);

        Ok(Self {
            http,
            config: Arc::new(config),
            api_key,
            cancel,
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The shared cancellation token governing this client.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Network application operations.
    pub fn network(&self) -> NetworkApi<'_> {
        NetworkApi::new(self)
    }

    /// Protect application operations and event subscriptions.
    pub fn protect(&self) -> ProtectApi<'_> {
        ProtectApi::new(self)
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Render, send, and classify one request.
    ///
    /// Returns the raw body when the status equals the endpoint's expected
    /// status. Panics if the endpoint requires a body and none was given.
    pub async fn execute(&self, request: RequestDescriptor) -> Result<Bytes, Error> {
        let spec = request.spec();
        let url = request.render_url(self.config.scheme, &self.config.host_name)?;
        trace!(url = %url, "rendered url");

        assert!(
            !spec.has_body || request.body.is_some(),
            "{} requires a request body",
            spec.key
        );

        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let content_type = request
            .body
            .as_ref()
            .map_or_else(|| "application/json".to_owned(), |b| b.content_type());

        let mut builder = self
            .http
            .request(spec.method.as_reqwest(), url.clone())
            .header(API_KEY_HEADER, self.api_key.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, content_type);
        if let Some(body) = &request.body {
            builder = builder.body(body.bytes());
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;

        if status != spec.expected_status {
            let vendor = VendorError::from_body(&body);
            match &vendor {
                Some(detail) => warn!(
                    url = %url,
                    status,
                    expected = spec.expected_status,
                    detail = ?detail,
                    "vendor error response"
                ),
                None => warn!(
                    url = %url,
                    status,
                    expected = spec.expected_status,
                    "unexpected status, error body not recognised"
                ),
            }
            return Err(Error::UnexpectedStatus {
                status,
                url: url.to_string(),
                vendor: vendor.map(Box::new),
            });
        }

        debug!(url = %url, status, "request succeeded");
        Ok(body)
    }

    /// Execute and decode a JSON response.
    pub(crate) async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
    ) -> Result<T, Error> {
        let body = self.execute(request).await?;
        decode(&body)
    }

    /// Execute and discard the response body.
    pub(crate) async fn execute_empty(&self, request: RequestDescriptor) -> Result<(), Error> {
        self.execute(request).await.map(drop)
    }
}

/// Decode a JSON body, keeping the raw text on failure.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|e| {
        let body = String::from_utf8_lossy(body).into_owned();
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}
