// Client configuration and its validation rules.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Shortest accepted WebSocket keep-alive interval.
pub const MIN_KEEP_ALIVE: Duration = Duration::from_secs(1);
/// Longest accepted WebSocket keep-alive interval.
pub const MAX_KEEP_ALIVE: Duration = Duration::from_secs(10 * 60);

pub const DEFAULT_HOST: &str = "unifi";
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30);

/// URL scheme family used for both REST and WebSocket endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// `https://` for REST, `wss://` for streams.
    #[default]
    Secure,
    /// `http://` and `ws://`, for plaintext test servers.
    Plaintext,
}

impl Scheme {
    pub fn http(self) -> &'static str {
        match self {
            Self::Secure => "https",
            Self::Plaintext => "http",
        }
    }

    pub fn websocket(self) -> &'static str {
        match self {
            Self::Secure => "wss",
            Self::Plaintext => "ws",
        }
    }
}

/// What an event stream does with a frame that fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeErrorPolicy {
    /// Close the subscription with the decode error.
    #[default]
    Terminate,
    /// Log the frame and keep reading.
    Skip,
}

/// Everything a [`Client`](crate::Client) needs to talk to a console.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Hostname (optionally `host:port`) of the UniFi console.
    pub host_name: String,
    /// API key issued by the console, sent as `X-Api-Key`.
    pub api_key: SecretString,
    /// Interval between keep-alive pings on subscriptions.
    pub websocket_keep_alive_interval: Duration,
    /// Accept any TLS certificate. Consoles ship self-signed certificates
    /// that match neither `unifi` nor their LAN address.
    pub insecure_skip_verify: bool,
    pub scheme: Scheme,
    pub decode_error_policy: DecodeErrorPolicy,
}

impl ClientConfig {
    /// Default configuration for the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            host_name: DEFAULT_HOST.to_owned(),
            api_key: SecretString::from(api_key.into()),
            websocket_keep_alive_interval: DEFAULT_KEEP_ALIVE,
            insecure_skip_verify: true,
            scheme: Scheme::Secure,
            decode_error_policy: DecodeErrorPolicy::Terminate,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host_name = host.into();
        self
    }

    pub fn with_keep_alive(mut self, interval: Duration) -> Self {
        self.websocket_keep_alive_interval = interval;
        self
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_decode_error_policy(mut self, policy: DecodeErrorPolicy) -> Self {
        self.decode_error_policy = policy;
        self
    }

    /// Check every rule and report all violations at once.
    pub fn validate(&self) -> Result<(), Error> {
        let mut reasons = Vec::new();

        if self.api_key.expose_secret().is_empty() {
            reasons.push("ApiKey must not be empty".to_owned());
        }
        if self.host_name.trim().is_empty() {
            reasons.push("HostName must not be empty".to_owned());
        }
        if self.websocket_keep_alive_interval < MIN_KEEP_ALIVE {
            reasons.push(
                "WebSocketKeepAliveInterval is too short. Must be longer than one second."
                    .to_owned(),
            );
        }
        if self.websocket_keep_alive_interval > MAX_KEEP_ALIVE {
            reasons.push(
                "WebSocketKeepAliveInterval is too long. Must be shorter than ten minutes."
                    .to_owned(),
            );
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidConfig { reasons })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reasons(config: &ClientConfig) -> Vec<String> {
        match config.validate() {
            Ok(()) => Vec::new(),
            Err(Error::InvalidConfig { reasons }) => reasons,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = ClientConfig::new("key");
        assert_eq!(config.host_name, "unifi");
        assert_eq!(config.websocket_keep_alive_interval, Duration::from_secs(30));
        assert!(config.insecure_skip_verify);
        assert!(reasons(&config).is_empty());
    }

    #[test]
    fn keep_alive_bounds_are_inclusive() {
        assert!(reasons(&ClientConfig::new("k").with_keep_alive(MIN_KEEP_ALIVE)).is_empty());
        assert!(reasons(&ClientConfig::new("k").with_keep_alive(MAX_KEEP_ALIVE)).is_empty());
    }

    #[test]
    fn every_violation_is_reported() {
        let config = ClientConfig::new("")
            .with_host("")
            .with_keep_alive(Duration::from_millis(500));
        let reasons = reasons(&config);
        assert_eq!(reasons.len(), 3);
        assert_eq!(reasons[0], "ApiKey must not be empty");
        assert!(reasons[2].contains("too short"));
    }

    #[test]
    fn long_keep_alive_rejected() {
        let config = ClientConfig::new("k").with_keep_alive(Duration::from_secs(601));
        assert_eq!(
            reasons(&config),
            vec!["WebSocketKeepAliveInterval is too long. Must be shorter than ten minutes."]
        );
    }
}
