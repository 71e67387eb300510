// unified-api: Async Rust client for the UniFi Network and Protect integration APIs

pub mod client;
pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod events;
pub mod network;
pub mod protect;
pub mod request;
pub mod transport;
pub mod types;
pub mod websocket;

pub use client::Client;
pub use config::{ClientConfig, DecodeErrorPolicy, Scheme};
pub use dispatch::{HandlerRegistry, StreamDispatcher};
pub use endpoint::{Application, Endpoint, EndpointSpec};
pub use error::{Error, VendorError};
pub use events::{EventVariant, ProtectDeviceEvent, ProtectEvent, StreamEnvelope};
pub use request::{Filter, PageArguments};
pub use websocket::{StreamEnd, Subscription};
