//! Protect event stream subscriptions.
//!
//! Each subscription owns one WebSocket split into two tasks: a keep-alive
//! pinger on the write half and a read loop on the read half. The read loop
//! decodes text frames into envelopes and forwards them over a capacity-1
//! channel, so a slow consumer backpressures the socket instead of
//! buffering. Both tasks stop on a child of the client's cancellation
//! token; the read loop also stops the pinger when it ends for any other
//! reason.
//!
//! ```rust,ignore
//! let mut events = client.protect().subscribe_events().await?;
//! while let Some(event) = events.recv().await {
//!     println!("{} {}", event.action, event.item_type);
//! }
//! match events.finish().await {
//!     StreamEnd::Failed(e) => eprintln!("stream failed: {e}"),
//!     end => println!("stream ended: {end:?}"),
//! }
//! ```

use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use secrecy::ExposeSecret;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder, Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::client::{API_KEY_HEADER, Client};
use crate::config::DecodeErrorPolicy;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::events::StreamEnvelope;
use crate::request::RequestDescriptor;
use crate::transport;

// ── Subscription ─────────────────────────────────────────────────────

/// Why a subscription stopped producing events.
#[derive(Debug)]
pub enum StreamEnd {
    /// The client's cancellation token fired.
    Cancelled,
    /// The receiving side was dropped.
    ConsumerGone,
    /// The connection or a frame failed.
    Failed(Error),
}

impl StreamEnd {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn into_error(self) -> Option<Error> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Cancelled | Self::ConsumerGone => None,
        }
    }
}

/// Ordered, single-consumer sequence of decoded envelopes.
///
/// Not restartable: once [`recv`](Self::recv) returns `None` the stream is
/// over and [`finish`](Self::finish) reports why.
#[derive(Debug)]
pub struct Subscription<E> {
    rx: mpsc::Receiver<E>,
    end: oneshot::Receiver<StreamEnd>,
    cancel: CancellationToken,
}

impl<E> Subscription<E> {
    pub(crate) fn from_parts(
        rx: mpsc::Receiver<E>,
        end: oneshot::Receiver<StreamEnd>,
        cancel: CancellationToken,
    ) -> Self {
        Self { rx, end, cancel }
    }

    /// Next envelope, or `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<E> {
        self.rx.recv().await
    }

    /// Token governing this subscription's pinger and read loop. It is a
    /// child of the client token; cancelling it stops only this stream.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Stop consuming and wait for the read loop's verdict.
    ///
    /// The read loop watches for the receiver being dropped, so this
    /// returns promptly even when the socket is idle.
    pub async fn finish(self) -> StreamEnd {
        let Self { rx, end, .. } = self;
        drop(rx);
        end.await.unwrap_or_else(|_| {
            StreamEnd::Failed(Error::WebSocket("read loop exited without reporting".into()))
        })
    }
}

impl<E> Stream for Subscription<E> {
    type Item = E;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<E>> {
        self.rx.poll_recv(cx)
    }
}

// ── Connection ───────────────────────────────────────────────────────

/// Open `endpoint` and spawn its pinger and read loop.
pub(crate) async fn subscribe<E: StreamEnvelope>(
    client: &Client,
    endpoint: Endpoint,
) -> Result<Subscription<E>, Error> {
    let config = client.config();
    let url = RequestDescriptor::new(endpoint).render_url(config.scheme, &config.host_name)?;

    let ws = connect(client, &url).await?;
    let (sink, stream) = ws.split();

    let (tx, rx) = mpsc::channel(1);
    let (end_tx, end_rx) = oneshot::channel();
    let cancel = client.cancellation_token().child_token();

    tokio::spawn(keep_alive(
        sink,
        config.websocket_keep_alive_interval,
        cancel.clone(),
    ));

    let policy = config.decode_error_policy;
    let loop_cancel = cancel.clone();
    tokio::spawn(async move {
        let end = read_loop::<E, _>(stream, tx, &loop_cancel, policy).await;
        loop_cancel.cancel();
        match &end {
            StreamEnd::Failed(e) => error!(url = %url, error = %e, "event stream failed"),
            other => info!(url = %url, end = ?other, "event stream closed"),
        }
        let _ = end_tx.send(end);
    });

    Ok(Subscription::from_parts(rx, end_rx, cancel))
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect(client: &Client, url: &Url) -> Result<WsStream, Error> {
    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;

    // Only the API key: the upgrade is rejected with Accept/Content-Type set.
    let request = ClientRequestBuilder::new(uri).with_header(
        API_KEY_HEADER,
        client.config().api_key.expose_secret().to_owned(),
    );
    let connector = transport::websocket_connector(client.config())?;

    let (ws, response) =
        tokio_tungstenite::connect_async_tls_with_config(request, None, false, connector)
            .await
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    info!(url = %url, status = response.status().as_u16(), "event stream connected");
    Ok(ws)
}

// ── Tasks ────────────────────────────────────────────────────────────

/// Ping on every tick after the first until cancelled. A failed ping stops
/// only the pinger; the read loop notices a dead socket on its own.
async fn keep_alive<S>(mut sink: S, period: Duration, cancel: CancellationToken)
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let mut ticker = tokio::time::interval(period);
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = sink.send(Message::Ping(Bytes::new())).await {
                    error!(error = %e, "keep-alive ping failed, stopping pinger");
                    break;
                }
                debug!(period_ms = period.as_millis(), "keep-alive ping sent");
            }
        }
    }
}

/// Forward decoded text frames until cancellation, consumer loss, or a
/// failure. Consumer loss is noticed while waiting for a frame, not only on
/// the next send. Dropping `tx` on return closes the channel exactly once.
async fn read_loop<E, S>(
    mut stream: S,
    tx: mpsc::Sender<E>,
    cancel: &CancellationToken,
    policy: DecodeErrorPolicy,
) -> StreamEnd
where
    E: StreamEnvelope,
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        if cancel.is_cancelled() {
            return StreamEnd::Cancelled;
        }

        let frame = tokio::select! {
            biased;
            () = cancel.cancelled() => return StreamEnd::Cancelled,
            () = tx.closed() => return StreamEnd::ConsumerGone,
            frame = stream.next() => frame,
        };

        let text = match frame {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Binary(_))) => {
                return StreamEnd::Failed(Error::UnexpectedFrame("binary"));
            }
            Some(Ok(Message::Close(frame))) => {
                let (code, reason) = frame.map_or((1005, String::new()), |f| {
                    (u16::from(f.code), f.reason.as_str().to_owned())
                });
                return StreamEnd::Failed(Error::WebSocketClosed { code, reason });
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {
                trace!("control frame");
                continue;
            }
            Some(Err(e)) => return StreamEnd::Failed(Error::WebSocket(e.to_string())),
            None => {
                return StreamEnd::Failed(Error::WebSocket(
                    "stream ended without a close frame".into(),
                ));
            }
        };

        let envelope = match E::decode(text.as_bytes()) {
            Ok(envelope) => envelope,
            Err(e) if policy == DecodeErrorPolicy::Skip => {
                warn!(error = %e, "skipping undecodable frame");
                continue;
            }
            Err(e) => return StreamEnd::Failed(e),
        };
        trace!(
            action = envelope.action(),
            kind = %envelope.kind(),
            id = envelope.item_id(),
            "decoded frame"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => return StreamEnd::Cancelled,
            sent = tx.send(envelope) => {
                if sent.is_err() {
                    return StreamEnd::ConsumerGone;
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
