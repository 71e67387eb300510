// Integration tests for event subscriptions against a local WebSocket server.
#![allow(clippy::unwrap_used)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderMap;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use tokio_util::sync::CancellationToken;

use unified_api::events::{CameraDevice, DeviceModelKind, ProtectEventKind, RingEvent};
use unified_api::{
    Client, ClientConfig, Error, HandlerRegistry, ProtectDeviceEvent, ProtectEvent, Scheme,
    StreamDispatcher, StreamEnd, StreamEnvelope,
};

const API_KEY: &str = "ws-test-key";

// ── Helpers ─────────────────────────────────────────────────────────

/// Accept one WebSocket connection and hand it to `script`. Resolves the
/// returned receiver with the upgrade request's headers.
async fn serve<F, Fut>(script: F) -> (SocketAddr, oneshot::Receiver<HeaderMap>)
where
    F: FnOnce(WebSocketStream<TcpStream>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (headers_tx, headers_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_hdr_async(stream, |req: &Request, resp: Response| {
            let _ = headers_tx.send(req.headers().clone());
            Ok(resp)
        })
        .await
        .unwrap();
        script(ws).await;
    });

    (addr, headers_rx)
}

fn client_for(addr: SocketAddr, cancel: CancellationToken) -> Client {
    let config = ClientConfig::new(API_KEY)
        .with_host(addr.to_string())
        .with_scheme(Scheme::Plaintext);
    Client::new(config, cancel).unwrap()
}

fn ring(id: &str) -> Message {
    Message::text(format!(
        r#"{{"type":"add","item":{{"id":"{id}","modelKey":"event","type":"ring","device":"doorbell"}}}}"#
    ))
}

/// Park until the client goes away.
async fn drain(mut ws: WebSocketStream<TcpStream>) {
    while let Some(Ok(_)) = ws.next().await {}
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_events_are_delivered_then_close_is_reported() {
    let (addr, headers) = serve(|mut ws| async move {
        ws.send(ring("r-1")).await.unwrap();
        ws.send(ring("r-2")).await.unwrap();
        ws.send(Message::Close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: Utf8Bytes::from_static("bye"),
        })))
        .await
        .unwrap();
        drain(ws).await;
    })
    .await;

    let client = client_for(addr, CancellationToken::new());
    let mut events = client.protect().subscribe_events().await.unwrap();

    let headers = headers.await.unwrap();
    assert_eq!(headers.get("x-api-key").unwrap(), API_KEY);
    assert!(headers.get("accept").is_none());
    assert!(headers.get("content-type").is_none());

    let first = events.recv().await.unwrap();
    let second = events.recv().await.unwrap();
    assert_eq!(first.item_id(), "r-1");
    assert_eq!(second.item_id(), "r-2");
    assert_eq!(second.kind(), ProtectEventKind::Ring);
    assert!(events.recv().await.is_none());

    match events.finish().await {
        StreamEnd::Failed(Error::WebSocketClosed { code, reason }) => {
            assert_eq!(code, 1000);
            assert_eq!(reason, "bye");
        }
        other => panic!("unexpected end: {other:?}"),
    }
}

#[tokio::test]
async fn test_binary_frame_fails_the_subscription() {
    let (addr, _headers) = serve(|mut ws| async move {
        ws.send(Message::binary(vec![0u8, 1, 2])).await.unwrap();
        drain(ws).await;
    })
    .await;

    let client = client_for(addr, CancellationToken::new());
    let mut events = client.protect().subscribe_events().await.unwrap();

    assert!(events.recv().await.is_none());
    assert!(matches!(
        events.finish().await,
        StreamEnd::Failed(Error::UnexpectedFrame("binary"))
    ));
}

#[tokio::test]
async fn test_cancellation_closes_the_subscription() {
    let (addr, _headers) = serve(drain).await;

    let cancel = CancellationToken::new();
    let client = client_for(addr, cancel.clone());
    let mut events = client.protect().subscribe_events().await.unwrap();

    cancel.cancel();
    assert!(events.recv().await.is_none());
    assert!(matches!(events.finish().await, StreamEnd::Cancelled));
}

#[tokio::test]
async fn test_handshake_failure_is_a_connect_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr, CancellationToken::new());
    let err = client.protect().subscribe_devices().await.unwrap_err();
    assert!(matches!(err, Error::WebSocketConnect(_)));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_device_updates_route_through_dispatcher() {
    let (addr, _headers) = serve(|mut ws| async move {
        for body in [
            r#"{"type":"update","item":{"id":"cam-1","modelKey":"camera","micVolume":50}}"#,
            r#"{"type":"update","item":{"id":"light-1","modelKey":"light","isLightOn":true}}"#,
            r#"{"type":"remove","item":{"id":"cam-2","modelKey":"camera"}}"#,
        ] {
            ws.send(Message::text(body.to_owned())).await.unwrap();
        }
        ws.close(None).await.unwrap();
        drain(ws).await;
    })
    .await;

    let client = client_for(addr, CancellationToken::new());
    let handlers = Arc::new(HandlerRegistry::<ProtectDeviceEvent>::new());
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    handlers
        .on(move |action, camera: CameraDevice| {
            let seen = seen_tx.clone();
            async move {
                seen.send((action, camera.id)).unwrap();
            }
        })
        .await;

    let subscription = client.protect().subscribe_devices().await.unwrap();
    let dispatcher = StreamDispatcher::spawn(subscription, handlers);

    let end = dispatcher.join().await;
    assert!(end.is_failure(), "server close ends the stream: {end:?}");

    let mut seen = Vec::new();
    while let Ok(item) = seen_rx.try_recv() {
        seen.push(item);
    }
    seen.sort();
    assert_eq!(
        seen,
        vec![
            ("remove".to_owned(), "cam-2".to_owned()),
            ("update".to_owned(), "cam-1".to_owned()),
        ]
    );
    assert_eq!(DeviceModelKind::Camera.tag(), "camera");
}

#[tokio::test]
async fn test_typed_handler_receives_ring_payload() {
    let (addr, _headers) = serve(|mut ws| async move {
        ws.send(ring("r-9")).await.unwrap();
        drain(ws).await;
    })
    .await;

    let cancel = CancellationToken::new();
    let client = client_for(addr, cancel.clone());
    let handlers = Arc::new(HandlerRegistry::<ProtectEvent>::new());
    let (done_tx, done_rx) = oneshot::channel();
    let done_tx = Arc::new(std::sync::Mutex::new(Some(done_tx)));
    handlers
        .on(move |_action, ring: RingEvent| {
            let done_tx = Arc::clone(&done_tx);
            async move {
                if let Some(tx) = done_tx.lock().unwrap().take() {
                    let _ = tx.send(ring.device);
                }
            }
        })
        .await;

    let subscription = client.protect().subscribe_events().await.unwrap();
    let dispatcher = StreamDispatcher::spawn(subscription, handlers);

    assert_eq!(done_rx.await.unwrap(), "doorbell");
    cancel.cancel();
    assert!(matches!(dispatcher.join().await, StreamEnd::Cancelled));
}

#[tokio::test]
async fn test_finish_returns_on_an_idle_stream() {
    let (addr, _headers) = serve(|mut ws| async move {
        ws.send(ring("r-1")).await.unwrap();
        drain(ws).await;
    })
    .await;

    let client = client_for(addr, CancellationToken::new());
    let mut events = client.protect().subscribe_events().await.unwrap();
    assert_eq!(events.recv().await.unwrap().item_id(), "r-1");

    let end = tokio::time::timeout(Duration::from_secs(3), events.finish())
        .await
        .expect("finish() hung on an idle stream");
    assert!(matches!(end, StreamEnd::ConsumerGone));
}

#[tokio::test]
async fn test_cancelling_the_dispatcher_ends_an_idle_stream() {
    let (addr, _headers) = serve(drain).await;

    let client = client_for(addr, CancellationToken::new());
    let subscription = client.protect().subscribe_events().await.unwrap();
    let dispatcher =
        StreamDispatcher::spawn(subscription, Arc::new(HandlerRegistry::<ProtectEvent>::new()));

    dispatcher.cancel();
    let end = tokio::time::timeout(Duration::from_secs(3), dispatcher.join())
        .await
        .expect("join() hung after cancel");
    assert!(matches!(end, StreamEnd::Cancelled));
    assert!(!client.cancellation_token().is_cancelled());
}
