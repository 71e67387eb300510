//! Typed per-kind dispatch over a [`Subscription`].
//!
//! A [`HandlerRegistry`] holds one slot per item kind, each behind its own
//! mutex so registering for one kind never blocks dispatch of another. The
//! [`StreamDispatcher`] consumer loop takes envelopes off the subscription,
//! clones the matching callback out of its slot, releases the lock, and
//! runs the callback in a supervised [`JoinSet`]. Kinds without a callback
//! are dropped.
//!
//! ```rust,ignore
//! let handlers = Arc::new(HandlerRegistry::<ProtectEvent>::new());
//! handlers.on(|action, ring: RingEvent| async move {
//!     println!("{action}: doorbell {}", ring.device);
//! }).await;
//!
//! let subscription = client.protect().subscribe_events().await?;
//! let dispatcher = StreamDispatcher::spawn(subscription, handlers);
//! let end = dispatcher.join().await;
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use strum::IntoEnumIterator;
use tokio::sync::Mutex;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::events::{EventVariant, StreamEnvelope};
use crate::websocket::{StreamEnd, Subscription};

/// Type-erased callback: receives the envelope action and the whole envelope.
pub type Callback<E> = Arc<dyn Fn(String, Arc<E>) -> BoxFuture<'static, ()> + Send + Sync>;

// ── Registry ─────────────────────────────────────────────────────────

/// Per-kind callback slots, pre-populated with every kind.
pub struct HandlerRegistry<E: StreamEnvelope> {
    slots: HashMap<E::Kind, Mutex<Option<Callback<E>>>>,
}

impl<E: StreamEnvelope> Default for HandlerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: StreamEnvelope> std::fmt::Debug for HandlerRegistry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("kinds", &self.slots.len())
            .finish_non_exhaustive()
    }
}

impl<E: StreamEnvelope> HandlerRegistry<E> {
    pub fn new() -> Self {
        Self {
            slots: E::Kind::iter().map(|kind| (kind, Mutex::new(None))).collect(),
        }
    }

    /// Register `callback` for payload type `V`, replacing any previous one.
    pub async fn on<V, F, Fut>(&self, callback: F)
    where
        V: EventVariant<E>,
        F: Fn(String, V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let erased: Callback<E> = Arc::new(move |action: String, envelope: Arc<E>| {
            match V::project(&envelope) {
                Some(payload) => callback(action, payload.clone()).boxed(),
                None => futures_util::future::ready(()).boxed(),
            }
        });
        self.set(V::KIND, Some(erased)).await;
    }

    /// Register an untyped callback for `kind`.
    pub async fn on_kind<F, Fut>(&self, kind: E::Kind, callback: F)
    where
        F: Fn(String, Arc<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let erased: Callback<E> =
            Arc::new(move |action: String, envelope: Arc<E>| callback(action, envelope).boxed());
        self.set(kind, Some(erased)).await;
    }

    /// Remove the callback for payload type `V`.
    pub async fn clear<V: EventVariant<E>>(&self) {
        self.set(V::KIND, None).await;
    }

    pub async fn clear_kind(&self, kind: E::Kind) {
        self.set(kind, None).await;
    }

    async fn set(&self, kind: E::Kind, callback: Option<Callback<E>>) {
        if let Some(slot) = self.slots.get(&kind) {
            *slot.lock().await = callback;
        }
    }

    /// Clone the callback for `kind` out of its slot.
    async fn callback(&self, kind: E::Kind) -> Option<Callback<E>> {
        let slot = self.slots.get(&kind)?;
        slot.lock().await.clone()
    }
}

// ── Dispatcher ───────────────────────────────────────────────────────

/// Running consumer loop for one subscription.
#[derive(Debug)]
pub struct StreamDispatcher<E: StreamEnvelope> {
    handlers: Arc<HandlerRegistry<E>>,
    consumer: JoinHandle<StreamEnd>,
    cancel: CancellationToken,
}

impl<E: StreamEnvelope> StreamDispatcher<E> {
    /// Start consuming `subscription`. Handlers may still be registered or
    /// replaced through [`handlers`](Self::handlers) while it runs.
    ///
    /// The consumer stops on the subscription's own token, so it ends
    /// together with the pinger and read loop.
    pub fn spawn(subscription: Subscription<E>, handlers: Arc<HandlerRegistry<E>>) -> Self {
        let cancel = subscription.cancellation_token().clone();
        let consumer = tokio::spawn(consume(
            subscription,
            Arc::clone(&handlers),
            cancel.clone(),
        ));
        Self {
            handlers,
            consumer,
            cancel,
        }
    }

    pub fn handlers(&self) -> &Arc<HandlerRegistry<E>> {
        &self.handlers
    }

    /// Stop this subscription's consumer, pinger and read loop.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the consumer loop and every callback it started.
    pub async fn join(self) -> StreamEnd {
        self.consumer.await.unwrap_or_else(|e| {
            error!(error = %e, "dispatch consumer panicked");
            StreamEnd::Failed(crate::error::Error::WebSocket(format!(
                "dispatch consumer failed: {e}"
            )))
        })
    }
}

async fn consume<E: StreamEnvelope>(
    mut subscription: Subscription<E>,
    handlers: Arc<HandlerRegistry<E>>,
    cancel: CancellationToken,
) -> StreamEnd {
    let mut tasks = JoinSet::new();

    loop {
        let envelope = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            Some(done) = tasks.join_next(), if !tasks.is_empty() => {
                reap(done);
                continue;
            }
            next = subscription.recv() => match next {
                Some(envelope) => envelope,
                None => break,
            },
        };

        let kind = envelope.kind();
        info!(
            id = envelope.item_id(),
            kind = %kind,
            action = envelope.action(),
            "dispatching event"
        );

        let Some(callback) = handlers.callback(kind).await else {
            debug!(kind = %kind, "no handler registered, dropping event");
            continue;
        };
        let action = envelope.action().to_owned();
        tasks.spawn(callback(action, Arc::new(envelope)));
    }

    while let Some(done) = tasks.join_next().await {
        reap(done);
    }

    let end = subscription.finish().await;
    if cancel.is_cancelled() && !end.is_failure() {
        StreamEnd::Cancelled
    } else {
        end
    }
}

fn reap(done: Result<(), tokio::task::JoinError>) {
    if let Err(e) = done {
        error!(error = %e, "event handler panicked");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::{mpsc, oneshot};

    use super::*;
    use crate::error::Error;
    use crate::events::{
        CameraMotionEvent, ProtectEvent, ProtectEventKind, RingEvent, SensorOpenedEvent,
    };

    fn event(tag: &str, id: &str) -> ProtectEvent {
        let body = format!(r#"{{"type":"add","item":{{"id":"{id}","type":"{tag}","device":"dev-1"}}}}"#);
        ProtectEvent::decode(body.as_bytes()).unwrap()
    }

    fn subscription() -> (
        mpsc::Sender<ProtectEvent>,
        oneshot::Sender<StreamEnd>,
        Subscription<ProtectEvent>,
    ) {
        let (tx, rx) = mpsc::channel(1);
        let (end_tx, end_rx) = oneshot::channel();
        (
            tx,
            end_tx,
            Subscription::from_parts(rx, end_rx, CancellationToken::new()),
        )
    }

    #[tokio::test]
    async fn registry_has_a_slot_per_kind() {
        let registry = HandlerRegistry::<ProtectEvent>::new();
        assert_eq!(registry.slots.len(), 15);
        assert!(registry.callback(ProtectEventKind::Ring).await.is_none());
    }

    #[tokio::test]
    async fn routes_each_kind_to_its_handler() {
        let handlers = Arc::new(HandlerRegistry::<ProtectEvent>::new());
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();

        let rings = seen_tx.clone();
        handlers
            .on(move |action, ring: RingEvent| {
                let rings = rings.clone();
                async move {
                    rings.send(format!("ring:{action}:{}", ring.id)).unwrap();
                }
            })
            .await;
        let opened = seen_tx.clone();
        handlers
            .on(move |_action, event: SensorOpenedEvent| {
                let opened = opened.clone();
                async move {
                    opened.send(format!("opened:{}", event.device)).unwrap();
                }
            })
            .await;
        drop(seen_tx);

        let (tx, end_tx, sub) = subscription();
        let dispatcher = StreamDispatcher::spawn(sub, handlers);

        tx.send(event("ring", "r-1")).await.unwrap();
        tx.send(event("motion", "m-1")).await.unwrap();
        tx.send(event("sensorOpened", "o-1")).await.unwrap();
        drop(tx);
        end_tx.send(StreamEnd::ConsumerGone).unwrap();

        assert!(matches!(dispatcher.join().await, StreamEnd::ConsumerGone));

        let mut seen = Vec::new();
        while let Some(s) = seen_rx.recv().await {
            seen.push(s);
        }
        seen.sort();
        assert_eq!(seen, vec!["opened:dev-1".to_owned(), "ring:add:r-1".to_owned()]);
    }

    #[tokio::test]
    async fn cleared_handler_no_longer_fires() {
        let handlers = Arc::new(HandlerRegistry::<ProtectEvent>::new());
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        handlers
            .on(move |_, _: CameraMotionEvent| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await;
        handlers.clear::<CameraMotionEvent>().await;
        assert!(handlers.callback(ProtectEventKind::CameraMotion).await.is_none());

        let (tx, end_tx, sub) = subscription();
        let dispatcher = StreamDispatcher::spawn(sub, handlers);
        tx.send(event("motion", "m-1")).await.unwrap();
        drop(tx);
        end_tx.send(StreamEnd::ConsumerGone).unwrap();
        dispatcher.join().await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn join_waits_for_in_flight_callbacks() {
        let handlers = Arc::new(HandlerRegistry::<ProtectEvent>::new());
        let done = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&done);
        handlers
            .on_kind(ProtectEventKind::Ring, move |_, _| {
                let flag = Arc::clone(&flag);
                async move {
                    tokio::task::yield_now().await;
                    flag.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await;

        let (tx, end_tx, sub) = subscription();
        let dispatcher = StreamDispatcher::spawn(sub, handlers);
        for i in 0..3 {
            tx.send(event("ring", &format!("r-{i}"))).await.unwrap();
        }
        drop(tx);
        end_tx
            .send(StreamEnd::Failed(Error::WebSocket("gone".into())))
            .unwrap();

        assert!(dispatcher.join().await.is_failure());
        assert_eq!(done.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn cancellation_stops_the_consumer() {
        let (_tx, end_tx, sub) = subscription();
        let cancel = sub.cancellation_token().clone();
        let dispatcher =
            StreamDispatcher::spawn(sub, Arc::new(HandlerRegistry::<ProtectEvent>::new()));

        cancel.cancel();
        end_tx.send(StreamEnd::Cancelled).unwrap();
        assert!(matches!(dispatcher.join().await, StreamEnd::Cancelled));
    }

    #[tokio::test]
    async fn parent_cancellation_reaches_the_consumer() {
        let parent = CancellationToken::new();
        let (_tx, rx) = mpsc::channel::<ProtectEvent>(1);
        let (end_tx, end_rx) = oneshot::channel();
        let sub = Subscription::from_parts(rx, end_rx, parent.child_token());
        let dispatcher =
            StreamDispatcher::spawn(sub, Arc::new(HandlerRegistry::<ProtectEvent>::new()));

        parent.cancel();
        end_tx.send(StreamEnd::Cancelled).unwrap();
        let end = tokio::time::timeout(std::time::Duration::from_secs(5), dispatcher.join())
            .await
            .expect("consumer ignored the parent token");
        assert!(matches!(end, StreamEnd::Cancelled));
    }

    #[tokio::test]
    async fn panicking_handler_does_not_stop_dispatch() {
        let handlers = Arc::new(HandlerRegistry::<ProtectEvent>::new());
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        handlers
            .on(move |_, ring: RingEvent| {
                let counter = Arc::clone(&counter);
                async move {
                    assert_ne!(ring.id, "boom", "handler failure");
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await;

        let (tx, end_tx, sub) = subscription();
        let dispatcher = StreamDispatcher::spawn(sub, handlers);
        tx.send(event("ring", "boom")).await.unwrap();
        tx.send(event("ring", "ok")).await.unwrap();
        drop(tx);
        end_tx.send(StreamEnd::ConsumerGone).unwrap();
        dispatcher.join().await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
