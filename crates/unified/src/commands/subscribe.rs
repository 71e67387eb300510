//! `protect subscribe`: print Protect event or device streams until
//! Ctrl-C or the console closes the socket.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use unified_api::{Client, HandlerRegistry, StreamDispatcher, StreamEnd, StreamEnvelope, Subscription};

use crate::cli::{OutputFormat, SubscribeCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(command: SubscribeCommand, client: &Client, format: OutputFormat) -> Result<(), CliError> {
    let end = match command {
        SubscribeCommand::Events { kinds } => {
            let subscription = client.protect().subscribe_events().await?;
            consume(subscription, &kinds, format).await?
        }
        SubscribeCommand::Devices { kinds } => {
            let subscription = client.protect().subscribe_devices().await?;
            consume(subscription, &kinds, format).await?
        }
    };

    match end {
        StreamEnd::Failed(err) => Err(err.into()),
        StreamEnd::Cancelled | StreamEnd::ConsumerGone => {
            info!("subscription closed");
            Ok(())
        }
    }
}

/// Print every envelope in arrival order, or only `kinds` through the
/// typed dispatcher.
async fn consume<E>(
    mut subscription: Subscription<E>,
    kinds: &[E::Kind],
    format: OutputFormat,
) -> Result<StreamEnd, CliError>
where
    E: StreamEnvelope + Serialize,
{
    if kinds.is_empty() {
        while let Some(envelope) = subscription.recv().await {
            output::print(format, &envelope)?;
        }
        return Ok(subscription.finish().await);
    }

    let handlers = Arc::new(HandlerRegistry::<E>::new());
    for &kind in kinds {
        handlers
            .on_kind(kind, move |_action: String, envelope: Arc<E>| async move {
                match output::render(format, envelope.as_ref()) {
                    Ok(line) => output::print_output(&line),
                    Err(e) => warn!(error = %e, "could not render event"),
                }
            })
            .await;
    }
    info!(kinds = ?kinds, "filtering subscription");

    Ok(StreamDispatcher::spawn(subscription, handlers).join().await)
}
