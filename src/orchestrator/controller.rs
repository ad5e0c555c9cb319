//! Request lifecycle controller.
//!
//! Serializes submissions: at most one request is in flight, further submit commands are
//! answered with a status message until it resolves.

use crate::client::StatsTransport;
use crate::model::{StatsRequest, SubmitResult};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Commands emitted by the UI layer.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Submit(StatsRequest),
    Quit,
}

/// Events sent back to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UiEvent {
    Info(String),
    SubmissionResolved(SubmitResult),
}

/// Spawn a request task and return its handle.
fn start_request(
    transport: Arc<dyn StatsTransport>,
    request: StatsRequest,
) -> tokio::task::JoinHandle<SubmitResult> {
    tokio::spawn(async move { transport.post_stats(&request).await })
}

/// Dispatch submit commands and emit resolutions until the UI quits.
pub(crate) async fn run_controller(
    transport: Arc<dyn StatsTransport>,
    event_tx: UnboundedSender<UiEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut in_flight: Option<tokio::task::JoinHandle<SubmitResult>> = None;

    let res = loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Submit(request)) => {
                        if in_flight.is_some() {
                            tracing::debug!("submit ignored, request already in flight");
                            let _ = event_tx.send(UiEvent::Info(
                                "A request is already pending…".into(),
                            ));
                            continue;
                        }
                        tracing::info!(
                            entities = request.variations.len(),
                            stat_type = request.stat_type.as_str(),
                            "dispatching statistics request"
                        );
                        let _ = event_tx.send(UiEvent::Info("Submitting…".into()));
                        in_flight = Some(start_request(transport.clone(), request));
                    }
                    // Pending requests are not awaited on quit.
                    Some(UiCommand::Quit) | None => break Ok(()),
                }
            }
            // Keep the JoinHandle in place until this branch wins so it is never dropped
            // while another branch is selected.
            joined = async {
                match in_flight.as_mut() {
                    Some(h) => h.await,
                    None => futures::future::pending().await,
                }
            } => {
                in_flight = None;
                let result = match joined {
                    Ok(r) => r,
                    Err(e) => SubmitResult::TransportError(format!("Request task failed: {e}")),
                };
                tracing::debug!(kind = result.kind(), "request resolved");
                let _ = event_tx.send(UiEvent::SubmissionResolved(result));
            }
        }
    };

    if let Some(h) = in_flight {
        h.abort();
    }
    res
}
