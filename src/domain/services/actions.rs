#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time;

use crate::domain::models::Action;
use crate::domain::models::BackendBox;
use crate::domain::models::ClientError;
use crate::domain::models::Event;
use crate::domain::models::GenerationOutcome;
use crate::domain::models::GenerationRequest;

/// Pause between the progress bar reaching 100% and the result being shown.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

async fn generate(
    backend: Arc<BackendBox>,
    request: GenerationRequest,
    tx: mpsc::UnboundedSender<Event>,
) -> Result<()> {
    let outcome = match backend.generate(&request).await {
        Ok(res) => GenerationOutcome::Response(res),
        Err(err) => {
            tracing::error!(error = ?err, "Generation request failed");
            GenerationOutcome::Failed(ClientError::NetworkOrHttp(format!("{err:#}")).to_string())
        }
    };

    tx.send(Event::GenerationSettling())?;
    time::sleep(SETTLE_DELAY).await;
    tx.send(Event::GenerationSettled(outcome))?;

    return Ok(());
}

async fn health_check(backend: Arc<BackendBox>, tx: mpsc::UnboundedSender<Event>) -> Result<()> {
    let res = backend
        .health_check()
        .await
        .map_err(|err| return format!("{err:#}"));

    tx.send(Event::BackendHealth(res))?;
    return Ok(());
}

pub struct ActionsService {}

impl ActionsService {
    /// Runs backend work off the UI loop. Each request runs to completion,
    /// there is no abort.
    pub async fn start(
        backend: BackendBox,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let backend = Arc::new(backend);

        while let Some(action) = rx.recv().await {
            let worker_tx = tx.clone();
            let worker_backend = backend.clone();

            match action {
                Action::BackendHealthCheck() => {
                    tokio::spawn(async move {
                        if let Err(err) = health_check(worker_backend, worker_tx).await {
                            tracing::warn!(error = ?err, "Failed to report health check");
                        }
                    });
                }
                Action::BackendRequest(request) => {
                    tokio::spawn(async move {
                        if let Err(err) = generate(worker_backend, request, worker_tx).await {
                            tracing::warn!(error = ?err, "Failed to report generation outcome");
                        }
                    });
                }
            }
        }

        return Ok(());
    }
}
