#[cfg(test)]
#[path = "progress_test.rs"]
mod tests;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;

use crate::domain::models::Event;

pub const PROGRESS_TICK: Duration = Duration::from_millis(500);
pub const PROGRESS_MAX_INCREMENT: f64 = 15.0;
/// Simulated progress never passes this until the response arrives.
pub const PROGRESS_CAP: f64 = 90.0;

/// Cosmetic progress indicator for an in-flight request. Sends a random
/// increment every tick until cancelled.
pub struct ProgressTimer {
    handle: JoinHandle<()>,
}

impl ProgressTimer {
    pub fn start(tx: mpsc::UnboundedSender<Event>) -> ProgressTimer {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + PROGRESS_TICK, PROGRESS_TICK);
            loop {
                interval.tick().await;
                let increment = rand::random::<f64>() * PROGRESS_MAX_INCREMENT;
                if tx.send(Event::GenerationProgress(increment)).is_err() {
                    return;
                }
            }
        });

        return ProgressTimer { handle };
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for ProgressTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Applies one tick to the current progress, capped below completion.
pub fn advance_progress(current: f64, increment: f64) -> f64 {
    return (current + increment).min(PROGRESS_CAP);
}
