//! Queue subscription loop

use docfreq_core::decode_job;
use docfreq_interfaces::WorkQueue;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::processor::WorkerProcessor;

/// Configuration for the subscription loop
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Channel to pull jobs from
    pub channel: String,

    /// Upper bound on concurrently processed jobs, unbounded when `None`
    pub max_in_flight: Option<usize>,

    /// Pause after a failed pull before pulling again
    pub error_backoff: Duration,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            channel: "worker_document_parser".to_string(),
            max_in_flight: None,
            error_backoff: Duration::from_millis(100),
        }
    }
}

/// Pulls jobs from the work queue and processes each in its own task
pub struct Subscriber {
    queue: Arc<dyn WorkQueue>,
    processor: Arc<WorkerProcessor>,
    config: SubscriberConfig,
    tracker: TaskTracker,
}

impl Subscriber {
    pub fn new(
        queue: Arc<dyn WorkQueue>,
        processor: Arc<WorkerProcessor>,
        config: SubscriberConfig,
    ) -> Self {
        Self {
            queue,
            processor,
            config,
            tracker: TaskTracker::new(),
        }
    }

    /// Tracker of the per-job tasks spawned so far
    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    /// Run until `cancel` fires, then wait for in-flight jobs to finish
    ///
    /// In-flight jobs see the same token and stop at their next
    /// cancellation point.
    pub async fn run(&self, cancel: CancellationToken) {
        info!("Subscribing to channel {}", self.config.channel);

        let limit = self
            .config
            .max_in_flight
            .map(|n| Arc::new(Semaphore::new(n.max(1))));

        let (tx, rx) = mpsc::channel(1);
        tokio::join!(
            self.receive(tx, limit, cancel.clone()),
            self.handle(rx, cancel.clone())
        );

        self.tracker.close();
        self.tracker.wait().await;
        info!("Unsubscribed from channel {}", self.config.channel);
    }

    /// Pull messages and hand them to the handler loop
    ///
    /// When bounded, a slot is reserved before each pull so no message is
    /// taken off the queue without a task to run it.
    async fn receive(
        &self,
        tx: mpsc::Sender<Admitted>,
        limit: Option<Arc<Semaphore>>,
        cancel: CancellationToken,
    ) {
        let channel = self.config.channel.as_str();
        loop {
            let permit = match &limit {
                Some(limit) => {
                    let acquired = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        acquired = limit.clone().acquire_owned() => acquired,
                    };
                    match acquired {
                        Ok(permit) => Some(permit),
                        Err(_) => break,
                    }
                }
                None => None,
            };

            let pulled = self.queue.pull(channel, &cancel).await;

            // The pull may have completed just as the token fired
            if cancel.is_cancelled() {
                break;
            }

            let payload = match pulled {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("Error pulling from channel {}: {}", channel, e);
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.config.error_backoff) => continue,
                    }
                }
            };

            if cancel.is_cancelled() {
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                sent = tx.send(Admitted { permit, payload }) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }
        debug!("Stopped receiving from channel {}", channel);
    }

    async fn handle(&self, mut rx: mpsc::Receiver<Admitted>, cancel: CancellationToken) {
        loop {
            let Admitted { permit, payload } = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                received = rx.recv() => match received {
                    Some(admitted) => admitted,
                    None => break,
                },
            };

            let job = match decode_job(&payload) {
                Ok(job) => job,
                Err(e) => {
                    error!("Dropping undecodable message: {}", e);
                    continue;
                }
            };

            let processor = self.processor.clone();
            let cancel = cancel.clone();
            self.tracker.spawn(async move {
                let _permit = permit;
                match processor.process(&job, &cancel).await {
                    Ok(report) => debug!(
                        "Processed document {} ({} distinct words reported)",
                        report.document_id,
                        report.frequencies.len()
                    ),
                    Err(e) if e.is_cancelled() => debug!("{}", e),
                    Err(e) => error!("Failed to process job: {}", e),
                }
            });
        }
    }
}

/// A pulled message together with the slot reserved for it
struct Admitted {
    permit: Option<OwnedSemaphorePermit>,
    payload: Vec<u8>,
}
