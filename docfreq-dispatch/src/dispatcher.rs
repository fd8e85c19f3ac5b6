//! Submit-and-wait over the work queue and the result cache

use docfreq_caching::retrieve_within;
use docfreq_core::{decode_report, encode_job, DocumentId, DocumentRequest, FrequencyReport, Job};
use docfreq_interfaces::{KeyValueStore, WorkQueue};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::DispatchError;

/// Dispatcher settings
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Channel jobs are pushed on
    pub channel: String,

    /// Deadline for each cache read; a slower read counts as a miss
    pub probe_timeout: Duration,

    /// Delay between cache reads while waiting for a report
    pub poll_interval: Duration,

    /// Overall time budget of one submission
    pub request_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            channel: "worker_document_parser".to_string(),
            probe_timeout: Duration::from_millis(20),
            poll_interval: Duration::from_millis(50),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Submits documents and waits for their frequency reports
///
/// The result cache is the only link to the workers: a report present under
/// a document's id means the job is done. Each submission pushes at most one
/// job.
pub struct Dispatcher {
    queue: Arc<dyn WorkQueue>,
    store: Arc<dyn KeyValueStore>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(
        queue: Arc<dyn WorkQueue>,
        store: Arc<dyn KeyValueStore>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            queue,
            store,
            config,
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Submit `request` and wait for its report
    ///
    /// Fails with [`DispatchError::Cancelled`] when `cancel` fires and with
    /// [`DispatchError::DeadlineExceeded`] once the configured request timeout
    /// has passed, whichever comes first.
    pub async fn submit(
        &self,
        request: DocumentRequest,
        cancel: &CancellationToken,
    ) -> Result<FrequencyReport, DispatchError> {
        if request.document.is_empty() {
            return Err(DispatchError::InvalidRequest);
        }

        let job = Job::from_request(request);
        let document_id = job.id.clone();
        let timeout = self.config.request_timeout;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DispatchError::Cancelled { document_id }),
            _ = tokio::time::sleep(timeout) => Err(DispatchError::DeadlineExceeded {
                document_id,
                timeout,
            }),
            result = self.dispatch(job) => result,
        }
    }

    async fn dispatch(&self, job: Job) -> Result<FrequencyReport, DispatchError> {
        if let Some(report) = self.lookup(&job.id).await? {
            debug!("Document {} served from cache", job.id);
            return Ok(report);
        }

        let message = encode_job(&job)?;
        self.queue.push(&self.config.channel, vec![message]).await?;
        debug!("Enqueued document {} on {}", job.id, self.config.channel);

        let mut ticker = tokio::time::interval_at(
            Instant::now() + self.config.poll_interval,
            self.config.poll_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Some(report) = self.lookup(&job.id).await? {
                debug!("Document {} completed", job.id);
                return Ok(report);
            }
        }
    }

    /// Bounded cache read of the report for `document_id`
    async fn lookup(
        &self,
        document_id: &DocumentId,
    ) -> Result<Option<FrequencyReport>, DispatchError> {
        let cached = retrieve_within(
            self.store.as_ref(),
            document_id.as_str(),
            self.config.probe_timeout,
        )
        .await?;

        let Some(bytes) = cached else {
            return Ok(None);
        };
        let report = decode_report(&bytes)?;
        if report.document_id != *document_id {
            return Err(DispatchError::Mismatch {
                expected: document_id.clone(),
                found: report.document_id,
            });
        }
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfreq_caching::MemoryStore;
    use docfreq_core::{decode_job, encode_report, FrequencyEntry};
    use docfreq_interfaces::testing::{MockQueue, MockStore};
    use docfreq_interfaces::QueueError;
    use docfreq_queue::{BufferedQueue, MemoryBroker};

    type TestQueue = BufferedQueue<MemoryBroker>;

    fn setup(config: DispatcherConfig) -> (Dispatcher, Arc<TestQueue>, Arc<MemoryStore>) {
        let queue = Arc::new(BufferedQueue::new(MemoryBroker::new()));
        let store = Arc::new(MemoryStore::new());
        let dispatcher = Dispatcher::new(queue.clone(), store.clone(), config);
        (dispatcher, queue, store)
    }

    /// Pull one job and store a report for it after `delay`
    fn spawn_worker(queue: Arc<TestQueue>, store: Arc<MemoryStore>, delay: Duration) {
        tokio::spawn(async move {
            let cancel = CancellationToken::new();
            let message = queue
                .pull("worker_document_parser", &cancel)
                .await
                .unwrap();
            let job = decode_job(&message).unwrap();
            tokio::time::sleep(delay).await;

            let report = FrequencyReport::new(job.id.clone(), vec![FrequencyEntry::new("w", 1)]);
            store
                .store(
                    job.id.as_str(),
                    encode_report(&report).unwrap(),
                    Duration::from_secs(30),
                )
                .await
                .unwrap();
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_skips_queue() {
        let (dispatcher, queue, store) = setup(DispatcherConfig::default());
        let id = DocumentId::for_document("cached doc");
        let report = FrequencyReport::new(id.clone(), vec![FrequencyEntry::new("cached", 1)]);
        store
            .store(id.as_str(), encode_report(&report).unwrap(), Duration::ZERO)
            .await
            .unwrap();

        let result = dispatcher
            .submit(DocumentRequest::new("cached doc", 0), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result, report);
        assert_eq!(queue.stats().pushed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_enqueues_and_waits() {
        let (dispatcher, queue, store) = setup(DispatcherConfig::default());
        spawn_worker(queue.clone(), store.clone(), Duration::from_millis(120));

        let result = dispatcher
            .submit(DocumentRequest::new("fresh doc", 0), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.document_id, DocumentId::for_document("fresh doc"));
        assert_eq!(queue.stats().pushed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_message_carries_request() {
        let (dispatcher, queue, _store) = setup(DispatcherConfig {
            request_timeout: Duration::from_millis(100),
            ..Default::default()
        });

        let _ = dispatcher
            .submit(DocumentRequest::new("a b c", 3), &CancellationToken::new())
            .await;

        let message = queue
            .pull("worker_document_parser", &CancellationToken::new())
            .await
            .unwrap();
        let job = decode_job(&message).unwrap();
        assert_eq!(job.document, "a b c");
        assert_eq!(job.duration_seconds, 3);
        assert_eq!(job.id, DocumentId::for_document("a b c"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let (dispatcher, queue, _store) = setup(DispatcherConfig {
            request_timeout: Duration::from_millis(300),
            ..Default::default()
        });

        let started = Instant::now();
        let err = dispatcher
            .submit(DocumentRequest::new("nobody home", 0), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::DeadlineExceeded { .. }));
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert_eq!(queue.stats().pushed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled() {
        let (dispatcher, _queue, _store) = setup(DispatcherConfig::default());
        let cancel = CancellationToken::new();
        {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                cancel.cancel();
            });
        }

        let err = dispatcher
            .submit(DocumentRequest::new("cancelled", 0), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Cancelled { .. }));
    }

    #[tokio::test]
    async fn test_empty_document_rejected() {
        let (dispatcher, queue, _store) = setup(DispatcherConfig::default());
        let err = dispatcher
            .submit(DocumentRequest::new("", 0), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidRequest));
        assert_eq!(err.to_string(), "invalid document");
        assert_eq!(queue.stats().pushed, 0);
    }

    #[tokio::test]
    async fn test_mismatched_report_is_an_error() {
        let (dispatcher, _queue, store) = setup(DispatcherConfig::default());
        let id = DocumentId::for_document("doc");
        let wrong = FrequencyReport::new(DocumentId::from_raw("someone else"), vec![]);
        store
            .store(id.as_str(), encode_report(&wrong).unwrap(), Duration::ZERO)
            .await
            .unwrap();

        let err = dispatcher
            .submit(DocumentRequest::new("doc", 0), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Mismatch { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_cached_value_is_an_error() {
        let (dispatcher, _queue, store) = setup(DispatcherConfig::default());
        let id = DocumentId::for_document("doc");
        store
            .store(id.as_str(), b"garbage".to_vec(), Duration::ZERO)
            .await
            .unwrap();

        let err = dispatcher
            .submit(DocumentRequest::new("doc", 0), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Codec(_)));
    }

    #[tokio::test]
    async fn test_push_failure_propagates() {
        let mut queue = MockQueue::new();
        queue
            .expect_push()
            .times(1)
            .returning(|channel, _| Err(QueueError::backend("pushing to", channel, "broken pipe")));

        let dispatcher = Dispatcher::new(
            Arc::new(queue),
            Arc::new(MemoryStore::new()),
            DispatcherConfig::default(),
        );
        let err = dispatcher
            .submit(DocumentRequest::new("doc", 0), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Queue(QueueError::Backend { .. })));
    }

    #[tokio::test]
    async fn test_cache_failure_propagates() {
        let mut store = MockStore::new();
        store.expect_retrieve().returning(|key| {
            Err(docfreq_interfaces::CacheError::backend("retrieving", key, "timeout"))
        });

        let mut queue = MockQueue::new();
        queue.expect_push().never();

        let dispatcher =
            Dispatcher::new(Arc::new(queue), Arc::new(store), DispatcherConfig::default());
        let err = dispatcher
            .submit(DocumentRequest::new("doc", 0), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Cache(_)));
    }
}
