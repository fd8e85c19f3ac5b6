//! Per-job processing

use docfreq_core::{count_words, encode_report, top_words, FrequencyReport, Job, TOP_WORDS};
use docfreq_interfaces::KeyValueStore;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::ExecutionError;

/// How long a stored report stays in the result cache by default
pub const DEFAULT_REPORT_TTL: Duration = Duration::from_secs(30);

/// Computes frequency reports and stores them in the result cache
pub struct WorkerProcessor {
    store: Arc<dyn KeyValueStore>,
    report_ttl: Duration,
}

impl WorkerProcessor {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_report_ttl(store, DEFAULT_REPORT_TTL)
    }

    pub fn with_report_ttl(store: Arc<dyn KeyValueStore>, report_ttl: Duration) -> Self {
        Self { store, report_ttl }
    }

    /// Process one job
    ///
    /// The job's `duration_seconds` is spent waiting before the report is
    /// stored. Cancellation during that wait returns
    /// [`ExecutionError::Cancelled`] and stores nothing. A failed store is
    /// logged, and the report is returned regardless.
    pub async fn process(
        &self,
        job: &Job,
        cancel: &CancellationToken,
    ) -> Result<FrequencyReport, ExecutionError> {
        let document_id = job.effective_id();
        debug!("Processing document {}", document_id);

        let frequencies = top_words(count_words(&job.document), TOP_WORDS);
        let report = FrequencyReport::new(document_id, frequencies);

        if job.duration_seconds > 0 {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(ExecutionError::Cancelled {
                        document_id: report.document_id,
                    });
                }
                _ = tokio::time::sleep(Duration::from_secs(job.duration_seconds)) => {}
            }
        }

        let encoded = encode_report(&report)?;
        if let Err(e) = self
            .store
            .store(report.document_id.as_str(), encoded, self.report_ttl)
            .await
        {
            error!("Failed to store report for document {}: {}", report.document_id, e);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfreq_caching::MemoryStore;
    use docfreq_core::{decode_report, DocumentId, DocumentRequest, FrequencyEntry};
    use docfreq_interfaces::testing::MockStore;
    use docfreq_interfaces::CacheError;

    fn job(document: &str, duration_seconds: u64) -> Job {
        Job::from_request(DocumentRequest::new(document, duration_seconds))
    }

    #[tokio::test]
    async fn test_process_stores_report() {
        let store = Arc::new(MemoryStore::new());
        let processor = WorkerProcessor::new(store.clone());
        let job = job("ABC 123 ABC", 0);

        let report = processor
            .process(&job, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.document_id, job.id);
        assert_eq!(
            report.frequencies,
            vec![FrequencyEntry::new("ABC", 2), FrequencyEntry::new("123", 1)]
        );

        let stored = store.retrieve(job.id.as_str()).await.unwrap().unwrap();
        assert_eq!(decode_report(&stored).unwrap(), report);
    }

    #[tokio::test]
    async fn test_empty_id_falls_back_to_content_id() {
        let store = Arc::new(MemoryStore::new());
        let processor = WorkerProcessor::new(store.clone());
        let mut job = job("One two THREE", 0);
        job.id = DocumentId::from_raw("");

        let report = processor
            .process(&job, &CancellationToken::new())
            .await
            .unwrap();
        let expected = DocumentId::for_document("One two THREE");
        assert_eq!(report.document_id, expected);
        assert!(store.retrieve(expected.as_str()).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_duration() {
        let store = Arc::new(MemoryStore::new());
        let processor = WorkerProcessor::new(store.clone());
        let job = job("slow", 2);

        let started = tokio::time::Instant::now();
        processor
            .process(&job, &CancellationToken::new())
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_job_stores_nothing() {
        let store = Arc::new(MemoryStore::new());
        let processor = WorkerProcessor::new(store.clone());
        let job = job("never stored", 5);
        let cancel = CancellationToken::new();

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                cancel.cancel();
            })
        };

        let err = processor.process(&job, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        canceller.await.unwrap();
        assert!(store.retrieve(job.id.as_str()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_failure_still_returns_report() {
        let mut store = MockStore::new();
        store
            .expect_store()
            .times(1)
            .returning(|key, _, _| Err(CacheError::backend("storing", key, "connection refused")));

        let processor = WorkerProcessor::new(Arc::new(store));
        let report = processor
            .process(&job("a a b", 0), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.frequencies[0], FrequencyEntry::new("a", 2));
    }

    #[tokio::test]
    async fn test_report_ttl_is_passed_to_store() {
        let mut store = MockStore::new();
        store
            .expect_store()
            .withf(|_, _, ttl| *ttl == Duration::from_secs(5))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let processor = WorkerProcessor::with_report_ttl(Arc::new(store), Duration::from_secs(5));
        processor
            .process(&job("x", 0), &CancellationToken::new())
            .await
            .unwrap();
    }
}
