/*
 * Responsibility
 * - リクエスト完了後の usage 報告を、リクエスト処理から切り離して実行する
 * - 失敗はログに出すだけ (レスポンスには一切影響させない)
 *
 * Notes
 * - 投入は try_send のみ。キューが詰まっていたら記録を捨てて warn を出す
 * - 同時実行数と 1 件あたりの寿命を上限で縛る (gatekeeper が固まっても溜まり続けない)
 */
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc, mpsc::error::TrySendError};

use crate::services::policy::{PolicyRequest, PolicyService};

#[derive(Debug, Clone, Copy)]
pub struct UsageSettings {
    // Pending reports held before new ones are dropped.
    pub queue_capacity: usize,
    // Reports allowed to talk to the gatekeeper at the same time.
    pub max_in_flight: usize,
    // Upper bound on a single report, including connect.
    pub report_timeout: Duration,
}

impl Default for UsageSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            max_in_flight: 32,
            report_timeout: Duration::from_secs(10),
        }
    }
}

/// Handle for submitting usage reports to the background worker.
///
/// Cheap to clone. The worker stops once every handle is dropped and the queue drains.
#[derive(Clone, Debug)]
pub struct UsageReporter {
    tx: mpsc::Sender<PolicyRequest>,
}

impl UsageReporter {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(policy: Arc<dyn PolicyService>, settings: UsageSettings) -> Self {
        let (tx, rx) = mpsc::channel(settings.queue_capacity.max(1));
        tokio::spawn(run_worker(rx, policy, settings));
        Self { tx }
    }

    /// Queue a report. Never blocks and never fails the caller.
    pub fn submit(&self, request: PolicyRequest) {
        match self.tx.try_send(request) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!(
                    realm = %dropped.organization,
                    method = %dropped.method,
                    path = %dropped.path,
                    "usage report queue full; dropping record"
                );
            }
            Err(TrySendError::Closed(dropped)) => {
                tracing::warn!(
                    realm = %dropped.organization,
                    method = %dropped.method,
                    path = %dropped.path,
                    "usage reporter is not running; dropping record"
                );
            }
        }
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<PolicyRequest>,
    policy: Arc<dyn PolicyService>,
    settings: UsageSettings,
) {
    let permits = Arc::new(Semaphore::new(settings.max_in_flight.max(1)));

    while let Some(request) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let policy = policy.clone();

        tokio::spawn(async move {
            report_one(policy.as_ref(), &request, settings.report_timeout).await;
            drop(permit);
        });
    }

    tracing::debug!("usage reporter stopped");
}

async fn report_one(policy: &dyn PolicyService, request: &PolicyRequest, timeout: Duration) {
    match tokio::time::timeout(timeout, policy.report_usage(request)).await {
        Ok(Ok(())) => {
            tracing::debug!(
                realm = %request.organization,
                method = %request.method,
                path = %request.path,
                "usage recorded"
            );
        }
        Ok(Err(err)) => {
            tracing::warn!(
                error = %err,
                realm = %request.organization,
                method = %request.method,
                path = %request.path,
                "usage recording failed"
            );
        }
        Err(_) => {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                realm = %request.organization,
                method = %request.method,
                path = %request.path,
                "usage recording timed out"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::services::document::Decision;
    use crate::services::policy::{PolicyError, UsageError};

    #[derive(Default)]
    struct RecordingPolicy {
        hang_first: bool,
        fail: bool,
        attempts: AtomicUsize,
        recorded: Mutex<Vec<PolicyRequest>>,
    }

    #[async_trait]
    impl PolicyService for RecordingPolicy {
        async fn check_authorization(&self, _: &PolicyRequest) -> Result<Decision, PolicyError> {
            Ok(Decision::default())
        }

        async fn report_usage(&self, request: &PolicyRequest) -> Result<(), UsageError> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.hang_first && n == 0 {
                std::future::pending::<()>().await;
            }
            if self.fail {
                return Err(UsageError::Rejected { status: 503 });
            }
            self.recorded.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    async fn wait_until(cond: impl Fn() -> bool) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn submitted_reports_reach_the_policy_service() {
        let policy = Arc::new(RecordingPolicy::default());
        let reporter = UsageReporter::spawn(policy.clone(), UsageSettings::default());

        reporter.submit(PolicyRequest::new("acme", "GET", "/question"));
        reporter.submit(PolicyRequest::new("acme", "POST", "/question"));

        wait_until(|| policy.recorded.lock().unwrap().len() == 2).await;
        let recorded = policy.recorded.lock().unwrap();
        assert!(recorded.contains(&PolicyRequest::new("acme", "GET", "/question")));
        assert!(recorded.contains(&PolicyRequest::new("acme", "POST", "/question")));
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let policy = Arc::new(RecordingPolicy {
            fail: true,
            ..Default::default()
        });
        let reporter = UsageReporter::spawn(policy.clone(), UsageSettings::default());

        reporter.submit(PolicyRequest::new("acme", "GET", "/"));
        reporter.submit(PolicyRequest::new("acme", "GET", "/"));

        wait_until(|| policy.attempts.load(Ordering::SeqCst) == 2).await;
        assert!(policy.recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn hung_report_is_bounded_and_frees_its_slot() {
        let policy = Arc::new(RecordingPolicy {
            hang_first: true,
            ..Default::default()
        });
        let settings = UsageSettings {
            queue_capacity: 8,
            max_in_flight: 1,
            report_timeout: Duration::from_millis(50),
        };
        let reporter = UsageReporter::spawn(policy.clone(), settings);

        reporter.submit(PolicyRequest::new("acme", "GET", "/slow"));
        reporter.submit(PolicyRequest::new("acme", "GET", "/next"));

        wait_until(|| policy.recorded.lock().unwrap().len() == 1).await;
        assert_eq!(
            policy.recorded.lock().unwrap()[0],
            PolicyRequest::new("acme", "GET", "/next")
        );
    }

    #[tokio::test]
    async fn full_queue_drops_without_blocking() {
        let policy = Arc::new(RecordingPolicy {
            hang_first: true,
            ..Default::default()
        });
        let settings = UsageSettings {
            queue_capacity: 1,
            max_in_flight: 1,
            report_timeout: Duration::from_secs(60),
        };
        let reporter = UsageReporter::spawn(policy.clone(), settings);

        for _ in 0..100 {
            reporter.submit(PolicyRequest::new("acme", "GET", "/"));
        }

        // First report hangs for the whole test; nothing else can complete.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(policy.recorded.lock().unwrap().is_empty());
        assert!(policy.attempts.load(Ordering::SeqCst) <= 1);
    }
}
