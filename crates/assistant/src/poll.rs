//! Run polling with a decreasing wait interval, deadline enforcement,
//! and cooperative cancellation.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use dossier_core::config::PollConfig;

use crate::api::{AssistantApi, AssistantError};
use crate::types::Run;

/// Wait intervals between status polls: the first wait is `initial`,
/// then each wait shrinks by `step` until it reaches `floor`.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    pub initial: Duration,
    pub floor: Duration,
    pub step: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(10_000),
            floor: Duration::from_millis(2_000),
            step: Duration::from_millis(2_000),
        }
    }
}

impl PollSchedule {
    pub fn from_config(config: &PollConfig) -> Self {
        Self {
            initial: Duration::from_millis(config.initial_ms),
            floor: Duration::from_millis(config.floor_ms),
            step: Duration::from_millis(config.step_ms),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunWaitError {
    /// A status fetch failed on the service side; not retried.
    #[error(transparent)]
    Service(#[from] AssistantError),

    /// The run did not reach a terminal status before the deadline.
    #[error("Run {run_id} timed out after {seconds}s")]
    Timeout { run_id: String, seconds: u64 },

    /// The wait was cancelled from the outside (shutdown).
    #[error("Run {run_id} was cancelled")]
    Cancelled { run_id: String },
}

/// Poll `run` until it leaves the pending statuses, the deadline passes,
/// or `cancel` flips to `true`.
///
/// On deadline or cancellation the remote run is cancelled best-effort
/// before the error is returned. A run that reaches any terminal status
/// is returned as-is; callers decide what a non-completed status means.
pub async fn await_run(
    api: &dyn AssistantApi,
    thread_id: &str,
    mut run: Run,
    schedule: &PollSchedule,
    timeout: Duration,
    mut cancel: watch::Receiver<bool>,
) -> Result<Run, RunWaitError> {
    let start = Instant::now();
    let mut delay = schedule.initial;

    while run.status.is_pending() {
        let remaining = timeout.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            warn!(
                run_id = %run.id,
                timeout_seconds = timeout.as_secs(),
                "Run timed out, cancelling"
            );
            // Best-effort cancel; errors from the cancel itself are ignored.
            let _ = api.cancel_run(thread_id, &run.id).await;
            return Err(RunWaitError::Timeout {
                run_id: run.id,
                seconds: timeout.as_secs(),
            });
        }

        tokio::select! {
            _ = tokio::time::sleep(delay.min(remaining)) => {}
            _ = cancel_requested(&mut cancel) => {
                warn!(run_id = %run.id, "Wait cancelled, stopping run");
                let _ = api.cancel_run(thread_id, &run.id).await;
                return Err(RunWaitError::Cancelled { run_id: run.id });
            }
        }

        if delay > schedule.floor {
            delay = delay.saturating_sub(schedule.step).max(schedule.floor);
        }

        run = api.get_run(thread_id, &run.id).await?;
        debug!(
            run_id = %run.id,
            status = ?run.status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Polled run status"
        );
    }

    Ok(run)
}

/// Resolves when a cancel signal arrives. Never resolves once the sender
/// is gone, so a dropped sender cannot abort the wait.
async fn cancel_requested(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::types::{Assistant, MessageRole, RunStatus, Thread, ThreadMessage};
    use async_trait::async_trait;

    /// Scripted fake: serves a fixed sequence of run statuses and records
    /// when each fetch happened (virtual time) plus any cancel calls.
    struct ScriptedApi {
        statuses: Mutex<Vec<RunStatus>>,
        fetches: Mutex<Vec<Instant>>,
        cancels: Mutex<u32>,
    }

    impl ScriptedApi {
        fn new(statuses: &[RunStatus]) -> Self {
            Self {
                statuses: Mutex::new(statuses.to_vec()),
                fetches: Mutex::new(Vec::new()),
                cancels: Mutex::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.lock().unwrap().len()
        }

        fn cancel_count(&self) -> u32 {
            *self.cancels.lock().unwrap()
        }

        /// Millisecond gaps between consecutive fetches, the first one
        /// measured from `start`.
        fn gaps_ms(&self, start: Instant) -> Vec<u64> {
            let fetches = self.fetches.lock().unwrap();
            let mut prev = start;
            fetches
                .iter()
                .map(|t| {
                    let gap = t.duration_since(prev).as_millis() as u64;
                    prev = *t;
                    gap
                })
                .collect()
        }
    }

    #[async_trait]
    impl AssistantApi for ScriptedApi {
        async fn create_assistant(
            &self,
            _name: &str,
            _instructions: &str,
        ) -> Result<Assistant, AssistantError> {
            unimplemented!("not used by the poller")
        }

        async fn create_thread(&self) -> Result<Thread, AssistantError> {
            unimplemented!("not used by the poller")
        }

        async fn create_message(
            &self,
            _thread_id: &str,
            _role: MessageRole,
            _content: &str,
        ) -> Result<ThreadMessage, AssistantError> {
            unimplemented!("not used by the poller")
        }

        async fn create_run(
            &self,
            _thread_id: &str,
            _assistant_id: &str,
        ) -> Result<Run, AssistantError> {
            unimplemented!("not used by the poller")
        }

        async fn get_run(&self, _thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
            self.fetches.lock().unwrap().push(Instant::now());
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.is_empty() {
                return Err(AssistantError::Parse("status script exhausted".into()));
            }
            Ok(Run {
                id: run_id.to_string(),
                status: statuses.remove(0),
            })
        }

        async fn cancel_run(&self, _thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
            *self.cancels.lock().unwrap() += 1;
            Ok(Run {
                id: run_id.to_string(),
                status: RunStatus::Cancelling,
            })
        }

        async fn list_messages(
            &self,
            _thread_id: &str,
        ) -> Result<Vec<ThreadMessage>, AssistantError> {
            unimplemented!("not used by the poller")
        }
    }

    fn pending_run() -> Run {
        Run {
            id: "run_1".to_string(),
            status: RunStatus::Queued,
        }
    }

    fn schedule() -> PollSchedule {
        PollSchedule {
            initial: Duration::from_millis(10_000),
            floor: Duration::from_millis(2_000),
            step: Duration::from_millis(2_000),
        }
    }

    #[test]
    fn schedule_from_config_maps_millis() {
        let cfg = PollConfig {
            initial_ms: 5_000,
            floor_ms: 1_000,
            step_ms: 500,
            timeout_seconds: 60,
        };
        let s = PollSchedule::from_config(&cfg);
        assert_eq!(s.initial, Duration::from_millis(5_000));
        assert_eq!(s.floor, Duration::from_millis(1_000));
        assert_eq!(s.step, Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_shrink_to_the_floor_and_stay_there() {
        use RunStatus::{Completed, InProgress};
        let api = ScriptedApi::new(&[
            InProgress, InProgress, InProgress, InProgress, InProgress, InProgress, Completed,
        ]);
        let start = Instant::now();
        let (_tx, rx) = watch::channel(false);

        let run = await_run(
            &api,
            "t1",
            pending_run(),
            &schedule(),
            Duration::from_secs(300),
            rx,
        )
        .await
        .unwrap();

        assert_eq!(run.status, Completed);
        assert_eq!(
            api.gaps_ms(start),
            vec![10_000, 8_000, 6_000, 4_000, 2_000, 2_000, 2_000]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn returns_immediately_when_run_is_already_terminal() {
        let api = ScriptedApi::new(&[]);
        let (_tx, rx) = watch::channel(false);
        let run = Run {
            id: "run_1".to_string(),
            status: RunStatus::Failed,
        };

        let out = await_run(&api, "t1", run, &schedule(), Duration::from_secs(300), rx)
            .await
            .unwrap();

        assert_eq!(out.status, RunStatus::Failed);
        assert_eq!(api.fetch_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn first_non_pending_status_stops_polling() {
        let api = ScriptedApi::new(&[RunStatus::RequiresAction]);
        let (_tx, rx) = watch::channel(false);

        let out = await_run(
            &api,
            "t1",
            pending_run(),
            &schedule(),
            Duration::from_secs(300),
            rx,
        )
        .await
        .unwrap();

        assert_eq!(out.status, RunStatus::RequiresAction);
        assert_eq!(api.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn service_errors_propagate_without_retry() {
        // Empty script: the first fetch fails.
        let api = ScriptedApi::new(&[]);
        let (_tx, rx) = watch::channel(false);

        let err = await_run(
            &api,
            "t1",
            pending_run(),
            &schedule(),
            Duration::from_secs(300),
            rx,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RunWaitError::Service(_)));
        assert_eq!(api.fetch_count(), 1);
        assert_eq!(api.cancel_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_cancels_the_run_at_the_deadline() {
        let api = ScriptedApi::new(&[RunStatus::InProgress; 4]);
        let start = Instant::now();
        let (_tx, rx) = watch::channel(false);

        // 25s deadline: fetches land at 10s, 18s, 24s, and (capped) 25s.
        let err = await_run(
            &api,
            "t1",
            pending_run(),
            &schedule(),
            Duration::from_secs(25),
            rx,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RunWaitError::Timeout { .. }));
        assert_eq!(api.fetch_count(), 4);
        assert_eq!(api.cancel_count(), 1);
        assert_eq!(start.elapsed(), Duration::from_secs(25));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_signal_stops_the_wait_and_cancels_the_run() {
        let api = Arc::new(ScriptedApi::new(&[RunStatus::InProgress; 8]));
        let (tx, rx) = watch::channel(false);

        let poller = {
            let api = api.clone();
            tokio::spawn(async move {
                await_run(
                    api.as_ref(),
                    "t1",
                    pending_run(),
                    &schedule(),
                    Duration::from_secs(300),
                    rx,
                )
                .await
            })
        };

        // Let the first fetch happen (t=10s), then cancel mid-wait.
        tokio::time::sleep(Duration::from_millis(12_000)).await;
        tx.send(true).unwrap();

        let err = poller.await.unwrap().unwrap_err();
        assert!(matches!(err, RunWaitError::Cancelled { .. }));
        assert_eq!(api.fetch_count(), 1);
        assert_eq!(api.cancel_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn already_cancelled_signal_stops_before_any_fetch() {
        let api = ScriptedApi::new(&[RunStatus::InProgress; 2]);
        let (_tx, rx) = watch::channel(true);

        let err = await_run(
            &api,
            "t1",
            pending_run(),
            &schedule(),
            Duration::from_secs(300),
            rx,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RunWaitError::Cancelled { .. }));
        assert_eq!(api.fetch_count(), 0);
        assert_eq!(api.cancel_count(), 1);
    }
}
