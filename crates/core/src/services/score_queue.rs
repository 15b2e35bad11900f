//! Background score recount queue.
//!
//! Jobs go through a bounded channel to a single worker task. A failed
//! recount is re-enqueued with exponential backoff; once retries run out the
//! job is logged as a dead letter and dropped.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guarda_common::{AppError, AppResult, config::ScoringConfig};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::score::{ScoreScheduler, ScoreService};

/// Retry policy with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Build the policy from configuration.
    #[must_use]
    pub const fn from_config(config: &ScoringConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.retry_delay_ms),
            max_delay: Duration::from_secs(60),
        }
    }

    /// Delay before retry number `attempt` (0-indexed): doubles every time.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Whether a job that already failed `attempt + 1` times gets another go.
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

/// A pending recount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreJob {
    /// Posting to recount.
    pub posting_id: String,
    /// Retries already spent.
    pub attempt: u32,
}

/// A job that exhausted its retries.
#[derive(Debug, Clone)]
pub struct DeadLetter {
    /// The failed job.
    pub job: ScoreJob,
    /// Last error message.
    pub last_error: String,
    /// When the last attempt failed.
    pub failed_at: DateTime<Utc>,
}

/// Queue-backed [`ScoreScheduler`].
#[derive(Clone)]
pub struct ScoreJobQueue {
    sender: mpsc::Sender<ScoreJob>,
}

impl ScoreJobQueue {
    /// Spawn the worker and return the queue handle.
    ///
    /// The worker stops once every queue handle is dropped and the channel
    /// drains.
    #[must_use]
    pub fn start(score: ScoreService, config: &ScoringConfig) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let policy = RetryPolicy::from_config(config);
        let worker = ScoreWorker {
            score,
            policy,
            retry_sender: sender.downgrade(),
        };
        let handle = tokio::spawn(worker.run(receiver));
        (Self { sender }, handle)
    }

    fn enqueue(&self, job: ScoreJob) -> AppResult<()> {
        self.sender.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(job) => {
                AppError::Queue(format!("Score queue full, dropped {}", job.posting_id))
            }
            mpsc::error::TrySendError::Closed(job) => {
                AppError::Queue(format!("Score queue closed, dropped {}", job.posting_id))
            }
        })
    }
}

#[async_trait]
impl ScoreScheduler for ScoreJobQueue {
    async fn schedule(&self, posting_id: &str) -> AppResult<()> {
        self.enqueue(ScoreJob {
            posting_id: posting_id.to_string(),
            attempt: 0,
        })
    }
}

struct ScoreWorker {
    score: ScoreService,
    policy: RetryPolicy,
    retry_sender: mpsc::WeakSender<ScoreJob>,
}

impl ScoreWorker {
    async fn run(self, mut receiver: mpsc::Receiver<ScoreJob>) {
        tracing::info!("Score worker started");
        while let Some(job) = receiver.recv().await {
            self.process(job).await;
        }
        tracing::info!("Score worker stopped");
    }

    async fn process(&self, job: ScoreJob) {
        match self.score.recompute(&job.posting_id).await {
            Ok(_) => {}
            // The posting went away before the job ran; nothing to fix.
            Err(AppError::NotFound(_)) => {
                tracing::debug!(posting_id = %job.posting_id, "Skipping recount of deleted posting");
            }
            Err(e) if self.policy.should_retry(job.attempt) => {
                let delay = self.policy.delay_for_attempt(job.attempt);
                tracing::warn!(
                    error = %e,
                    posting_id = %job.posting_id,
                    attempt = job.attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Score recount failed, retrying"
                );
                self.retry_later(
                    ScoreJob {
                        posting_id: job.posting_id,
                        attempt: job.attempt + 1,
                    },
                    delay,
                );
            }
            Err(e) => {
                let dead = DeadLetter {
                    job,
                    last_error: e.to_string(),
                    failed_at: Utc::now(),
                };
                tracing::error!(
                    posting_id = %dead.job.posting_id,
                    attempts = dead.job.attempt + 1,
                    error = %dead.last_error,
                    failed_at = %dead.failed_at,
                    "Score recount dead-lettered"
                );
            }
        }
    }

    fn retry_later(&self, job: ScoreJob, delay: Duration) {
        let sender = self.retry_sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match sender.upgrade() {
                Some(sender) => {
                    if sender.send(job).await.is_err() {
                        tracing::warn!("Score queue closed before retry");
                    }
                }
                None => tracing::warn!(posting_id = %job.posting_id, "Score queue gone, retry dropped"),
            }
        });
    }
}
