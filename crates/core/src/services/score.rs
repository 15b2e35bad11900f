//! Posting score engine.
//!
//! A posting's score is `replies + knowledge acknowledgments`, always recounted
//! from live rows. Callers that need the fresh value (knowledge toggle) call
//! [`ScoreService::recompute`] directly; callers that must not wait on it
//! (reply creation and deletion) go through a [`ScoreScheduler`].

use std::sync::Arc;

use async_trait::async_trait;
use guarda_common::AppResult;
use guarda_db::repositories::PostingRepository;

/// Recounts and stores posting scores.
#[derive(Clone)]
pub struct ScoreService {
    posting_repo: PostingRepository,
}

impl ScoreService {
    /// Create a new score service.
    #[must_use]
    pub const fn new(posting_repo: PostingRepository) -> Self {
        Self { posting_repo }
    }

    /// Recount the score of a posting and store it.
    pub async fn recompute(&self, posting_id: &str) -> AppResult<i32> {
        let score = self.posting_repo.recompute_score(posting_id).await?;
        tracing::debug!(posting_id = %posting_id, score, "Recomputed posting score");
        Ok(score)
    }
}

/// Schedules a best-effort score recount.
///
/// An `Err` means the recount could not be scheduled at all; the caller logs
/// it and carries on.
#[async_trait]
pub trait ScoreScheduler: Send + Sync {
    /// Request a recount of the posting's score.
    async fn schedule(&self, posting_id: &str) -> AppResult<()>;
}

/// Shared handle to a score scheduler.
pub type ScoreSchedulerService = Arc<dyn ScoreScheduler>;

/// Recounts in the caller's task and only logs failures.
#[derive(Clone)]
pub struct InlineScoreScheduler {
    score: ScoreService,
}

impl InlineScoreScheduler {
    /// Create a new inline scheduler.
    #[must_use]
    pub const fn new(score: ScoreService) -> Self {
        Self { score }
    }
}

#[async_trait]
impl ScoreScheduler for InlineScoreScheduler {
    async fn schedule(&self, posting_id: &str) -> AppResult<()> {
        if let Err(e) = self.score.recompute(posting_id).await {
            tracing::warn!(error = %e, posting_id = %posting_id, "Best-effort score recount failed");
        }
        Ok(())
    }
}

/// Scheduler that drops every request.
pub struct NoOpScoreScheduler;

#[async_trait]
impl ScoreScheduler for NoOpScoreScheduler {
    async fn schedule(&self, _posting_id: &str) -> AppResult<()> {
        Ok(())
    }
}
