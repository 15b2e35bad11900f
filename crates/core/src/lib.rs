//! Core business logic for Guarda Memória.

pub mod services;

use std::sync::Arc;

use guarda_common::config::PostingConfig;
use guarda_db::repositories::{
    CityRepository, CommentRepository, CurtidaRepository, KnowledgeRepository, MemoryRepository,
    PostingRepository, ProfileRepository, ReportRepository,
};
use sea_orm::DatabaseConnection;

pub use services::*;

/// Every service, wired to one connection.
#[derive(Clone)]
#[allow(missing_docs)]
pub struct Services {
    pub profile: ProfileService,
    pub city: CityService,
    pub memory: MemoryService,
    pub posting: PostingService,
    pub comment: CommentService,
    pub like: LikeService,
    pub knowledge: KnowledgeService,
    pub score: ScoreService,
    pub moderation: ModerationService,
}

impl Services {
    /// Wire all services. Best-effort score recounts go to `scheduler`.
    #[must_use]
    pub fn new(
        db: &Arc<DatabaseConnection>,
        postings: &PostingConfig,
        scheduler: ScoreSchedulerService,
    ) -> Self {
        let city_repo = CityRepository::new(Arc::clone(db));
        let profile_repo = ProfileRepository::new(Arc::clone(db));
        let memory_repo = MemoryRepository::new(Arc::clone(db));
        let posting_repo = PostingRepository::new(Arc::clone(db));
        let comment_repo = CommentRepository::new(Arc::clone(db));
        let curtida_repo = CurtidaRepository::new(Arc::clone(db));
        let knowledge_repo = KnowledgeRepository::new(Arc::clone(db));
        let report_repo = ReportRepository::new(Arc::clone(db));

        let score = ScoreService::new(posting_repo.clone());

        let mut posting = PostingService::new(
            posting_repo.clone(),
            city_repo.clone(),
            memory_repo.clone(),
        );
        posting.set_score_scheduler(scheduler);
        posting.set_permalink_attempts(postings.permalink_attempts);

        Self {
            profile: ProfileService::new(profile_repo.clone(), city_repo.clone()),
            city: CityService::new(city_repo.clone()),
            memory: MemoryService::new(memory_repo.clone(), city_repo),
            posting,
            comment: CommentService::new(comment_repo, memory_repo.clone()),
            like: LikeService::new(curtida_repo, memory_repo.clone()),
            knowledge: KnowledgeService::new(knowledge_repo, posting_repo.clone(), score.clone()),
            score,
            moderation: ModerationService::new(report_repo, profile_repo, memory_repo, posting_repo),
        }
    }
}
