//! Business logic services.

#![allow(missing_docs)]

pub mod city;
pub mod comment;
pub mod knowledge;
pub mod like;
pub mod memory;
pub mod moderation;
pub mod posting;
pub mod profile;
pub mod score;
pub mod score_queue;

pub use city::{CityService, CityWithState, CreateCityInput};
pub use comment::{CommentService, CommentTarget, target_from_ids};
pub use knowledge::{KnowledgeService, KnowledgeToggle, ToggleAction};
pub use like::LikeService;
pub use memory::{
    CreateMemoryInput, MemoryDetails, MemoryService, RankedMemories, RankedMemory,
    UpdateMemoryInput, parse_kind,
};
pub use moderation::{CreateReportInput, ModerationService, ReportStatus, Stats, parse_status};
pub use posting::{CreatePostingInput, DeletePostingResult, PostingService};
pub use profile::{Principal, ProfileService, parse_role};
pub use score::{
    InlineScoreScheduler, NoOpScoreScheduler, ScoreScheduler, ScoreSchedulerService, ScoreService,
};
pub use score_queue::{RetryPolicy, ScoreJob, ScoreJobQueue};
