//! Database repositories.

mod city;
mod comment;
mod curtida;
mod knowledge;
mod memory;
mod posting;
mod profile;
mod report;

pub use city::CityRepository;
pub use comment::{CommentRepository, CommentTarget};
pub use curtida::CurtidaRepository;
pub use knowledge::KnowledgeRepository;
pub use memory::{MemoryFilter, MemoryRepository};
pub use posting::{DeletedPosting, PostingRepository};
pub use profile::ProfileRepository;
pub use report::ReportRepository;
