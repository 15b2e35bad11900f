//! Moderation service: reports and admin statistics.

use chrono::Utc;
use guarda_common::{AppError, AppResult, IdGenerator};
use guarda_db::{
    entities::report,
    repositories::{
        MemoryRepository, PostingRepository, ProfileRepository, ReportRepository,
    },
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

pub use guarda_db::entities::report::ReportStatus;

/// Input for filing a report.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportInput {
    pub memory_id: String,
    #[validate(length(max = 256))]
    pub reason: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Site-wide counters for the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub memories: u64,
    pub postings: u64,
    pub profiles: u64,
    pub pending_reports: u64,
}

/// Parse a report status name.
pub fn parse_status(value: &str) -> AppResult<ReportStatus> {
    ReportStatus::parse(value)
        .ok_or_else(|| AppError::Validation(format!("Invalid status: {value}")))
}

/// Moderation service for reports and stats.
#[derive(Clone)]
pub struct ModerationService {
    report_repo: ReportRepository,
    profile_repo: ProfileRepository,
    memory_repo: MemoryRepository,
    posting_repo: PostingRepository,
    id_gen: IdGenerator,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        profile_repo: ProfileRepository,
        memory_repo: MemoryRepository,
        posting_repo: PostingRepository,
    ) -> Self {
        Self {
            report_repo,
            profile_repo,
            memory_repo,
            posting_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// File a report against a memory.
    pub async fn create_report(
        &self,
        author_id: &str,
        input: CreateReportInput,
    ) -> AppResult<report::Model> {
        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation("Missing required field: reason".to_string()));
        }
        input.validate()?;

        self.memory_repo.get_by_id(&input.memory_id).await?;

        let model = report::ActiveModel {
            id: Set(self.id_gen.generate()),
            memory_id: Set(input.memory_id.clone()),
            author_id: Set(author_id.to_string()),
            reason: Set(reason.to_string()),
            description: Set(input.description),
            status: Set(ReportStatus::Pending),
            resolved_by: Set(None),
            created_at: Set(Utc::now().into()),
            resolved_at: Set(None),
        };

        let created = self.report_repo.create(model).await?;
        tracing::info!(report_id = %created.id, memory_id = %created.memory_id, "Report filed");
        Ok(created)
    }

    /// Move a pending report to `resolved` or `rejected`. Admins only.
    pub async fn update_status(
        &self,
        admin_id: &str,
        report_id: &str,
        new_status: &str,
    ) -> AppResult<report::Model> {
        self.require_admin(admin_id).await?;

        let status = parse_status(new_status)?;
        if !status.is_terminal() {
            return Err(AppError::Validation(
                "A report can only move to resolved or rejected".to_string(),
            ));
        }

        let current = self
            .report_repo
            .find_by_id(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report: {report_id}")))?;
        if current.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Report already {}",
                status_name(current.status)
            )));
        }

        let updated = self
            .report_repo
            .resolve(report_id, status, admin_id)
            .await?
            .ok_or_else(|| AppError::Conflict("Report was resolved concurrently".to_string()))?;

        tracing::info!(
            report_id = %report_id,
            admin_id = %admin_id,
            status = status_name(status),
            "Report status updated"
        );
        Ok(updated)
    }

    /// List reports, newest first. Admins only.
    pub async fn list_reports(
        &self,
        admin_id: &str,
        status: Option<&str>,
    ) -> AppResult<Vec<report::Model>> {
        self.require_admin(admin_id).await?;
        let status = status.map(parse_status).transpose()?;
        self.report_repo.find_all(status).await
    }

    /// Site counters. Admins only.
    pub async fn stats(&self, admin_id: &str) -> AppResult<Stats> {
        self.require_admin(admin_id).await?;

        Ok(Stats {
            memories: self.memory_repo.count().await?,
            postings: self.posting_repo.count().await?,
            profiles: self.profile_repo.count().await?,
            pending_reports: self
                .report_repo
                .count_by_status(ReportStatus::Pending)
                .await?,
        })
    }

    async fn require_admin(&self, profile_id: &str) -> AppResult<()> {
        let profile = self.profile_repo.get_by_id(profile_id).await?;
        if !profile.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(())
    }
}

const fn status_name(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Pending => "pending",
        ReportStatus::Resolved => "resolved",
        ReportStatus::Rejected => "rejected",
    }
}
