use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::domain::branch::{BranchRef, BranchScope};
use crate::domain::commit::{AuthorIdentity, Commit, FileChanges};
use crate::error::AppResult;

/// Read-only queries against the local repository history.
#[async_trait]
pub trait VersionControlService: Send + Sync {
    async fn is_repository(&self) -> AppResult<bool>;
    async fn current_identity(&self) -> AppResult<AuthorIdentity>;
    async fn list_branches(&self, scope: BranchScope) -> AppResult<Vec<BranchRef>>;
    /// Non-merge commits reachable from `branch`, authored by `author`, since `since`.
    async fn log_branch(
        &self,
        branch: &BranchRef,
        author: &AuthorIdentity,
        since: DateTime<Local>,
    ) -> AppResult<Vec<Commit>>;
    async fn changed_files(&self, hash: &str) -> AppResult<FileChanges>;
}
