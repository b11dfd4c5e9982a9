//! In-memory service doubles shared by the workflow tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, TimeZone};

use crate::domain::branch::{BranchRef, BranchScope};
use crate::domain::commit::{AuthorIdentity, Commit, FileChanges};
use crate::domain::window::LookbackWindow;
use crate::error::{AppError, AppResult};
use crate::services::{Completion, LanguageModelService, Prompt, VersionControlService};

pub fn fixed_now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
}

pub fn window_at(hours: u32) -> LookbackWindow {
    LookbackWindow::ending_at(fixed_now(), hours)
}

/// A commit by Ada authored and committed `hours_ago` before the end of
/// `window`.
pub fn commit_at(hash: &str, window: &LookbackWindow, hours_ago: i64) -> Commit {
    let at = (window.until - Duration::hours(hours_ago)).fixed_offset();
    Commit {
        hash: hash.to_string(),
        author_name: "Ada".to_string(),
        author_email: "ada@example.com".to_string(),
        timestamp: at,
        committed_at: at,
        message: format!("Work on {hash}"),
        branch: String::new(),
        files_changed: Vec::new(),
        insertions: 0,
        deletions: 0,
    }
}

pub struct FakeRepo {
    is_repository: bool,
    identity: AuthorIdentity,
    branches: Vec<(BranchRef, Option<Vec<Commit>>)>,
    files: HashMap<String, FileChanges>,
    remote_listing_fails: bool,
}

impl FakeRepo {
    pub fn new() -> Self {
        Self {
            is_repository: true,
            identity: AuthorIdentity::new("Ada", "ada@example.com"),
            branches: Vec::new(),
            files: HashMap::new(),
            remote_listing_fails: false,
        }
    }

    pub fn not_a_repository(mut self) -> Self {
        self.is_repository = false;
        self
    }

    pub fn with_identity(mut self, identity: AuthorIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_branch(mut self, branch: BranchRef, commits: Vec<Commit>) -> Self {
        self.branches.push((branch, Some(commits)));
        self
    }

    pub fn with_failing_branch(mut self, branch: BranchRef) -> Self {
        self.branches.push((branch, None));
        self
    }

    pub fn with_files(
        mut self,
        hash: &str,
        paths: &[&str],
        insertions: u64,
        deletions: u64,
    ) -> Self {
        self.files.insert(
            hash.to_string(),
            FileChanges {
                paths: paths.iter().map(|path| path.to_string()).collect(),
                insertions,
                deletions,
            },
        );
        self
    }

    pub fn failing_remote_listing(mut self) -> Self {
        self.remote_listing_fails = true;
        self
    }
}

#[async_trait]
impl VersionControlService for FakeRepo {
    async fn is_repository(&self) -> AppResult<bool> {
        Ok(self.is_repository)
    }

    async fn current_identity(&self) -> AppResult<AuthorIdentity> {
        Ok(self.identity.clone())
    }

    async fn list_branches(&self, scope: BranchScope) -> AppResult<Vec<BranchRef>> {
        if scope == BranchScope::Remote && self.remote_listing_fails {
            return Err(AppError::VersionControl("no remotes configured".to_string()));
        }
        let remote = scope == BranchScope::Remote;
        Ok(self
            .branches
            .iter()
            .map(|(branch, _)| branch)
            .filter(|branch| branch.is_remote() == remote)
            .cloned()
            .collect())
    }

    async fn log_branch(
        &self,
        branch: &BranchRef,
        _author: &AuthorIdentity,
        _since: DateTime<Local>,
    ) -> AppResult<Vec<Commit>> {
        match self.branches.iter().find(|(candidate, _)| candidate == branch) {
            Some((_, Some(commits))) => Ok(commits
                .iter()
                .cloned()
                .map(|mut commit| {
                    commit.branch = branch.display_name().to_string();
                    commit
                })
                .collect()),
            Some((_, None)) => Err(AppError::VersionControl(format!(
                "bad revision '{}'",
                branch.as_str()
            ))),
            None => Ok(Vec::new()),
        }
    }

    async fn changed_files(&self, hash: &str) -> AppResult<FileChanges> {
        Ok(self.files.get(hash).cloned().unwrap_or_default())
    }
}

pub struct FakeModel {
    reply: Result<String, String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<Prompt>>,
}

impl FakeModel {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModelService for FakeModel {
    async fn complete(&self, prompt: &Prompt) -> AppResult<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.clone());
        match &self.reply {
            Ok(text) => Ok(Completion {
                text: text.clone(),
                usage: None,
            }),
            Err(message) => Err(AppError::LanguageModel(message.clone())),
        }
    }
}
