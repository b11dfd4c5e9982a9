use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::domain::branch::{BranchRef, BranchScope};
use crate::domain::commit::{AuthorIdentity, Commit};
use crate::domain::window::LookbackWindow;
use crate::services::VersionControlService;

const LOGGED_BRANCHES: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct CommitCollection {
    /// Newest first, unique by hash, at most `max_commits` long.
    pub commits: Vec<Commit>,
    /// Matching commits before truncation.
    pub total_found: usize,
    pub branches_scanned: usize,
}

impl CommitCollection {
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.total_found > self.commits.len()
    }
}

/// Gathers `author`'s commits inside `window` from every local and remote
/// branch.
///
/// Branch and per-branch failures are logged and skipped, so this never
/// fails outright; an unreadable repository simply yields no commits.
pub async fn collect_commits(
    vcs: &dyn VersionControlService,
    author: &AuthorIdentity,
    window: &LookbackWindow,
    max_commits: usize,
) -> CommitCollection {
    info!(author = %author, since = %window.since, "searching for commits");

    let branches = enumerate_branches(vcs).await;
    info!(
        count = branches.len(),
        remote = branches.iter().filter(|branch| branch.is_remote()).count(),
        branches = %summarize_branches(&branches),
        "scanning branches"
    );

    let mut seen = HashSet::new();
    let mut commits = Vec::new();

    for branch in &branches {
        let found = match vcs.log_branch(branch, author, window.since).await {
            Ok(found) => found,
            Err(err) => {
                warn!(branch = branch.as_str(), %err, "skipping branch");
                continue;
            }
        };

        for commit in found {
            // Same date `git log --since` uses, so rebased work is kept.
            if !window.contains(&commit.committed_at) {
                continue;
            }
            if !author.matches(&commit.author_name, &commit.author_email) {
                continue;
            }
            if seen.insert(commit.hash.clone()) {
                commits.push(commit);
            }
        }
    }

    commits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let total_found = commits.len();
    if total_found > max_commits {
        info!(
            limit = max_commits,
            total = total_found,
            "limiting analysis to the most recent commits"
        );
        commits.truncate(max_commits);
    }

    for commit in &mut commits {
        match vcs.changed_files(&commit.hash).await {
            Ok(changes) => {
                commit.files_changed = changes.paths;
                commit.insertions = changes.insertions;
                commit.deletions = changes.deletions;
            }
            Err(err) => warn!(hash = commit.short_hash(), %err, "could not list changed files"),
        }
    }

    info!(count = commits.len(), total = total_found, "collected commits");

    CommitCollection {
        commits,
        total_found,
        branches_scanned: branches.len(),
    }
}

/// Local branches first, then remote ones, without duplicate refs.
async fn enumerate_branches(vcs: &dyn VersionControlService) -> Vec<BranchRef> {
    let mut branches = match vcs.list_branches(BranchScope::Local).await {
        Ok(branches) => branches,
        Err(err) => {
            warn!(%err, "could not list local branches");
            Vec::new()
        }
    };
    if branches.is_empty() {
        debug!("no local branches listed, scanning HEAD");
        branches.push(BranchRef::local("HEAD"));
    }

    match vcs.list_branches(BranchScope::Remote).await {
        Ok(remote) => branches.extend(remote),
        Err(err) => warn!(%err, "could not list remote branches, scanning local branches only"),
    }

    let mut seen = HashSet::new();
    branches.retain(|branch| seen.insert(branch.as_str().to_string()));
    branches
}

fn summarize_branches(branches: &[BranchRef]) -> String {
    let shown = branches
        .iter()
        .take(LOGGED_BRANCHES)
        .map(BranchRef::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if branches.len() > LOGGED_BRANCHES {
        format!("{shown}...")
    } else {
        shown
    }
}
