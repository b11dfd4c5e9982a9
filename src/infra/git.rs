use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::branch::{BranchRef, BranchScope};
use crate::domain::commit::{AuthorIdentity, Commit, FileChanges};
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;

const GIT_TIMEOUT: Duration = Duration::from_secs(30);
const RECORD_SEPARATOR: char = '\u{1e}';
const FIELD_SEPARATOR: char = '\u{1f}';
const LOG_FORMAT: &str = "--pretty=format:%x1e%H%x1f%an%x1f%ae%x1f%aI%x1f%cI%x1f%s";
const LOG_FIELDS: usize = 6;

pub struct GitCli {
    workspace_root: PathBuf,
}

impl GitCli {
    pub fn new(workspace_root: PathBuf) -> Self {
        Self { workspace_root }
    }

    async fn output(&self, args: &[String]) -> AppResult<std::process::Output> {
        debug!(args = %args.join(" "), "running git");
        let child = Command::new("git")
            .args(args)
            .current_dir(&self.workspace_root)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        tokio::time::timeout(GIT_TIMEOUT, child)
            .await
            .map_err(|_| {
                AppError::VersionControl(format!(
                    "git {} timed out after {}s",
                    args.join(" "),
                    GIT_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|err| AppError::VersionControl(format!("failed to run git: {err}")))
    }

    async fn run(&self, args: &[String]) -> AppResult<String> {
        let output = self.output(args).await?;
        if !output.status.success() {
            return Err(AppError::VersionControl(format!(
                "git {} exited with {}: {}",
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// `git config <key>`, treating an unset key as empty.
    async fn config_value(&self, key: &str) -> AppResult<String> {
        let output = self.output(&args(["config", key])).await?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Ok(String::new())
        }
    }
}

fn args<const N: usize>(values: [&str; N]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[async_trait]
impl VersionControlService for GitCli {
    async fn is_repository(&self) -> AppResult<bool> {
        let output = self
            .output(&args(["rev-parse", "--is-inside-work-tree"]))
            .await?;
        Ok(output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true")
    }

    async fn current_identity(&self) -> AppResult<AuthorIdentity> {
        let name = self.config_value("user.name").await?;
        let email = self.config_value("user.email").await?;
        Ok(AuthorIdentity::new(name, email))
    }

    async fn list_branches(&self, scope: BranchScope) -> AppResult<Vec<BranchRef>> {
        let command = match scope {
            BranchScope::Local => args(["branch", "--format=%(refname:short)"]),
            BranchScope::Remote => args(["branch", "-r", "--format=%(refname:short)"]),
        };
        let stdout = self.run(&command).await?;
        Ok(stdout
            .lines()
            .filter_map(|line| BranchRef::parse(line, scope))
            .collect())
    }

    async fn log_branch(
        &self,
        branch: &BranchRef,
        author: &AuthorIdentity,
        since: DateTime<Local>,
    ) -> AppResult<Vec<Commit>> {
        let mut command = vec![
            "log".to_string(),
            branch.as_str().to_string(),
            format!("--since=@{}", since.timestamp()),
            "--no-merges".to_string(),
            "--fixed-strings".to_string(),
            "--regexp-ignore-case".to_string(),
            LOG_FORMAT.to_string(),
        ];
        command.extend(
            author
                .author_patterns()
                .into_iter()
                .map(|pattern| format!("--author={pattern}")),
        );
        command.push("--".to_string());

        let stdout = self.run(&command).await?;
        Ok(parse_log(&stdout, branch.display_name()))
    }

    async fn changed_files(&self, hash: &str) -> AppResult<FileChanges> {
        let stdout = self
            .run(&args(["show", "--numstat", "--pretty=format:", hash]))
            .await?;
        Ok(parse_numstat(&stdout))
    }
}

/// Parses `git log` output produced with [`LOG_FORMAT`].
fn parse_log(output: &str, branch: &str) -> Vec<Commit> {
    output
        .split(RECORD_SEPARATOR)
        .map(|record| record.trim_end_matches(['\n', '\r']))
        .filter(|record| !record.trim().is_empty())
        .filter_map(|record| {
            let fields = record.splitn(LOG_FIELDS, FIELD_SEPARATOR).collect::<Vec<_>>();
            if fields.len() < LOG_FIELDS {
                warn!(record = %record, "skipping malformed git log record");
                return None;
            }
            let parse_date = |value: &str| match DateTime::parse_from_rfc3339(value.trim()) {
                Ok(date) => Some(date),
                Err(err) => {
                    warn!(hash = fields[0], %err, "skipping commit with unparsable date");
                    None
                }
            };
            let timestamp = parse_date(fields[3])?;
            let committed_at = parse_date(fields[4])?;
            Some(Commit {
                hash: fields[0].trim().to_string(),
                author_name: fields[1].to_string(),
                author_email: fields[2].to_string(),
                timestamp,
                committed_at,
                message: fields[5].to_string(),
                branch: branch.to_string(),
                files_changed: Vec::new(),
                insertions: 0,
                deletions: 0,
            })
        })
        .collect()
}

/// Parses `git show --numstat` lines of the form `added<TAB>deleted<TAB>path`.
/// Binary files report `-` for both counts.
fn parse_numstat(output: &str) -> FileChanges {
    let mut changes = FileChanges::default();
    for line in output.lines().filter(|line| !line.trim().is_empty()) {
        let mut parts = line.splitn(3, '\t');
        let (Some(added), Some(deleted), Some(path)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        changes.insertions += added.parse::<u64>().unwrap_or(0);
        changes.deletions += deleted.parse::<u64>().unwrap_or(0);
        changes.paths.push(path.to_string());
    }
    changes
}
