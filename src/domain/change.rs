use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::domain::commit::Commit;

const NO_EXTENSION: &str = "no_extension";

/// Aggregate counts over a set of commits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeStats {
    pub total_commits: usize,
    /// Distinct paths touched, sorted.
    pub files: BTreeSet<String>,
    pub insertions: u64,
    pub deletions: u64,
    /// Branch display names in first-seen order.
    pub branches: Vec<String>,
    /// Touches per file extension, counted once per commit and file.
    pub file_types: BTreeMap<String, usize>,
}

impl ChangeStats {
    pub fn from_commits(commits: &[Commit]) -> Self {
        let mut stats = Self {
            total_commits: commits.len(),
            ..Self::default()
        };

        for commit in commits {
            if !stats.branches.contains(&commit.branch) {
                stats.branches.push(commit.branch.clone());
            }
            stats.insertions += commit.insertions;
            stats.deletions += commit.deletions;

            for path in &commit.files_changed {
                stats.files.insert(path.clone());
                *stats.file_types.entry(extension_of(path)).or_default() += 1;
            }
        }

        stats
    }

    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    /// Extensions ordered by touch count, most frequent first.
    pub fn top_file_types(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut types = self
            .file_types
            .iter()
            .map(|(ext, count)| (ext.as_str(), *count))
            .collect::<Vec<_>>();
        types.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        types.truncate(limit);
        types
    }
}

fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| NO_EXTENSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn commit(hash: &str, branch: &str, files: &[&str], insertions: u64) -> Commit {
        Commit {
            hash: hash.to_string(),
            author_name: "Ada".to_string(),
            author_email: "ada@example.com".to_string(),
            timestamp: DateTime::parse_from_rfc3339("2026-10-15T09:00:00+00:00").unwrap(),
            committed_at: DateTime::parse_from_rfc3339("2026-10-15T09:00:00+00:00").unwrap(),
            message: format!("change {hash}"),
            branch: branch.to_string(),
            files_changed: files.iter().map(|f| f.to_string()).collect(),
            insertions,
            deletions: 1,
        }
    }

    #[test]
    fn aggregates_distinct_files_and_branches() {
        let commits = vec![
            commit("a1", "main", &["src/lib.rs", "README.md"], 10),
            commit("b2", "feature", &["src/lib.rs", "Makefile"], 5),
            commit("c3", "main", &["src/main.rs"], 0),
        ];

        let stats = ChangeStats::from_commits(&commits);

        assert_eq!(stats.total_commits, 3);
        assert_eq!(stats.total_files(), 4);
        assert_eq!(
            stats.files.iter().collect::<Vec<_>>(),
            vec!["Makefile", "README.md", "src/lib.rs", "src/main.rs"]
        );
        assert_eq!(stats.insertions, 15);
        assert_eq!(stats.deletions, 3);
        assert_eq!(stats.branches, vec!["main", "feature"]);
        assert_eq!(stats.file_types.get(".rs"), Some(&3));
        assert_eq!(stats.file_types.get("no_extension"), Some(&1));
        assert_eq!(stats.top_file_types(2), vec![(".rs", 3), (".md", 1)]);
    }

    #[test]
    fn empty_commit_set_has_zero_stats() {
        assert_eq!(ChangeStats::from_commits(&[]), ChangeStats::default());
    }
}
