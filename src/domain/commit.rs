use chrono::{DateTime, FixedOffset};

/// A non-merge commit read from the repository history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub author_name: String,
    pub author_email: String,
    /// Author date, used for ordering and display.
    pub timestamp: DateTime<FixedOffset>,
    /// Committer date. Rebases and amends move it, and `git log --since`
    /// filters on it.
    pub committed_at: DateTime<FixedOffset>,
    pub message: String,
    /// Display name of the branch the commit was first found on.
    pub branch: String,
    pub files_changed: Vec<String>,
    pub insertions: u64,
    pub deletions: u64,
}

impl Commit {
    pub fn short_hash(&self) -> &str {
        &self.hash[..8.min(self.hash.len())]
    }
}

/// Per-commit file statistics from `git show --numstat`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChanges {
    pub paths: Vec<String>,
    pub insertions: u64,
    pub deletions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorIdentity {
    pub name: String,
    pub email: String,
}

impl AuthorIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            email: email.into().trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty()
    }

    /// Case-insensitive containment on either configured component.
    pub fn matches(&self, author_name: &str, author_email: &str) -> bool {
        let contains = |needle: &str, haystack: &str| {
            !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
        };
        contains(&self.name, author_name) || contains(&self.email, author_email)
    }

    /// Patterns handed to `git log --author`; git ORs repeated flags.
    pub fn author_patterns(&self) -> Vec<&str> {
        [self.name.as_str(), self.email.as_str()]
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect()
    }
}

impl std::fmt::Display for AuthorIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.name.is_empty(), self.email.is_empty()) {
            (false, false) => write!(f, "{} <{}>", self.name, self.email),
            (false, true) => write!(f, "{}", self.name),
            (true, false) => write!(f, "<{}>", self.email),
            (true, true) => write!(f, "<unknown>"),
        }
    }
}
