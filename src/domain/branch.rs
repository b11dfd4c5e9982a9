#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchScope {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchRef {
    name: String,
    remote: bool,
}

impl BranchRef {
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote: false,
        }
    }

    pub fn remote(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote: true,
        }
    }

    /// Parses one line of `git branch [-r] --format=%(refname:short)`.
    ///
    /// Symbolic `*/HEAD` entries and bare remote names are skipped since they
    /// alias another ref.
    pub fn parse(line: &str, scope: BranchScope) -> Option<Self> {
        let name = line.trim().trim_start_matches("* ").trim();
        if name.is_empty() || name.starts_with('(') || name.contains(" -> ") {
            return None;
        }
        match scope {
            BranchScope::Local => Some(Self::local(name)),
            BranchScope::Remote => {
                if !name.contains('/') || name.ends_with("/HEAD") {
                    None
                } else {
                    Some(Self::remote(name))
                }
            }
        }
    }

    /// Full ref name usable as a `git log` revision.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    /// Name shown to users; remote refs drop their remote prefix.
    pub fn display_name(&self) -> &str {
        if self.remote {
            self.name
                .split_once('/')
                .map(|(_, rest)| rest)
                .unwrap_or(&self.name)
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_local_branches() {
        assert_eq!(
            BranchRef::parse("feature/login", BranchScope::Local),
            Some(BranchRef::local("feature/login"))
        );
        assert_eq!(
            BranchRef::parse("* main", BranchScope::Local),
            Some(BranchRef::local("main"))
        );
        assert_eq!(
            BranchRef::parse("(HEAD detached at 1a2b3c)", BranchScope::Local),
            None
        );
        assert_eq!(BranchRef::parse("  ", BranchScope::Local), None);
    }

    #[test]
    fn skips_symbolic_remote_heads() {
        assert_eq!(BranchRef::parse("origin/HEAD", BranchScope::Remote), None);
        assert_eq!(BranchRef::parse("origin", BranchScope::Remote), None);
        assert_eq!(
            BranchRef::parse("origin/HEAD -> origin/main", BranchScope::Remote),
            None
        );
    }

    #[test]
    fn remote_display_name_drops_remote() {
        let branch = BranchRef::parse("upstream/feature/login", BranchScope::Remote)
            .expect("remote branch");
        assert!(branch.is_remote());
        assert_eq!(branch.as_str(), "upstream/feature/login");
        assert_eq!(branch.display_name(), "feature/login");
        assert_eq!(BranchRef::local("feature/login").display_name(), "feature/login");
    }
}
