//! Path access guard: directory allowlist for new sessions.
//!
//! Every root is normalized once when configured (`~` expanded, made
//! absolute, canonicalized). Candidates are normalized the same way at check
//! time and must equal a root or sit strictly below one, compared by path
//! component so `/home/projects-evil` is not inside `/home/projects`.

use std::path::{Component, Path, PathBuf};

use muxbot_core::utils::{canonical_or_self, resolve_path};
use tracing::debug;

/// Allowlist of directory roots. Empty means unrestricted.
#[derive(Clone, Debug, Default)]
pub struct PathAccessGuard {
    roots: Vec<PathBuf>,
}

impl PathAccessGuard {
    pub fn new<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut guard = Self::default();
        guard.configure(roots);
        guard
    }

    /// Replace the allowlist.
    pub fn configure<I, S>(&mut self, roots: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.roots = roots
            .into_iter()
            .filter(|r| !r.as_ref().trim().is_empty())
            .map(|r| normalize(&resolve_path(r.as_ref().trim())))
            .collect();
        debug!(roots = ?self.roots, "allowed paths configured");
    }

    /// Normalized roots currently in force.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn is_unrestricted(&self) -> bool {
        self.roots.is_empty()
    }

    /// Whether `candidate` equals or lies beneath an allowed root.
    pub fn is_allowed(&self, candidate: &Path) -> bool {
        if self.roots.is_empty() {
            return true;
        }
        let candidate = normalize(&canonical_or_self(candidate));
        self.roots.iter().any(|root| candidate.starts_with(root))
    }
}

/// Lexically resolve `.` and `..` for paths that could not be canonicalized.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn guard_for(root: &Path) -> PathAccessGuard {
        PathAccessGuard::new([root.to_string_lossy()])
    }

    #[test]
    fn test_empty_allowlist_allows_everything() {
        let guard = PathAccessGuard::default();
        assert!(guard.is_unrestricted());
        assert!(guard.is_allowed(Path::new("/etc")));
        assert!(guard.is_allowed(Path::new("/definitely/not/there")));
    }

    #[test]
    fn test_root_itself_and_descendants_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let guard = guard_for(dir.path());
        assert!(guard.is_allowed(dir.path()));
        assert!(guard.is_allowed(&nested));
        assert!(guard.is_allowed(&dir.path().join("not-yet-created")));
    }

    #[test]
    fn test_shared_string_prefix_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("projects");
        let evil = dir.path().join("projects-evil");
        std::fs::create_dir(&root).unwrap();
        std::fs::create_dir(&evil).unwrap();

        let guard = guard_for(&root);
        assert!(!guard.is_allowed(&evil));
    }

    #[test]
    fn test_outside_paths_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let guard = guard_for(dir.path());
        assert!(!guard.is_allowed(Path::new("/")));
        assert!(!guard.is_allowed(dir.path().parent().unwrap()));
    }

    #[test]
    fn test_parent_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        std::fs::create_dir(&root).unwrap();

        let guard = guard_for(&root);
        assert!(!guard.is_allowed(&root.join("..").join("elsewhere")));
        assert!(!guard.is_allowed(&root.join("missing").join("..").join("..")));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        let outside = dir.path().join("outside");
        std::fs::create_dir(&root).unwrap();
        std::fs::create_dir(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();

        let guard = guard_for(&root);
        assert!(!guard.is_allowed(&root.join("link")));
    }

    #[test]
    fn test_configure_replaces_list() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let mut guard = guard_for(a.path());
        assert!(guard.is_allowed(a.path()));

        guard.configure([b.path().to_string_lossy()]);
        assert!(!guard.is_allowed(a.path()));
        assert!(guard.is_allowed(b.path()));

        guard.configure(Vec::<String>::new());
        assert!(guard.is_unrestricted());
    }

    #[test]
    fn test_padded_config_root_is_trimmed() {
        let root = tempfile::tempdir().unwrap();
        let guard = PathAccessGuard::new([format!("  {}  ", root.path().display())]);
        assert!(guard.is_allowed(root.path()));
    }

    #[test]
    fn test_tilde_root_expanded() {
        let guard = PathAccessGuard::new(["~"]);
        assert!(!guard.roots()[0].to_string_lossy().contains('~'));
    }
}
