//! ToolContext - execution context for tools

use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::ToolError;

/// Execution context for tools - scoped to a single run
///
/// Carries the sandbox root every filesystem tool is confined to, plus the
/// run's deadline and cancellation token so that suspension points inside a
/// tool stop when the run does.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Canonical sandbox root - all file ops constrained here
    root: PathBuf,

    /// Cancelled when the owning run is cancelled
    cancel: CancellationToken,

    /// Overall run deadline, if any
    deadline: Option<Instant>,
}

impl ToolContext {
    /// Create a context confined to `root`
    ///
    /// The root is canonicalized once here, so it must exist.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ToolError> {
        let root = root.as_ref();
        debug!(?root, "ToolContext::new: called");
        let root = root.canonicalize().map_err(|source| ToolError::Stat {
            path: root.to_path_buf(),
            source,
        })?;

        Ok(Self {
            root,
            cancel: CancellationToken::new(),
            deadline: None,
        })
    }

    /// Builder method to share a cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        debug!("ToolContext::with_cancellation: called");
        self.cancel = cancel;
        self
    }

    /// Builder method to set the run deadline
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        debug!(?deadline, "ToolContext::with_deadline: called");
        self.deadline = deadline;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Clamp a tool timeout to the time left before the run deadline
    pub fn effective_timeout(&self, timeout: Duration) -> Duration {
        match self.deadline {
            Some(deadline) => timeout.min(deadline.saturating_duration_since(Instant::now())),
            None => timeout,
        }
    }

    /// Whether `path` (already absolute and normalized) lies inside the root
    pub fn is_within_root(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }

    /// Validate path is within root (sandbox enforcement)
    ///
    /// Relative paths are joined onto the root. The result is normalized
    /// lexically and checked, then the nearest existing ancestor is
    /// canonicalized and checked again so symlinks cannot leave the root.
    /// No other I/O happens before the check passes.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, ToolError> {
        let path = path.as_ref();
        debug!(?path, "ToolContext::validate_path: called");

        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let normalized = normalize(&joined);

        if !self.is_within_root(&normalized) {
            debug!(?normalized, "ToolContext::validate_path: sandbox violation detected");
            return Err(ToolError::SandboxViolation { path: normalized });
        }

        for ancestor in normalized.ancestors() {
            match ancestor.canonicalize() {
                Ok(canonical) => {
                    if !self.is_within_root(&canonical) {
                        debug!(?canonical, "ToolContext::validate_path: symlink escapes root");
                        return Err(ToolError::SandboxViolation { path: normalized });
                    }
                    let rest = normalized.strip_prefix(ancestor).unwrap_or(Path::new(""));
                    let resolved = if rest.as_os_str().is_empty() {
                        canonical
                    } else {
                        canonical.join(rest)
                    };
                    debug!(?resolved, "ToolContext::validate_path: path is within root");
                    return Ok(resolved);
                }
                Err(_) if ancestor.symlink_metadata().is_ok() => {
                    debug!(?ancestor, "ToolContext::validate_path: dangling symlink");
                    return Err(ToolError::SandboxViolation { path: normalized });
                }
                Err(_) => continue,
            }
        }

        // The root itself always canonicalizes, so the loop returns first.
        Err(ToolError::SandboxViolation { path: normalized })
    }
}

/// Resolve `.` and `..` components without touching the filesystem
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

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_normalize_resolves_dots() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize(Path::new("/a/../../..")), PathBuf::from("/"));
    }

    #[test]
    fn test_validate_path_within_root() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("test.txt"), "content").unwrap();

        let ctx = ToolContext::new(temp.path()).unwrap();

        let resolved = ctx.validate_path("test.txt").unwrap();
        assert_eq!(resolved, ctx.root().join("test.txt"));
    }

    #[test]
    fn test_validate_path_root_itself() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path()).unwrap();

        assert_eq!(ctx.validate_path(".").unwrap(), ctx.root());
    }

    #[test]
    fn test_validate_path_outside_root() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path()).unwrap();

        let result = ctx.validate_path("/etc/passwd");
        assert!(matches!(result.unwrap_err(), ToolError::SandboxViolation { .. }));

        let result = ctx.validate_path("../outside.txt");
        assert!(matches!(result.unwrap_err(), ToolError::SandboxViolation { .. }));
    }

    #[test]
    fn test_validate_path_sibling_prefix_rejected() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("proj");
        fs::create_dir(&root).unwrap();
        fs::create_dir(temp.path().join("project2")).unwrap();

        let ctx = ToolContext::new(&root).unwrap();
        let sibling = ctx.root().parent().unwrap().join("project2/x.txt");

        assert!(ctx.validate_path(sibling).is_err());
    }

    #[test]
    fn test_validate_absolute_path_inside_root() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path()).unwrap();
        let inside = ctx.root().join("sub/new.txt");

        assert_eq!(ctx.validate_path(&inside).unwrap(), inside);
    }

    #[test]
    fn test_validate_new_file_path() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path()).unwrap();

        let result = ctx.validate_path("a/b/new_file.txt").unwrap();
        assert_eq!(result, ctx.root().join("a/b/new_file.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_path_symlink_escape() {
        let outside = tempdir().unwrap();
        let temp = tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("link")).unwrap();

        let ctx = ToolContext::new(temp.path()).unwrap();

        let result = ctx.validate_path("link/secret.txt");
        assert!(matches!(result.unwrap_err(), ToolError::SandboxViolation { .. }));
    }

    #[test]
    fn test_new_requires_existing_root() {
        let temp = tempdir().unwrap();
        let result = ToolContext::new(temp.path().join("missing"));
        assert!(matches!(result.unwrap_err(), ToolError::Stat { .. }));
    }

    #[test]
    fn test_effective_timeout_clamped_by_deadline() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path()).unwrap();
        assert_eq!(ctx.effective_timeout(Duration::from_secs(30)), Duration::from_secs(30));

        let ctx = ctx.with_deadline(Some(Instant::now() + Duration::from_secs(2)));
        assert!(ctx.effective_timeout(Duration::from_secs(30)) <= Duration::from_secs(2));
        assert_eq!(ctx.effective_timeout(Duration::from_millis(10)), Duration::from_millis(10));
    }

    proptest! {
        #[test]
        fn prop_validated_paths_stay_in_root(segments in prop::collection::vec(
            prop_oneof![Just("..".to_string()), Just(".".to_string()), "[a-z]{1,6}"],
            1..8,
        )) {
            let temp = tempdir().unwrap();
            let ctx = ToolContext::new(temp.path()).unwrap();
            let requested: PathBuf = segments.iter().collect();

            match ctx.validate_path(&requested) {
                Ok(resolved) => prop_assert!(resolved.starts_with(ctx.root())),
                Err(e) => {
                    let rejected = matches!(e, ToolError::SandboxViolation { .. });
                    prop_assert!(rejected, "unexpected error: {}", e);
                }
            }
        }
    }
}
