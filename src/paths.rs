/*!
 * Path Validation
 * Traversal-safe resolution of root-relative paths
 */

use std::path::{Path, PathBuf};

use path_clean::clean;
use tracing::warn;

use crate::types::{FsError, FsResult};

/// Resolve a root-relative path against the sandbox root
///
/// Joins `root` and `relative`, then resolves `.` and `..` segments
/// lexically, so the target does not need to exist yet (a subsequent write
/// may create it). Any result that leaves `root` is rejected.
///
/// Containment is checked component-wise, not by string prefix: a sibling
/// directory that merely shares `root`'s name as a textual prefix (e.g.
/// `/data` vs `/data-other`) is still outside the sandbox.
///
/// `root` is expected to be lexically cleaned already; callers go through
/// [`SandboxFs::new`](crate::SandboxFs::new), which guarantees this.
pub(crate) fn resolve(root: &Path, relative: &str) -> FsResult<PathBuf> {
    if relative.is_empty() {
        return Err(FsError::InvalidPath("empty path".to_string()));
    }

    let resolved = clean(root.join(relative));
    if !resolved.starts_with(root) {
        warn!(path = %relative, "Rejected path escaping sandbox root");
        return Err(FsError::PathEscape(relative.to_string()));
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> &'static Path {
        Path::new("/sandbox")
    }

    #[test]
    fn test_resolves_within_root() {
        assert_eq!(
            resolve(root(), "a/b.txt").unwrap(),
            PathBuf::from("/sandbox/a/b.txt")
        );
        assert_eq!(
            resolve(root(), "a/../b.txt").unwrap(),
            PathBuf::from("/sandbox/b.txt")
        );
        assert_eq!(
            resolve(root(), "./a/./b.txt").unwrap(),
            PathBuf::from("/sandbox/a/b.txt")
        );
    }

    #[test]
    fn test_dot_resolves_to_root() {
        assert_eq!(resolve(root(), ".").unwrap(), PathBuf::from("/sandbox"));
    }

    #[test]
    fn test_empty_path_is_invalid() {
        assert!(matches!(resolve(root(), ""), Err(FsError::InvalidPath(_))));
    }

    #[test]
    fn test_traversal_is_rejected() {
        for path in ["..", "../etc/passwd", "a/../../etc", "a/b/../../../x"] {
            assert!(
                matches!(resolve(root(), path), Err(FsError::PathEscape(_))),
                "{path} should escape"
            );
        }
    }

    #[test]
    fn test_absolute_path_is_rejected() {
        // Joining an absolute path replaces the root entirely
        assert!(matches!(
            resolve(root(), "/etc/passwd"),
            Err(FsError::PathEscape(_))
        ));
    }

    #[test]
    fn test_sibling_prefix_is_rejected() {
        // /sandbox-other shares /sandbox as a string prefix but is a
        // different directory; component-wise comparison catches it
        assert!(matches!(
            resolve(root(), "../sandbox-other/x"),
            Err(FsError::PathEscape(_))
        ));
    }
}
