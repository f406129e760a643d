use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::options::UnsafePathPolicy;

/// Result of sanitizing an archive entry path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SanitizedPath {
    /// Stored path exactly as recorded in the archive.
    pub original: String,
    /// Path relative to the extraction root, using only normal segments.
    pub relative: PathBuf,
    /// `root` joined with `relative`.
    pub resolved: PathBuf,
    pub is_dir: bool,
}

/// Lexically sanitize a stored entry path against `root`.
///
/// Both `/` and `\` are separators. The entry is a directory when its path is
/// empty or ends with a separator. Absolute paths, drive prefixes and `..`
/// segments are rejected, or dropped under [`UnsafePathPolicy::Strip`].
pub fn sanitize_path(stored: &str, root: &Path, policy: UnsafePathPolicy) -> Result<SanitizedPath> {
    if stored.contains('\0') {
        return Err(Error::InvalidPath {
            entry: stored.to_string(),
        });
    }

    let normalized = stored.replace('\\', "/");
    let mut unsafe_path = false;
    let mut segments = Vec::new();

    for (i, segment) in normalized.split('/').enumerate() {
        match segment {
            "" if i == 0 && normalized.starts_with('/') => unsafe_path = true,
            "" | "." => {}
            ".." => unsafe_path = true,
            s if i == 0 && is_drive_prefix(s) => unsafe_path = true,
            s => segments.push(s),
        }
    }

    if unsafe_path && policy != UnsafePathPolicy::Strip {
        return Err(Error::ZipSlip {
            entry: stored.to_string(),
            resolved: lexical_resolve(root, &normalized),
        });
    }

    let relative: PathBuf = segments.iter().collect();
    let is_dir = segments.is_empty() || normalized.ends_with('/');
    let resolved = if segments.is_empty() {
        root.to_path_buf()
    } else {
        root.join(&relative)
    };

    if !resolved.starts_with(root) {
        return Err(Error::ZipSlip {
            entry: stored.to_string(),
            resolved,
        });
    }

    Ok(SanitizedPath {
        original: stored.to_string(),
        relative,
        resolved,
        is_dir,
    })
}

/// Sanitize `stored` and confirm on disk that the destination stays inside `root`.
///
/// `root` must be canonical. The deepest existing ancestor of the destination
/// is canonicalized, so a symlink already present under the root cannot
/// redirect the entry elsewhere.
pub fn resolve_within(stored: &str, root: &Path, policy: UnsafePathPolicy) -> Result<SanitizedPath> {
    let sanitized = sanitize_path(stored, root, policy)?;

    let existing = sanitized
        .resolved
        .ancestors()
        .find(|p| fs::symlink_metadata(p).is_ok())
        .unwrap_or(root);

    let escaped = |resolved: PathBuf| Error::ZipSlip {
        entry: stored.to_string(),
        resolved,
    };
    let canonical = match fs::canonicalize(existing) {
        Ok(canonical) => canonical,
        // A dangling symlink would be followed on write.
        Err(_) if existing != root && is_symlink(existing) => {
            return Err(escaped(existing.to_path_buf()));
        }
        Err(source) => {
            return Err(Error::Destination {
                path: existing.to_path_buf(),
                source,
            });
        }
    };
    if !canonical.starts_with(root) {
        return Err(escaped(canonical));
    }

    Ok(sanitized)
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
}

fn is_drive_prefix(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Where a stored path would land if written without sanitization.
fn lexical_resolve(root: &Path, normalized: &str) -> PathBuf {
    let joined = root.join(normalized);
    let mut result = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            other => result.push(other.as_os_str()),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_base_path() -> &'static Path {
        if cfg!(windows) {
            Path::new("C:/data/out")
        } else {
            Path::new("/data/out")
        }
    }

    fn sanitize(stored: &str) -> Result<SanitizedPath> {
        sanitize_path(stored, test_base_path(), UnsafePathPolicy::Abort)
    }

    fn strip(stored: &str) -> SanitizedPath {
        sanitize_path(stored, test_base_path(), UnsafePathPolicy::Strip).unwrap()
    }

    #[test]
    fn plain_file() {
        let result = sanitize("docs/readme.txt").unwrap();
        assert_eq!(result.original, "docs/readme.txt");
        assert_eq!(result.relative, Path::new("docs/readme.txt"));
        assert_eq!(result.resolved, test_base_path().join("docs/readme.txt"));
        assert!(!result.is_dir);
    }

    #[test]
    fn trailing_separator_is_directory() {
        assert!(sanitize("docs/").unwrap().is_dir);
        assert!(sanitize("docs\\").unwrap().is_dir);
        assert!(!sanitize("docs").unwrap().is_dir);
    }

    #[test]
    fn empty_path_is_root_directory() {
        let result = sanitize("").unwrap();
        assert!(result.is_dir);
        assert_eq!(result.resolved, test_base_path());
    }

    #[test]
    fn backslashes_are_separators() {
        let result = sanitize("a\\b\\c.bin").unwrap();
        assert_eq!(result.relative, Path::new("a/b/c.bin"));
    }

    #[test]
    fn redundant_segments_collapse() {
        let result = sanitize("a//./b/c.bin").unwrap();
        assert_eq!(result.relative, Path::new("a/b/c.bin"));
    }

    #[test]
    fn parent_traversal_rejected() {
        for stored in ["../../evil.txt", "a/../../evil.txt", "a/..\\..\\evil.txt", "a/b/.."] {
            assert!(
                matches!(sanitize(stored), Err(Error::ZipSlip { .. })),
                "{stored} should be rejected"
            );
        }
    }

    #[test]
    fn absolute_paths_rejected() {
        for stored in ["/etc/passwd", "\\etc\\passwd", "C:\\Windows\\evil.dll", "c:evil", "//server/share/x"] {
            assert!(
                matches!(sanitize(stored), Err(Error::ZipSlip { .. })),
                "{stored} should be rejected"
            );
        }
    }

    #[test]
    fn zip_slip_reports_escaped_location() {
        let Err(Error::ZipSlip { entry, resolved }) = sanitize("../../evil.txt") else {
            panic!("expected zip-slip");
        };
        assert_eq!(entry, "../../evil.txt");
        assert!(!resolved.starts_with(test_base_path()));
    }

    #[test]
    fn strip_policy_neutralizes() {
        let result = strip("../../evil.txt");
        assert_eq!(result.resolved, test_base_path().join("evil.txt"));

        let result = strip("/etc/passwd");
        assert_eq!(result.relative, Path::new("etc/passwd"));

        let result = strip("C:\\Windows\\evil.dll");
        assert_eq!(result.relative, Path::new("Windows/evil.dll"));
    }

    #[test]
    fn strip_to_nothing_is_root() {
        let result = strip("../..");
        assert!(result.is_dir);
        assert_eq!(result.resolved, test_base_path());
    }

    #[test]
    fn skip_policy_still_reports() {
        let result = sanitize_path("../x", test_base_path(), UnsafePathPolicy::Skip);
        assert!(matches!(result, Err(Error::ZipSlip { .. })));
    }

    #[test]
    fn null_byte_rejected() {
        assert!(matches!(sanitize("a\0b"), Err(Error::InvalidPath { .. })));
    }

    #[test]
    fn dotted_names_are_not_traversal() {
        let result = sanitize("..data/...").unwrap();
        assert_eq!(result.relative, Path::new("..data/..."));
    }

    #[test]
    fn resolve_within_real_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        let result = resolve_within("a/b/c.txt", &root, UnsafePathPolicy::Abort).unwrap();
        assert_eq!(result.resolved, root.join("a/b/c.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_within_rejects_symlink_escape() {
        let dir = tempfile::tempdir().unwrap();
        let base = fs::canonicalize(dir.path()).unwrap();
        let root = base.join("root");
        let outside = base.join("outside");
        fs::create_dir(&root).unwrap();
        fs::create_dir(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();

        let result = resolve_within("link/evil.txt", &root, UnsafePathPolicy::Abort);
        assert!(matches!(result, Err(Error::ZipSlip { .. })));

        let result = resolve_within("link/evil.txt", &root, UnsafePathPolicy::Strip);
        assert!(matches!(result, Err(Error::ZipSlip { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_within_rejects_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let base = fs::canonicalize(dir.path()).unwrap();
        let root = base.join("root");
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(base.join("not-yet"), root.join("labels.csv")).unwrap();

        let result = resolve_within("labels.csv", &root, UnsafePathPolicy::Abort);
        assert!(matches!(result, Err(Error::ZipSlip { .. })));
        assert!(!base.join("not-yet").exists());
    }

    #[test]
    fn resolve_within_missing_entry_below_root_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        fs::create_dir(root.join("train")).unwrap();

        let result = resolve_within("train/new/part-0.csv", &root, UnsafePathPolicy::Abort).unwrap();
        assert_eq!(result.resolved, root.join("train/new/part-0.csv"));
    }
}
