//! Archive entry naming and lexical path arithmetic.
//!
//! Entry names inside an archive are always relative, forward-slash paths.
//! Everything here is pure string/component manipulation; no filesystem I/O.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Computes the archive entry name for `file` relative to `base`.
///
/// The base prefix is removed with a case-insensitive comparison, any
/// remaining root marker (drive letter or leading separator) is stripped,
/// backslashes become forward slashes, and leading slashes are trimmed.
///
/// Returns the empty string when `file` equals `base`; callers must skip
/// non-directory entries with empty names.
///
/// # Examples
///
/// ```
/// use dirpack::naming::entry_name;
/// use std::path::Path;
///
/// let base = Path::new("/data/project");
/// assert_eq!(entry_name(Path::new("/data/project/a/b.txt"), base), "a/b.txt");
/// assert_eq!(entry_name(base, base), "");
/// ```
#[must_use]
pub fn entry_name(file: &Path, base: &Path) -> String {
    let file_s = file.to_string_lossy();
    let base_s = base.to_string_lossy();

    let rest = match file_s.get(..base_s.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(&base_s) => &file_s[base_s.len()..],
        _ => &file_s[..],
    };

    let unified = rest.replace('\\', "/");
    let rootless = strip_drive_marker(&unified);
    rootless.trim_start_matches('/').to_string()
}

/// Strips a leading `X:` drive marker, if present.
fn strip_drive_marker(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        &s[2..]
    } else {
        s
    }
}

/// Lexically normalizes a path, resolving `.` and `..` components without
/// touching the filesystem.
///
/// Returns `None` when a `..` component would climb above the start of the
/// path (or above the root, for absolute paths).
#[must_use]
pub fn normalize_lexically(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component),
            Component::CurDir => {}
            Component::Normal(c) => {
                out.push(c);
                depth += 1;
            }
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                out.pop();
                depth -= 1;
            }
        }
    }
    Some(out)
}

/// Computes the relative path from `base` to `target` by walking components.
///
/// Both paths are compared component-wise with ASCII-case-insensitive
/// equality. Returns `None` when the two paths sit under different roots or
/// prefixes (e.g. different drives), in which case no relative form exists.
#[must_use]
pub fn relative_from(base: &Path, target: &Path) -> Option<PathBuf> {
    let mut base_iter = base.components().peekable();
    let mut target_iter = target.components().peekable();

    // Consume the shared prefix.
    while let (Some(b), Some(t)) = (base_iter.peek(), target_iter.peek()) {
        if components_equal(*b, *t) {
            base_iter.next();
            target_iter.next();
        } else {
            break;
        }
    }

    // Any remaining root or prefix component means the paths diverge at the
    // filesystem root and cannot be related.
    let mut result = PathBuf::new();
    for b in base_iter {
        match b {
            Component::Prefix(_) | Component::RootDir => return None,
            Component::CurDir => {}
            _ => result.push(Component::ParentDir),
        }
    }
    for t in target_iter {
        match t {
            Component::Prefix(_) | Component::RootDir => return None,
            Component::CurDir => {}
            _ => result.push(t),
        }
    }
    Some(result)
}

/// Returns `true` when a relative path begins with a `..` component.
#[must_use]
pub fn escapes_upward(path: &Path) -> bool {
    matches!(path.components().next(), Some(Component::ParentDir))
}

fn components_equal(a: Component<'_>, b: Component<'_>) -> bool {
    a.as_os_str().eq_ignore_ascii_case(b.as_os_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_name_basic() {
        let base = Path::new("/data/project");
        assert_eq!(
            entry_name(Path::new("/data/project/src/lib.rs"), base),
            "src/lib.rs"
        );
    }

    #[test]
    fn test_entry_name_backslash_input() {
        // Stored names from foreign tools may carry backslashes.
        let base = Path::new("/data/project");
        assert_eq!(
            entry_name(Path::new("/data/project\\a\\b.txt"), base),
            "a/b.txt"
        );
    }

    #[test]
    fn test_entry_name_case_insensitive_prefix() {
        let base = Path::new("/Data/Project");
        assert_eq!(
            entry_name(Path::new("/data/project/a.txt"), base),
            "a.txt"
        );
    }

    #[test]
    fn test_entry_name_base_equals_file() {
        let base = Path::new("/data/project");
        assert_eq!(entry_name(base, base), "");
    }

    #[test]
    fn test_entry_name_base_without_trailing_separator() {
        let base = Path::new("/data/project");
        let file = Path::new("/data/project/nested/deep/f");
        assert_eq!(entry_name(file, base), "nested/deep/f");
    }

    #[test]
    fn test_entry_name_strips_drive_marker() {
        let base = Path::new("D:\\work");
        let file = Path::new("C:\\other\\f.txt");
        // Base is not a prefix; the drive marker and root are stripped.
        assert_eq!(entry_name(file, base), "other/f.txt");
    }

    #[test]
    fn test_normalize_resolves_dots() {
        let normalized = normalize_lexically(Path::new("a/./b/../c"));
        assert_eq!(normalized, Some(PathBuf::from("a/c")));
    }

    #[test]
    fn test_normalize_rejects_escape() {
        assert_eq!(normalize_lexically(Path::new("a/../../b")), None);
        assert_eq!(normalize_lexically(Path::new("../x")), None);
    }

    #[test]
    fn test_relative_from_sibling() {
        let rel = relative_from(Path::new("/a/b"), Path::new("/a/c/d.txt"));
        assert_eq!(rel, Some(PathBuf::from("../c/d.txt")));
    }

    #[test]
    fn test_relative_from_descendant() {
        let rel = relative_from(Path::new("/a"), Path::new("/a/b/c"));
        assert_eq!(rel, Some(PathBuf::from("b/c")));
    }

    #[test]
    fn test_relative_from_same_path_is_empty() {
        let rel = relative_from(Path::new("/a/b"), Path::new("/a/b"));
        assert_eq!(rel, Some(PathBuf::new()));
    }

    #[test]
    fn test_escapes_upward() {
        assert!(escapes_upward(Path::new("../x")));
        assert!(!escapes_upward(Path::new("x/../y")));
        assert!(!escapes_upward(Path::new("x")));
    }
}
