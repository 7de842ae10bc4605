//! Symbolic-link target resolution for archive write and read.
//!
//! The two halves are symmetric: `archive_link_target` turns an OS link
//! target into a portable archive string when writing, and
//! `resolve_link_target` turns a stored archive string back into something
//! the OS can link to when extracting.
//!
//! Archives should carry relative links whenever the target lies inside the
//! compressed tree; absolute links are a last resort because they break as
//! soon as the tree moves.

use std::fs;
use std::fs::File;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::naming::escapes_upward;
use crate::naming::normalize_lexically;
use crate::naming::relative_from;

/// NT object-manager prefix occasionally present in raw reparse targets.
const NT_DEVICE_PREFIX: &str = r"\??\";

/// Resolved link targets for one extracted link entry.
///
/// Computed independently per entry; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResolution {
    /// Target string usable to create the OS-level link, relative to the
    /// link's own location where possible.
    pub platform_target: PathBuf,

    /// Fully resolved target path, used for existence checks and for the
    /// copy fallback.
    pub absolute_target: PathBuf,

    /// Whether the target is (or is hinted to be) a directory.
    pub is_directory: bool,
}

/// Normalizes a raw OS link target for storage in an archive.
///
/// Absolute targets are relativized with a fixed fallback chain: relative to
/// the link's parent directory, then relative to `base`, then kept absolute.
/// A candidate is rejected when it escapes upward (leading `..`). The result
/// uses forward slashes; an empty result falls back to the link's own file
/// name to guard against self-referencing degenerate targets.
#[must_use]
pub fn archive_link_target(raw: &Path, base: &Path, link: &Path) -> String {
    let raw_s = raw.to_string_lossy();
    let raw_s = raw_s.strip_prefix(NT_DEVICE_PREFIX).unwrap_or(&raw_s);
    let raw = Path::new(raw_s);

    let target = if raw.is_absolute() {
        let full = normalize_lexically(raw).unwrap_or_else(|| raw.to_path_buf());
        let parent = link.parent().unwrap_or(base);
        match relative_from(parent, &full) {
            Some(rel) if !escapes_upward(&rel) => rel,
            _ => match relative_from(base, &full) {
                Some(rel) if !escapes_upward(&rel) => rel,
                _ => full,
            },
        }
    } else {
        raw.to_path_buf()
    };

    let name = target.to_string_lossy().replace('\\', "/");
    if name.is_empty() {
        link.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        name
    }
}

/// Resolves a stored link name into targets usable during extraction.
///
/// `raw` is the link name as stored in the container, `link_parent` the
/// directory the link is being created in, and `root` the canonicalized
/// extraction root. A name starting with `/` is treated as root-relative to
/// the extraction root, not the OS root.
#[must_use]
pub fn resolve_link_target(raw: &str, link_parent: &Path, root: &Path) -> LinkResolution {
    let unified = raw.replace('\\', "/");
    let dir_hint = unified.ends_with('/');
    let trimmed = unified.trim_end_matches('/');

    let (platform_target, absolute_target) = if trimmed.is_empty() {
        // Degenerate entry: point the link at its own parent.
        (PathBuf::from("."), link_parent.to_path_buf())
    } else if let Some(rooted) = trimmed.strip_prefix('/') {
        let rooted = rooted.trim_start_matches('/');
        let absolute = normalize_join(root, Path::new(rooted));
        let platform = relative_from(link_parent, &absolute).unwrap_or_else(|| absolute.clone());
        (platform, absolute)
    } else if Path::new(trimmed).is_absolute() {
        // Legacy absolute link stored verbatim.
        let raw_path = PathBuf::from(trimmed);
        let absolute = normalize_lexically(&raw_path).unwrap_or_else(|| raw_path.clone());
        (raw_path, absolute)
    } else {
        let relative = PathBuf::from(trimmed);
        let absolute = normalize_join(link_parent, &relative);
        (relative, absolute)
    };

    let is_directory = dir_hint || absolute_target.is_dir();
    LinkResolution {
        platform_target,
        absolute_target,
        is_directory,
    }
}

/// Joins and lexically normalizes; a relative path that climbs above the
/// join base is kept as the plain join, `..` components intact.
fn normalize_join(base: &Path, rel: &Path) -> PathBuf {
    let joined = base.join(rel);
    normalize_lexically(&joined).unwrap_or(joined)
}

/// Outcome of materializing a link entry on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A native symbolic link was created.
    Linked,
    /// Link creation was denied; the target file was copied instead.
    CopiedTarget,
    /// Link creation was denied; a plain directory was created instead.
    CreatedDirectory,
    /// Link creation was denied and the target does not exist; an empty
    /// placeholder file was created.
    CreatedPlaceholder,
}

/// OS-level symbolic-link creation, abstracted for platform differences and
/// for test injection.
pub trait SymlinkPrimitive {
    /// Creates a symbolic link at `link` pointing at `target`.
    ///
    /// `is_directory` matters on Windows, where file and directory links are
    /// distinct; Unix ignores it.
    fn symlink(&self, target: &Path, link: &Path, is_directory: bool) -> io::Result<()>;
}

/// The real platform implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSymlinks;

#[cfg(unix)]
impl SymlinkPrimitive for OsSymlinks {
    fn symlink(&self, target: &Path, link: &Path, _is_directory: bool) -> io::Result<()> {
        std::os::unix::fs::symlink(target, link)
    }
}

#[cfg(windows)]
impl SymlinkPrimitive for OsSymlinks {
    fn symlink(&self, target: &Path, link: &Path, is_directory: bool) -> io::Result<()> {
        if is_directory {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        }
    }
}

#[cfg(not(any(unix, windows)))]
impl SymlinkPrimitive for OsSymlinks {
    fn symlink(&self, _target: &Path, _link: &Path, _is_directory: bool) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }
}

/// Classifies errors that mean "this platform/user cannot create symlinks".
///
/// `ERROR_PRIVILEGE_NOT_HELD` (1314) is Windows without the symlink
/// privilege.
fn is_privilege_denied(err: &io::Error) -> bool {
    if matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::Unsupported
    ) {
        return true;
    }
    #[cfg(windows)]
    if err.raw_os_error() == Some(1314) {
        return true;
    }
    false
}

/// Creates the link at `link`, degrading gracefully when the OS refuses.
///
/// The degraded mode never surfaces a privilege denial to the caller: the
/// resolved target file is copied in place of the link, a plain directory is
/// created for directory targets, and a missing target yields an empty
/// placeholder file.
pub fn materialize_link(
    link: &Path,
    resolution: &LinkResolution,
    primitive: &dyn SymlinkPrimitive,
) -> io::Result<LinkOutcome> {
    // Extraction overwrites: clear any previous entry at this path.
    let _ = fs::remove_file(link);

    match primitive.symlink(&resolution.platform_target, link, resolution.is_directory) {
        Ok(()) => Ok(LinkOutcome::Linked),
        Err(err) if is_privilege_denied(&err) => {
            if resolution.absolute_target.is_dir() {
                fs::create_dir_all(link)?;
                Ok(LinkOutcome::CreatedDirectory)
            } else if resolution.absolute_target.is_file() {
                fs::copy(&resolution.absolute_target, link)?;
                Ok(LinkOutcome::CopiedTarget)
            } else {
                File::create(link)?;
                Ok(LinkOutcome::CreatedPlaceholder)
            }
        }
        Err(err) => Err(err),
    }
}
