//! Archive extraction with path-traversal guarding.

pub mod sevenz;
pub mod tar;
pub mod zip;

use std::fs;
use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::Result;

/// Normalizes a stored entry name: backslash to slash, then leading `./`
/// and leading slashes removed.
pub(crate) fn clean_entry_name(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let mut name = unified.as_str();
    loop {
        let next = name.trim_start_matches('/');
        let next = next.strip_prefix("./").unwrap_or(next);
        if next.len() == name.len() {
            break;
        }
        name = next;
    }
    name.to_string()
}

/// Joins a normalized entry name under `root`, rejecting any escape.
///
/// The relative name is resolved lexically; a `..` that would climb above
/// the root, or a rooted component, aborts with
/// [`ArchiveError::PathTraversal`]. The returned path always starts with
/// `root`.
pub(crate) fn guarded_join(root: &Path, name: &str) -> Result<PathBuf> {
    let traversal = || ArchiveError::PathTraversal {
        path: PathBuf::from(name),
    };

    let mut relative = PathBuf::new();
    let mut depth = 0usize;
    for component in Path::new(name).components() {
        match component {
            Component::Normal(c) => {
                relative.push(c);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(traversal());
                }
                relative.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return Err(traversal()),
        }
    }

    let destination = root.join(relative);
    if destination.starts_with(root) {
        Ok(destination)
    } else {
        Err(traversal())
    }
}

fn traversal_error(path: &Path) -> ArchiveError {
    ArchiveError::PathTraversal {
        path: path.to_path_buf(),
    }
}

/// Creates `dest`'s parent directories and re-verifies that the created
/// parent still resolves under `root`.
///
/// The lexical check in [`guarded_join`] cannot see symlinks materialized by
/// earlier entries, so an entry routed through one would land outside the
/// root. Canonicalizing the parent catches the redirect.
pub(crate) fn ensure_parent_in_root(dest: &Path, root: &Path) -> Result<()> {
    let parent = dest.parent().unwrap_or(root);
    fs::create_dir_all(parent)?;
    let resolved = fs::canonicalize(parent)?;
    if resolved.starts_with(root) {
        Ok(())
    } else {
        Err(traversal_error(dest))
    }
}

/// Creates a directory entry and re-verifies it resolves under `root`.
pub(crate) fn create_dir_in_root(dest: &Path, root: &Path) -> Result<()> {
    ensure_parent_in_root(dest, root)?;
    fs::create_dir_all(dest)?;
    if fs::canonicalize(dest)?.starts_with(root) {
        Ok(())
    } else {
        Err(traversal_error(dest))
    }
}

/// Streams an entry's bytes to `dest`, overwriting an existing file.
///
/// Parent directories are created and verified to resolve under `root`. A
/// symlink already sitting at `dest` is removed first: `File::create` would
/// follow it and write at the link's target instead of the entry's own path.
pub(crate) fn write_file_entry<R: Read + ?Sized>(
    reader: &mut R,
    dest: &Path,
    root: &Path,
) -> Result<u64> {
    ensure_parent_in_root(dest, root)?;
    if let Ok(meta) = fs::symlink_metadata(dest)
        && meta.file_type().is_symlink()
    {
        fs::remove_file(dest)?;
    }
    let file = File::create(dest)?;
    let mut writer = BufWriter::with_capacity(64 * 1024, file);
    let written = io::copy(reader, &mut writer)?;
    writer.flush()?;
    Ok(written)
}
