//! ZIP archive extraction.
//!
//! ZIP entries carry no symlink type on the write side of this crate, so
//! extraction deals only in files and directories. Directory entries are
//! recognized by a trailing slash in the stored name.

use std::fs::File;
use std::path::Path;

use zip::ZipArchive;

use crate::CancelToken;
use crate::Result;

use super::clean_entry_name;
use super::create_dir_in_root;
use super::guarded_join;
use super::write_file_entry;

/// Extracts a ZIP archive under `root`.
///
/// `root` must be the canonicalized destination directory.
///
/// # Errors
///
/// Returns an error on path traversal, cancellation, or a corrupt archive.
pub fn extract_zip(archive: &Path, root: &Path, cancel: &CancelToken) -> Result<()> {
    let file = File::open(archive)?;
    let mut archive = ZipArchive::new(file)?;

    for index in 0..archive.len() {
        cancel.check()?;
        let mut entry = archive.by_index(index)?;

        let raw_name = entry.name().to_string();
        let is_dir_marker = raw_name.ends_with('/') || raw_name.ends_with('\\');
        let name = clean_entry_name(&raw_name);
        if name.is_empty() && !is_dir_marker {
            continue;
        }
        let dest = guarded_join(root, &name)?;

        if is_dir_marker {
            create_dir_in_root(&dest, root)?;
        } else {
            write_file_entry(&mut entry, &dest, root)?;
        }
    }
    Ok(())
}
