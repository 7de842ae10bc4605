//! 7z archive extraction (read-only; this crate never writes 7z).
//!
//! `sevenz-rust2` drives extraction through a callback per entry. Crate
//! errors cannot cross that boundary, so the callback stashes the first
//! failure in a `RefCell` and stops the walk by returning `Ok(false)`.

use std::cell::RefCell;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::ArchiveError;
use crate::CancelToken;
use crate::Result;

use super::clean_entry_name;
use super::guarded_join;
use super::write_file_entry;

/// Extracts a 7z archive under `root`.
///
/// `root` must be the canonicalized destination directory.
///
/// # Errors
///
/// Returns an error on path traversal, cancellation, or a corrupt archive.
pub fn extract_sevenz(archive: &Path, root: &Path, cancel: &CancelToken) -> Result<()> {
    let mut file = File::open(archive)?;

    // First failure raised inside the callback, surfaced after the walk.
    let failure: RefCell<Option<ArchiveError>> = RefCell::new(None);

    let extract_fn = |entry: &sevenz_rust2::ArchiveEntry,
                      reader: &mut dyn Read,
                      _dest: &std::path::PathBuf|
     -> std::result::Result<bool, sevenz_rust2::Error> {
        if cancel.is_cancelled() {
            *failure.borrow_mut() = Some(ArchiveError::Cancelled);
            return Ok(false);
        }
        if entry.is_directory() {
            // Directories materialize through their file entries.
            return Ok(true);
        }

        let name = clean_entry_name(&entry.name);
        if name.is_empty() {
            return Ok(true);
        }

        let written =
            guarded_join(root, &name).and_then(|dest| write_file_entry(reader, &dest, root));
        if let Err(err) = written {
            *failure.borrow_mut() = Some(err);
            return Ok(false);
        }
        Ok(true)
    };

    sevenz_rust2::decompress_with_extract_fn(&mut file, root, extract_fn)?;

    match failure.into_inner() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
