//! File enumeration for archive creation.

use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::ArchiveError;
use crate::Result;

/// Predicate over candidate file paths.
pub type FileFilter<'a> = &'a dyn Fn(&Path) -> bool;

/// Collects the non-directory entries under `dir` in lexicographic order.
///
/// Symbolic links are reported as entries themselves (never followed), so a
/// link inside the tree is archived as a link. Directories are omitted: they
/// are implicit in the entry names. An optional `filter` predicate decides
/// per path whether the entry is included.
///
/// # Errors
///
/// Returns an error if the directory walk fails (unreadable directory,
/// filesystem loop, metadata failure).
pub fn collect_files(dir: &Path, filter: Option<FileFilter<'_>>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir).follow_links(false).sort_by_file_name();

    for entry in walker {
        // Loop-detection errors carry no io::Error; synthesize one.
        let entry = entry.map_err(|e| {
            let msg = e.to_string();
            ArchiveError::Io(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other(msg)),
            )
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.into_path();
        if let Some(filter) = filter
            && !filter(&path)
        {
            continue;
        }
        files.push(path);
    }

    Ok(files)
}
