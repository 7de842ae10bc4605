//! ZIP archive creation.
//!
//! ZIP carries no link semantics in this design: a symbolic link inside the
//! source tree is written as its resolved regular-file content, so a ZIP
//! round-trip flattens links into plain files.

use std::fs;
use std::fs::File;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::CancelToken;
use crate::Result;
use crate::naming::entry_name;

use super::create_output;

/// Creates a ZIP archive from `files`, named relative to `base`.
///
/// Files are appended in the caller-supplied order; entries are deflated.
///
/// # Errors
///
/// Returns an error if the output already exists, a source file cannot be
/// read (including a dangling symlink, whose content cannot be resolved),
/// or the operation is cancelled.
pub fn create_zip(
    base: &Path,
    output: &Path,
    files: &[PathBuf],
    cancel: &CancelToken,
) -> Result<()> {
    let file = create_output(output)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        cancel.check()?;

        let name = entry_name(path, base);
        if name.is_empty() {
            continue;
        }

        let metadata = fs::metadata(path)?;
        if metadata.is_dir() {
            continue;
        }

        // File::open follows symlinks, which materializes link content.
        let mut source = File::open(path)?;
        zip.start_file(name, options)?;
        io::copy(&mut source, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
}
