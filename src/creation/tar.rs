//! TAR archive creation with gzip or bzip2 compression filters.

use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tar::Builder;
use tar::EntryType;
use tar::Header;

use crate::CancelToken;
use crate::Result;
use crate::links::archive_link_target;
use crate::naming::entry_name;

use super::create_output;

/// Creates a gzip-compressed TAR archive (`.tar.gz` / `.tgz`).
///
/// Files are appended in the caller-supplied order. Symbolic links become
/// zero-size link-typed entries carrying a normalized target; everything
/// else is streamed as a regular file.
///
/// # Errors
///
/// Returns an error if the output already exists, a source file cannot be
/// read, or the operation is cancelled.
pub fn create_tar_gz(
    base: &Path,
    output: &Path,
    files: &[PathBuf],
    cancel: &CancelToken,
) -> Result<()> {
    let file = create_output(output)?;
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let encoder = append_entries(encoder, base, files, cancel)?;
    encoder.finish()?;
    Ok(())
}

/// Creates a bzip2-compressed TAR archive (`.tar.bz2` / `.tbz2` / `.tbz`).
///
/// # Errors
///
/// Same failure conditions as [`create_tar_gz`].
pub fn create_tar_bz2(
    base: &Path,
    output: &Path,
    files: &[PathBuf],
    cancel: &CancelToken,
) -> Result<()> {
    let file = create_output(output)?;
    let encoder = bzip2::write::BzEncoder::new(file, bzip2::Compression::default());
    let encoder = append_entries(encoder, base, files, cancel)?;
    encoder.finish()?;
    Ok(())
}

/// Appends all entries to a TAR stream over any writer, returning the writer
/// so compression encoders can be finished by the caller.
fn append_entries<W: Write>(
    writer: W,
    base: &Path,
    files: &[PathBuf],
    cancel: &CancelToken,
) -> Result<W> {
    let mut builder = Builder::new(writer);

    for file in files {
        // Cancellation is polled per file; entries already written remain.
        cancel.check()?;

        let name = entry_name(file, base);
        if name.is_empty() {
            continue;
        }

        let metadata = fs::symlink_metadata(file)?;
        if metadata.file_type().is_symlink() {
            let raw = fs::read_link(file)?;
            let target = archive_link_target(&raw, base, file);
            append_symlink(&mut builder, &name, &target)?;
        } else if metadata.is_dir() {
            continue;
        } else {
            append_file(&mut builder, file, &name, &metadata)?;
        }
    }

    builder.finish()?;
    Ok(builder.into_inner()?)
}

/// Writes a link-typed entry: zero size, target in the link-name field.
fn append_symlink<W: Write>(builder: &mut Builder<W>, name: &str, target: &str) -> Result<()> {
    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Symlink);
    header.set_size(0);
    header.set_cksum();
    builder.append_link(&mut header, name, target)?;
    Ok(())
}

/// Streams a regular file's full content into the archive.
fn append_file<W: Write>(
    builder: &mut Builder<W>,
    path: &Path,
    name: &str,
    metadata: &fs::Metadata,
) -> Result<()> {
    let mut file = File::open(path)?;
    let mut header = Header::new_gnu();
    header.set_size(metadata.len());
    set_file_metadata(&mut header, metadata);
    header.set_cksum();
    builder.append_data(&mut header, name, &mut file)?;
    Ok(())
}

#[cfg(unix)]
fn set_file_metadata(header: &mut Header, metadata: &fs::Metadata) {
    use std::os::unix::fs::MetadataExt;
    header.set_mode(metadata.mode());
    // mtime can predate the epoch; clamp to 0
    #[allow(clippy::cast_sign_loss)]
    let mtime = metadata.mtime().max(0) as u64;
    header.set_mtime(mtime);
}

#[cfg(not(unix))]
fn set_file_metadata(header: &mut Header, metadata: &fs::Metadata) {
    let mode = if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    };
    header.set_mode(mode);
    if let Ok(modified) = metadata.modified()
        && let Ok(duration) = modified.duration_since(std::time::UNIX_EPOCH)
    {
        header.set_mtime(duration.as_secs());
    }
}
