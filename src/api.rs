//! Top-level compress/decompress entry points.
//!
//! These functions dispatch on the archive file name suffix before touching
//! the filesystem, so an unknown extension or a 7z write request fails
//! without creating anything on disk.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::CancelToken;
use crate::Result;
use crate::creation;
use crate::extraction;
use crate::format::ArchiveFormat;
use crate::links::OsSymlinks;
use crate::walk;
use crate::walk::FileFilter;

/// Compresses `directory` into the archive at `archive`, choosing the
/// format from the archive file name suffix.
///
/// The directory is walked recursively in lexicographic order. Entry names
/// inside the archive are relative to `directory` and use forward slashes.
/// An optional `filter` keeps only files it returns `true` for; directories
/// are always traversed.
///
/// # Errors
///
/// * [`ArchiveError::UnknownExtension`] if the suffix is not recognized.
/// * [`ArchiveError::SevenZWriteUnsupported`] for a `.7z` destination.
/// * [`ArchiveError::DestinationExists`] if `archive` already exists.
/// * [`ArchiveError::Cancelled`] if `cancel` fires between entries.
///
/// # Examples
///
/// ```no_run
/// use dirpack::{compress, CancelToken};
///
/// compress("photos", "photos.tar.gz", None, &CancelToken::new())?;
/// # Ok::<(), dirpack::ArchiveError>(())
/// ```
pub fn compress(
    directory: impl AsRef<Path>,
    archive: impl AsRef<Path>,
    filter: Option<FileFilter<'_>>,
    cancel: &CancelToken,
) -> Result<()> {
    let archive = archive.as_ref();
    let format = writable_format(archive)?;
    let base = fs::canonicalize(directory.as_ref())?;
    let files = walk::collect_files(&base, filter)?;
    dispatch_create(format, &base, archive, &files, cancel)
}

/// Compresses an explicit list of files into `archive`.
///
/// Entry names are derived by stripping `base` from each file path; files
/// outside `base` keep their full path converted to slashes. The list is
/// archived in the order given.
///
/// # Errors
///
/// Same failure conditions as [`compress`].
pub fn compress_files(
    base: impl AsRef<Path>,
    archive: impl AsRef<Path>,
    files: &[PathBuf],
    cancel: &CancelToken,
) -> Result<()> {
    let archive = archive.as_ref();
    let format = writable_format(archive)?;
    dispatch_create(format, base.as_ref(), archive, files, cancel)
}

/// Extracts `archive` under `directory`, creating the directory if needed.
///
/// Every entry destination is re-anchored under `directory`; entries whose
/// names would escape it abort extraction with
/// [`ArchiveError::PathTraversal`]. On platforms or accounts that cannot
/// create symbolic links, link entries degrade to copies of their targets
/// instead of failing.
///
/// # Errors
///
/// * [`ArchiveError::UnknownExtension`] if the suffix is not recognized.
/// * [`ArchiveError::PathTraversal`] on an escaping entry name.
/// * [`ArchiveError::Cancelled`] if `cancel` fires between entries.
pub fn decompress(
    archive: impl AsRef<Path>,
    directory: impl AsRef<Path>,
    cancel: &CancelToken,
) -> Result<()> {
    let archive = archive.as_ref();
    let format = ArchiveFormat::from_path(archive)?;

    let root = prepare_destination(directory.as_ref())?;

    match format {
        ArchiveFormat::Zip => extraction::zip::extract_zip(archive, &root, cancel),
        ArchiveFormat::TarGz => {
            extraction::tar::extract_tar_gz(archive, &root, cancel, &OsSymlinks)
        }
        ArchiveFormat::TarBz2 => {
            extraction::tar::extract_tar_bz2(archive, &root, cancel, &OsSymlinks)
        }
        ArchiveFormat::SevenZ => extraction::sevenz::extract_sevenz(archive, &root, cancel),
    }
}

/// Compresses `directory` into a ZIP archive, ignoring the suffix of
/// `archive`.
///
/// # Errors
///
/// Same filesystem failure conditions as [`compress`].
pub fn compress_zip(
    directory: impl AsRef<Path>,
    archive: impl AsRef<Path>,
    filter: Option<FileFilter<'_>>,
    cancel: &CancelToken,
) -> Result<()> {
    let base = fs::canonicalize(directory.as_ref())?;
    let files = walk::collect_files(&base, filter)?;
    creation::zip::create_zip(&base, archive.as_ref(), &files, cancel)
}

/// Compresses `directory` into a gzip-compressed TAR archive, ignoring the
/// suffix of `archive`.
///
/// # Errors
///
/// Same filesystem failure conditions as [`compress`].
pub fn compress_tar_gz(
    directory: impl AsRef<Path>,
    archive: impl AsRef<Path>,
    filter: Option<FileFilter<'_>>,
    cancel: &CancelToken,
) -> Result<()> {
    let base = fs::canonicalize(directory.as_ref())?;
    let files = walk::collect_files(&base, filter)?;
    creation::tar::create_tar_gz(&base, archive.as_ref(), &files, cancel)
}

/// Compresses `directory` into a bzip2-compressed TAR archive, ignoring the
/// suffix of `archive`.
///
/// # Errors
///
/// Same filesystem failure conditions as [`compress`].
pub fn compress_tar_bz2(
    directory: impl AsRef<Path>,
    archive: impl AsRef<Path>,
    filter: Option<FileFilter<'_>>,
    cancel: &CancelToken,
) -> Result<()> {
    let base = fs::canonicalize(directory.as_ref())?;
    let files = walk::collect_files(&base, filter)?;
    creation::tar::create_tar_bz2(&base, archive.as_ref(), &files, cancel)
}

/// Extracts `archive` as a ZIP archive, ignoring its suffix.
///
/// # Errors
///
/// Same filesystem failure conditions as [`decompress`].
pub fn decompress_zip(
    archive: impl AsRef<Path>,
    directory: impl AsRef<Path>,
    cancel: &CancelToken,
) -> Result<()> {
    let root = prepare_destination(directory.as_ref())?;
    extraction::zip::extract_zip(archive.as_ref(), &root, cancel)
}

/// Extracts `archive` as a gzip-compressed TAR archive, ignoring its suffix.
///
/// # Errors
///
/// Same filesystem failure conditions as [`decompress`].
pub fn decompress_tar_gz(
    archive: impl AsRef<Path>,
    directory: impl AsRef<Path>,
    cancel: &CancelToken,
) -> Result<()> {
    let root = prepare_destination(directory.as_ref())?;
    extraction::tar::extract_tar_gz(archive.as_ref(), &root, cancel, &OsSymlinks)
}

/// Extracts `archive` as a bzip2-compressed TAR archive, ignoring its
/// suffix.
///
/// # Errors
///
/// Same filesystem failure conditions as [`decompress`].
pub fn decompress_tar_bz2(
    archive: impl AsRef<Path>,
    directory: impl AsRef<Path>,
    cancel: &CancelToken,
) -> Result<()> {
    let root = prepare_destination(directory.as_ref())?;
    extraction::tar::extract_tar_bz2(archive.as_ref(), &root, cancel, &OsSymlinks)
}

fn prepare_destination(directory: &Path) -> Result<PathBuf> {
    fs::create_dir_all(directory)?;
    Ok(fs::canonicalize(directory)?)
}

/// Resolves the format for a write destination, rejecting read-only ones.
fn writable_format(archive: &Path) -> Result<ArchiveFormat> {
    let format = ArchiveFormat::from_path(archive)?;
    if !format.is_writable() {
        return Err(ArchiveError::SevenZWriteUnsupported);
    }
    Ok(format)
}

fn dispatch_create(
    format: ArchiveFormat,
    base: &Path,
    archive: &Path,
    files: &[PathBuf],
    cancel: &CancelToken,
) -> Result<()> {
    match format {
        ArchiveFormat::Zip => creation::zip::create_zip(base, archive, files, cancel),
        ArchiveFormat::TarGz => creation::tar::create_tar_gz(base, archive, files, cancel),
        ArchiveFormat::TarBz2 => creation::tar::create_tar_bz2(base, archive, files, cancel),
        ArchiveFormat::SevenZ => Err(ArchiveError::SevenZWriteUnsupported),
    }
}
