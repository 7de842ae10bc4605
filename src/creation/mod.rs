//! Archive creation.

pub mod tar;
pub mod zip;

use std::fs::File;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use crate::ArchiveError;
use crate::Result;

/// Opens the output archive for writing, creating parent directories.
///
/// The file is opened with `create_new`: an already-existing archive is a
/// [`ArchiveError::DestinationExists`] failure before any entry is written.
pub(crate) fn create_output(output: &Path) -> Result<File> {
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(output)
        .map_err(|err| {
            if err.kind() == ErrorKind::AlreadyExists {
                ArchiveError::DestinationExists {
                    path: output.to_path_buf(),
                }
            } else {
                ArchiveError::Io(err)
            }
        })
}
