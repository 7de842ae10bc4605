//! Error types for archive operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`ArchiveError`].
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that can occur during archive creation or extraction.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File name carries no recognized archive suffix.
    #[error("unknown archive extension: {path}")]
    UnknownExtension {
        /// The offending file name.
        path: PathBuf,
    },

    /// 7z archives can only be read, never written.
    #[error(
        "writing 7z archives is not supported; \
         use .zip, .tar.gz or .tar.bz2 instead"
    )]
    SevenZWriteUnsupported,

    /// An archive entry would resolve outside the destination root.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The entry path that attempted traversal.
        path: PathBuf,
    },

    /// Destination archive file already exists.
    #[error("archive file already exists: {path}")]
    DestinationExists {
        /// The existing archive path.
        path: PathBuf,
    },

    /// Operation was cancelled at an entry boundary.
    #[error("operation cancelled")]
    Cancelled,

    /// ZIP container error, propagated unchanged.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// 7z decoder error, propagated unchanged.
    #[error("7z error: {0}")]
    SevenZ(#[from] sevenz_rust2::Error),
}

impl ArchiveError {
    /// Returns `true` if this error represents a security violation.
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::PathTraversal { .. })
    }

    /// Returns `true` if the operation stopped because of cancellation
    /// rather than a failure.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
