//! Archive format dispatch by filename suffix.

use std::path::Path;

use crate::ArchiveError;
use crate::Result;

/// Supported archive container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// ZIP archive.
    Zip,
    /// Gzip-compressed tar archive.
    TarGz,
    /// Bzip2-compressed tar archive.
    TarBz2,
    /// 7z archive (extraction only).
    SevenZ,
}

impl ArchiveFormat {
    /// Detects the archive format from a file name suffix.
    ///
    /// Matching is case-insensitive and runs on the whole file name, so
    /// compound suffixes like `.tar.gz` resolve the same as `.tgz`.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::UnknownExtension`] naming the offending file
    /// when no suffix matches. No filesystem I/O is performed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirpack::ArchiveFormat;
    /// use std::path::Path;
    ///
    /// let format = ArchiveFormat::from_path(Path::new("backup.TAR.GZ"))?;
    /// assert_eq!(format, ArchiveFormat::TarGz);
    /// # Ok::<(), dirpack::ArchiveError>(())
    /// ```
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        if name.ends_with(".zip") {
            Ok(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Ok(Self::TarGz)
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") || name.ends_with(".tbz") {
            Ok(Self::TarBz2)
        } else if name.ends_with(".7z") {
            Ok(Self::SevenZ)
        } else {
            Err(ArchiveError::UnknownExtension {
                path: path.to_path_buf(),
            })
        }
    }

    /// Returns `true` if archives of this format can be written.
    ///
    /// 7z is read-only in this crate.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        !matches!(self, Self::SevenZ)
    }

    /// Short format name for messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
            Self::TarBz2 => "tar.bz2",
            Self::SevenZ => "7z",
        }
    }
}
