//! Symlink-aware directory archiving with traversal-safe extraction.
//!
//! `dirpack` compresses directory trees into ZIP, `.tar.gz` or `.tar.bz2`
//! archives and extracts those plus 7z (read-only), picking the format from
//! the file name suffix. TAR archives round-trip symbolic links; extraction
//! re-anchors every entry under the destination directory and rejects
//! entries that would escape it. On platforms that deny symlink creation,
//! link entries degrade to copies of their targets instead of failing.
//!
//! # Examples
//!
//! ```no_run
//! use dirpack::CancelToken;
//! use dirpack::compress;
//! use dirpack::decompress;
//!
//! # fn main() -> Result<(), dirpack::ArchiveError> {
//! let cancel = CancelToken::new();
//! compress("project", "project.tar.gz", None, &cancel)?;
//! decompress("project.tar.gz", "restored", &cancel)?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod cancel;
pub mod creation;
pub mod error;
pub mod extraction;
pub mod format;
pub mod links;
pub mod naming;
pub mod walk;

// Re-export main API types
pub use api::compress;
pub use api::compress_files;
pub use api::compress_tar_bz2;
pub use api::compress_tar_gz;
pub use api::compress_zip;
pub use api::decompress;
pub use api::decompress_tar_bz2;
pub use api::decompress_tar_gz;
pub use api::decompress_zip;
pub use cancel::CancelToken;
pub use error::ArchiveError;
pub use error::Result;
pub use format::ArchiveFormat;
pub use links::LinkOutcome;
pub use links::OsSymlinks;
pub use links::SymlinkPrimitive;
pub use walk::FileFilter;
pub use walk::collect_files;
