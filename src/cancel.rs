//! Cooperative cancellation for archive operations.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::ArchiveError;
use crate::Result;

/// A cloneable cancellation flag polled at entry boundaries.
///
/// Cancellation is cooperative: compress and decompress check the token once
/// per file or archive entry, never in the middle of streaming a single
/// entry's bytes. Entries already written when the flag is raised remain in
/// the output; nothing is rolled back.
///
/// # Examples
///
/// ```
/// use dirpack::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// assert!(token.check().is_ok());
/// handle.cancel();
/// assert!(token.check().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Takes effect before the next entry starts.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Returns [`ArchiveError::Cancelled`] if cancellation has been
    /// requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ArchiveError::Cancelled)
        } else {
            Ok(())
        }
    }
}
