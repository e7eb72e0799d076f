use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::AggregateError;

/// Shared cancellation flag for one traversal.
///
/// Every recursive aggregation and tree-building step checks it before doing
/// any work, so a cancelled walk stops at the next directory boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// # Errors
    ///
    /// Returns [`AggregateError::Cancelled`] once [`CancelHandle::cancel`] has been called.
    pub fn check(&self) -> Result<(), AggregateError> {
        if self.is_cancelled() {
            Err(AggregateError::Cancelled)
        } else {
            Ok(())
        }
    }
}
