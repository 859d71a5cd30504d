//! Cooperative cancellation for planning requests.
//!
//! A [`CancelToken`] is shared between the caller and the planner. The
//! planner only looks at it around collaborator fetches; once resolution
//! starts it runs to completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::PlannerError;

/// Clonable cancellation flag. All clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Return [`PlannerError::Cancelled`] if cancellation was requested.
    pub fn check(&self) -> Result<(), PlannerError> {
        if self.is_cancelled() {
            return Err(PlannerError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        assert!(token.check().is_ok());

        token.cancel();
        assert!(other.is_cancelled());
        assert!(matches!(other.check(), Err(PlannerError::Cancelled)));
    }
}
