//! Call-level mutual exclusion for the staking operations.

use crate::TokenError;

/// Instance-wide busy flag.
///
/// Acquired on entry to `stake`, `unstake` and `claim_reward` and released
/// on every exit path. A second acquisition while held is rejected.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: bool,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self) -> Result<(), TokenError> {
        if self.entered {
            return Err(TokenError::ReentrancyRejected);
        }
        self.entered = true;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.entered = false;
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_enter_is_rejected_until_exit() {
        let mut guard = ReentrancyGuard::new();
        guard.enter().unwrap();
        assert_eq!(guard.enter(), Err(TokenError::ReentrancyRejected));
        guard.exit();
        assert!(!guard.is_entered());
        guard.enter().unwrap();
    }
}
