//! Async result slots.

use crate::errors::{invalid_operation, EvalError};

use super::Value;

/// State of a promise. Settling happens at most once.
#[derive(Clone, Debug, Default)]
pub enum PromiseState {
    #[default]
    Pending,
    Fulfilled(Value),
    Rejected(Value),
}

impl PromiseState {
    pub fn state_name(&self) -> &'static str {
        match self {
            PromiseState::Pending => "pending",
            PromiseState::Fulfilled(_) => "fulfilled",
            PromiseState::Rejected(_) => "rejected",
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, PromiseState::Pending)
    }

    /// Settle with a value.
    pub fn fulfill(&mut self, value: Value) -> Result<(), EvalError> {
        self.settle(PromiseState::Fulfilled(value))
    }

    /// Settle with a failure reason.
    pub fn reject(&mut self, reason: Value) -> Result<(), EvalError> {
        self.settle(PromiseState::Rejected(reason))
    }

    fn settle(&mut self, next: PromiseState) -> Result<(), EvalError> {
        if !self.is_pending() {
            return Err(invalid_operation(format!(
                "promise is already {}",
                self.state_name()
            )));
        }
        *self = next;
        Ok(())
    }
}
