//! Operator confirmation for destructive steps.

/// Answers a yes/no question before a destructive action.
pub trait Confirm {
    /// Return `true` to proceed.
    fn confirm(&mut self, question: &str) -> bool;
}
