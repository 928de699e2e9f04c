/// Task state definitions for tracking one page task through its retries
///
/// A page task starts in `Attempting` and ends in exactly one terminal state.
use crate::PagerError;
use std::fmt;

/// Represents the current state of a page task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// A session is open (or about to be opened) for this page
    Attempting,

    // ===== Terminal States =====
    /// The page yielded its full quota of records
    Succeeded,

    /// The task gave up after a terminal condition (blocked, interrupted,
    /// retry budget spent) and contributes an empty result
    Abandoned,

    /// The whole run was cancelled before or while this task ran
    Aborted,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further attempts)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Attempting)
    }

    /// Returns true if the task may move from `self` to another state
    ///
    /// `Attempting -> Attempting` is the retry edge; terminal states have no
    /// outgoing edges.
    pub fn can_transition_to(&self, _next: TaskState) -> bool {
        matches!(self, Self::Attempting)
    }

    /// Moves to `next`, rejecting transitions out of a terminal state
    pub fn transition(&mut self, next: TaskState) -> Result<(), PagerError> {
        if !self.can_transition_to(next) {
            return Err(PagerError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    /// Short lowercase label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attempting => "attempting",
            Self::Succeeded => "succeeded",
            Self::Abandoned => "abandoned",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
