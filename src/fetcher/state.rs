//! Retry state machine for a single fetch call
//!
//! A fetch starts in `Attempting { attempt: 1 }` and moves on after every
//! attempt outcome until it reaches `Succeeded` or `Exhausted`.

use crate::AttemptError;
use bytes::Bytes;

/// Outcome of one attempt that the retry loop can act on
///
/// Body read failures are not represented here; they end the fetch directly.
pub type AttemptResult = Result<Bytes, AttemptError>;

/// Current state of a fetch call
#[derive(Debug)]
pub enum FetchState {
    /// Attempt number `attempt` (1-based) is about to run
    Attempting {
        attempt: u32,
        /// Cause of the previous attempt's failure, if there was one
        last_failure: Option<AttemptError>,
    },

    /// An attempt returned `200 OK` and its body was read
    Succeeded { attempts: u32, body: Bytes },

    /// Every allowed attempt failed; only the last cause is kept
    Exhausted {
        attempts: u32,
        last_failure: AttemptError,
    },
}

impl FetchState {
    /// The state every fetch starts in
    pub fn start() -> Self {
        Self::Attempting {
            attempt: 1,
            last_failure: None,
        }
    }

    /// Applies an attempt outcome
    ///
    /// `max_attempts` is the total number of attempts allowed. Terminal states
    /// are returned unchanged.
    pub fn advance(self, outcome: AttemptResult, max_attempts: u32) -> Self {
        match self {
            Self::Attempting { attempt, .. } => match outcome {
                Ok(body) => Self::Succeeded {
                    attempts: attempt,
                    body,
                },
                Err(failure) if attempt >= max_attempts => Self::Exhausted {
                    attempts: attempt,
                    last_failure: failure,
                },
                Err(failure) => Self::Attempting {
                    attempt: attempt + 1,
                    last_failure: Some(failure),
                },
            },
            terminal => terminal,
        }
    }

    /// Returns true once the fetch can make no further attempts
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Attempting { .. })
    }

    /// Number of attempts that have completed
    pub fn attempts_made(&self) -> u32 {
        match self {
            Self::Attempting { attempt, .. } => attempt - 1,
            Self::Succeeded { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }
}
