//! Run phase definitions for the harvest lifecycle
//!
//! A run moves strictly forward through `Seeding → Running → Draining → Stopped`.

use crate::HarvestError;
use std::fmt;

/// Represents the current phase of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Bootstrapping the explored set and fetching the entry page
    Seeding,

    /// Coordinator merging discoveries while workers fetch
    Running,

    /// Termination flag set; workers finish their current iteration
    Draining,

    /// All workers have exited
    Stopped,
}

impl RunPhase {
    /// Returns true if workers may still be fetching in this phase
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Draining)
    }

    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// Seeding may go straight to Draining when the counter offset already
    /// meets the target.
    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        matches!(
            (self, next),
            (Self::Seeding, Self::Running)
                | (Self::Seeding, Self::Draining)
                | (Self::Running, Self::Draining)
                | (Self::Draining, Self::Stopped)
        )
    }

    /// Moves to `next`, rejecting illegal transitions
    pub fn transition(self, next: RunPhase) -> Result<RunPhase, HarvestError> {
        if self.can_transition_to(next) {
            tracing::info!("Run phase: {} -> {}", self, next);
            Ok(next)
        } else {
            Err(HarvestError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeding => "seeding",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
