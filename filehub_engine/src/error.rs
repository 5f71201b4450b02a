/// FileHub Engine — Error Taxonomy
///
/// Validation errors are recoverable: the caller re-prompts with valid input.
/// `Overflow` and `InvariantViolation` are internal and surface as an
/// error status at the turn / resolution boundary.

use thiserror::Error;

use crate::domain::StaffRole;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("no pending event to resolve")]
    NoPendingEvent,

    #[error("invalid choice {index}: event offers {available} choices")]
    InvalidChoice { index: usize, available: usize },

    #[error("unknown action: {0:?}")]
    UnknownAction(String),

    #[error("insufficient budget: need {required}, have {available}")]
    InsufficientBudget { required: i64, available: i64 },

    #[error("no actions remaining this turn")]
    NoActionsRemaining,

    #[error("{0} is already hired")]
    AlreadyHired(StaffRole),

    #[error("subsystem is already at or above the requested level")]
    AlreadyAtLevel,

    #[error("region is already hosted")]
    RegionAlreadyHosted,

    #[error("invalid domain: {0:?}")]
    InvalidDomain(String),

    #[error("invalid hub name: {0:?}")]
    InvalidHubName(String),

    #[error("hub setup is not complete")]
    SetupIncomplete,

    #[error("an unresolved event is pending")]
    EventPending,

    #[error("arithmetic overflow: {0}")]
    Overflow(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Validation errors are user-correctable; everything else is internal.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            EngineError::Overflow(_)
                | EngineError::InvariantViolation(_)
                | EngineError::Config(_)
        )
    }
}
