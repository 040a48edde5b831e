use sea_orm::DbErr;
use thiserror::Error;

/// Business-rule failures surfaced by model operations.
///
/// Callers dispatch on the variant, never on the message text; the message
/// is only what ends up in the response envelope.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Uniqueness violations: duplicate registration, duplicate submission,
    /// duplicate assignment.
    #[error("{0}")]
    Conflict(String),

    /// The state machine refuses the requested transition.
    #[error("{0}")]
    InvalidState(String),

    /// Input out of bounds or an empty payload.
    #[error("{0}")]
    Validation(String),

    /// A registration exists but is not approved.
    #[error("Registration is not approved")]
    NotApproved,

    /// The activity's time window does not contain the current moment.
    #[error("Activity is not currently running")]
    WindowClosed,

    /// A check-in was already recorded for this registration.
    #[error("Attendance already recorded for this activity")]
    AlreadyCheckedIn,

    #[error(transparent)]
    Db(#[from] DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
