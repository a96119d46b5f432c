use std::collections::BTreeMap;

use thiserror::Error;

/// Error taxonomy for the entity store and its guards.
///
/// Handlers map these onto HTTP statuses; the library itself never
/// talks about status codes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// One or more request fields failed type validation. The map holds
    /// every failing field so a client sees all problems at once.
    #[error("validation failed")]
    Validation(BTreeMap<String, String>),

    /// Entity absent, or present but owned by another user. The two cases
    /// are deliberately indistinguishable.
    #[error("{0}")]
    NotFound(String),

    /// A row referenced by id does not exist where it must.
    #[error("{0}")]
    InvalidReference(String),

    /// A recorded actual points at a target row from a different plan
    /// than its session's plan.
    #[error("Exercise and session must belong to the same workout plan.")]
    CrossPlanMismatch,

    /// Signup against an email that is already registered.
    #[error("User already exists. Please login.")]
    EmailTaken,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        StoreError::NotFound(what.into())
    }

    pub fn invalid_reference(what: impl Into<String>) -> Self {
        StoreError::InvalidReference(what.into())
    }
}
