//! Shared error type for the domain layer.
//!
//! Downstream crates wrap [`CoreError`] in their own enums (the API crate
//! maps it onto HTTP status codes).

use uuid::Uuid;

/// Errors produced by domain logic and the deck store.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The referenced entity does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"Deck"` or `"Page"`.
        entity: &'static str,
        /// The id that failed to resolve.
        id: Uuid,
    },

    /// Input failed a validation rule.
    #[error("{0}")]
    Validation(String),

    /// The operation conflicts with the entity's current state.
    #[error("{0}")]
    Conflict(String),

    /// An unexpected internal error.
    #[error("{0}")]
    Internal(String),
}
