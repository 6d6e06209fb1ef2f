//! Shared error types for the services crate.

use thiserror::Error;

/// Errors surfaced by the navigation state machine.
///
/// Everything below this level is contained at lab granularity: fetch and
/// parse failures degrade the affected lab instead of propagating.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NavigationError {
    /// The requested lab id is unknown to the store. The navigation state
    /// is left unchanged.
    #[error("lab not found: {0}")]
    NotFound(String),
}
