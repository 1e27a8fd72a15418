// Valuation engine: package bonus curves, QB premiums, package value totals.

pub mod curve;
pub mod package;
pub mod premium;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Precondition failures of the valuation and matching functions.
///
/// Zero matches is never an error; these only fire when the caller hands in
/// input that would otherwise produce a misleading number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValuationError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("assets span more than one owner: {owners:?}")]
    InconsistentOwner { owners: Vec<String> },

    #[error("unknown asset id: {id}")]
    UnknownAsset { id: String },

    #[error("duplicate asset id in pool: {id}")]
    DuplicateAsset { id: String },
}

impl ValuationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ValuationError::InvalidInput {
            message: message.into(),
        }
    }
}
