//! Errors from caller-side request validation.

use thiserror::Error;

/// A request the backend would turn away.
///
/// Produced only by the `validate` helpers on the request models; the
/// update calls themselves never validate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("phone must not be empty")]
    MissingPhone,

    #[error("password must not be empty")]
    MissingPassword,

    /// An amount that is not a finite number.
    #[error("{field} is not a finite number")]
    NotANumber { field: &'static str },

    #[error("{field} must not be negative")]
    NegativeAmount { field: &'static str },

    /// More than two digits after the decimal point.
    #[error("{field} allows at most 2 decimal places")]
    TooManyDecimals { field: &'static str },

    /// The backend binds `pointAmount` as required, so zero is rejected.
    #[error("pointAmount is required")]
    MissingPointAmount,

    #[error("pointAmount must not be negative")]
    NegativePoints,

    #[error("pointAmount must be a multiple of 5, got {0}")]
    PointsNotMultipleOfFive(i64),
}
