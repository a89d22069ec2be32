//! Error types for scalargrad

use crate::engine::ValueType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Division by zero: {numerator} / 0")]
    DivisionByZero { numerator: ValueType },

    #[error("Domain error: `{op}` is undefined or not differentiable at {args:?}")]
    DomainError {
        op: &'static str,
        args: Vec<ValueType>,
    },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Invalid gradient clip range: [{min}, {max}]")]
    InvalidClipRange { min: ValueType, max: ValueType },

    #[error("Dimension mismatch: expected {expected} inputs, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
