//! Core error type.

use thiserror::Error;

pub type LfResult<T> = Result<T, LfError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Cannot parse quantity from '{raw}'")]
    InvalidQuantity { raw: String },
}
