//! Error types for coach-core

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Must be signed in to record an expense")]
    NotSignedIn,

    #[error("Invalid amount: {0} (must be a positive number)")]
    InvalidAmount(f64),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

pub type Result<T> = std::result::Result<T, Error>;
