//! The module contains the error the engine can throw.
//!
//! Variants map one-to-one onto HTTP status buckets in the server crate:
//! invalid input, missing credentials and duplicate emails surface as 400,
//! authentication failures as 401, admin violations as 403, missing rows as
//! 404, unreachable exchange rates as 400, database failures as 500.
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("unable to convert from {from} to {to}")]
    RateUnavailable { from: String, to: String },
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Invalid(a), Self::Invalid(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (
                Self::RateUnavailable { from: a, to: b },
                Self::RateUnavailable { from: c, to: d },
            ) => a == c && b == d,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
