//! The module contains the error the engine can throw.
//!
//! Every expected business failure has its own variant so callers can react
//! to it without string matching:
//!
//! - [`Overbooked`] when a reservation does not fit the remaining capacity.
//! - [`IllegalTransition`] when a booking action is not allowed from its
//!   current status.
//! - [`AmountMismatch`] when a payment notification disagrees with the stored
//!   booking.
//!
//!  [`Overbooked`]: EngineError::Overbooked
//!  [`IllegalTransition`]: EngineError::IllegalTransition
//!  [`AmountMismatch`]: EngineError::AmountMismatch
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Overbooked: available {available} of {capacity}")]
    Overbooked { available: i64, capacity: i64 },
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Outside operating hours: {0}")]
    OutsideHours(String),
    #[error("Already processed: {0}")]
    IllegalTransition(String),
    #[error("Payment rejected")]
    AmountMismatch(String),
    #[error("Amount below minimum: {0}")]
    BelowMinimum(String),
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),
    #[error("Too many requests: {0}")]
    RateLimited(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Overbooked {
                    available: a,
                    capacity: c,
                },
                Self::Overbooked {
                    available: b,
                    capacity: d,
                },
            ) => a == b && c == d,
            (Self::InvalidQuantity(a), Self::InvalidQuantity(b)) => a == b,
            (Self::OutsideHours(a), Self::OutsideHours(b)) => a == b,
            (Self::IllegalTransition(a), Self::IllegalTransition(b)) => a == b,
            (Self::AmountMismatch(a), Self::AmountMismatch(b)) => a == b,
            (Self::BelowMinimum(a), Self::BelowMinimum(b)) => a == b,
            (Self::InsufficientBalance(a), Self::InsufficientBalance(b)) => a == b,
            (Self::RateLimited(a), Self::RateLimited(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
