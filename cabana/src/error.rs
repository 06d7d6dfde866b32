//! Error types for the cabana library.
//!
//! This module provides a comprehensive error hierarchy for all operations
//! in the cabana library, using `thiserror` for ergonomic error handling.

use chrono::NaiveDate;
use thiserror::Error;

use crate::availability::UnavailableReason;
use crate::reservation::ReservationStatus;

/// Result type alias for operations that may fail with a cabana error.
///
/// # Examples
///
/// ```
/// use cabana::{Error, Result};
///
/// fn example_operation() -> Result<i64> {
///     Ok(42)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the cabana library.
///
/// This enum encompasses all possible error conditions that can occur
/// during reservation and pricing operations. Every domain variant carries
/// enough detail for the caller to act on; only [`Error::Database`] signals
/// infrastructure failure.
#[derive(Debug, Error)]
pub enum Error {
    /// An invalid date span was provided.
    #[error("invalid date span {start}..{end}: {reason}")]
    InvalidDateSpan {
        /// The start date of the invalid span.
        start: NaiveDate,
        /// The end date of the invalid span.
        end: NaiveDate,
        /// The reason the span is invalid.
        reason: String,
    },

    /// One or more nights in the requested span have no price override.
    ///
    /// Pricing fails closed: every unpriced night is collected before the
    /// error is returned, so the whole gap can be fixed in one round trip.
    #[error("no price configured for {} night(s): {}", dates.len(), format_dates(dates))]
    UnpricedDates {
        /// Every night in the span that could not be priced, in order.
        dates: Vec<NaiveDate>,
    },

    /// An extra item referenced a product that does not exist.
    #[error("unknown product {product_id}")]
    UnknownProduct {
        /// The product id that was not found.
        product_id: i64,
    },

    /// The cabana is not bookable for the requested span.
    #[error("cabana unavailable: {}", format_reasons(reasons))]
    Unavailable {
        /// Every violated booking constraint, not just the first.
        reasons: Vec<UnavailableReason>,
    },

    /// A lifecycle event was attempted from a status that does not allow it.
    #[error("invalid transition: cannot {event} a {from} reservation")]
    InvalidTransition {
        /// The reservation status at the time of the attempt.
        from: ReservationStatus,
        /// The attempted lifecycle event.
        event: &'static str,
    },

    /// The actor is not permitted to perform the action.
    #[error("actor {actor_id} is not permitted to {action}")]
    Forbidden {
        /// The actor that attempted the action.
        actor_id: i64,
        /// The action that was denied.
        action: &'static str,
    },

    /// The requested entity was not found.
    #[error("{entity} {id} not found")]
    NotFound {
        /// The kind of entity that was not found.
        entity: &'static str,
        /// The id that was looked up.
        id: i64,
    },

    /// A concurrent transition won the race for the same reservation.
    #[error("conflict: {details}")]
    Conflict {
        /// Details about the lost race.
        details: String,
    },

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A database error occurred.
    ///
    /// This is the only variant treated as fatal to the operation; it
    /// indicates persistence-layer unavailability and is retry-safe (no
    /// partial commit can have occurred).
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database corruption was detected.
    #[error("database corruption detected: {details}")]
    DatabaseCorruption {
        /// Details about the corruption.
        details: String,
    },

    /// An unsupported schema version was encountered.
    #[error("unsupported schema version: expected {expected}, found {found}")]
    UnsupportedSchemaVersion {
        /// The expected schema version.
        expected: i32,
        /// The schema version found in the database.
        found: i32,
    },
}

fn format_dates(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_reasons(reasons: &[UnavailableReason]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<crate::span::InvalidDateSpanError> for Error {
    fn from(err: crate::span::InvalidDateSpanError) -> Self {
        Self::InvalidDateSpan {
            start: err.start,
            end: err.end,
            reason: err.reason,
        }
    }
}

impl From<crate::reservation::ValidationError> for Error {
    fn from(err: crate::reservation::ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl Error {
    /// Check if error indicates an entity was not found.
    ///
    /// # Examples
    ///
    /// ```
    /// use cabana::Error;
    ///
    /// let err = Error::NotFound { entity: "reservation", id: 7 };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if error indicates a lost optimistic-concurrency race.
    ///
    /// Callers receiving a conflict should re-read and retry; the losing
    /// transition was rolled back in full.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
