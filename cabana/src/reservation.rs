//! Reservation types: lifecycle status, the reservation entity, status
//! history, and the two guest-initiated modification requests.
//!
//! Reservations are created in `Pending` status and mutated only through
//! lifecycle transitions, never by direct field edits. Cancellation is a
//! terminal status, not a row removal.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Money;
use crate::span::DateSpan;

/// The closed set of reservation lifecycle statuses.
///
/// Statuses are stored as TEXT codes and parsed exhaustively; unknown text
/// in storage is an error, never a silently-open string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    /// Awaiting admin review.
    Pending,
    /// Approved and occupying the cabana's calendar.
    Approved,
    /// Rejected by an admin. Terminal.
    Rejected,
    /// A cancellation request is awaiting resolution.
    ModificationPending,
    /// An extra-items request is awaiting resolution.
    ExtraPending,
    /// The guest has checked in.
    CheckedIn,
    /// The guest has checked out. Terminal.
    CheckedOut,
    /// Cancelled on guest request. Terminal.
    Cancelled,
}

impl ReservationStatus {
    /// Returns the database text code for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::ModificationPending => "MODIFICATION_PENDING",
            Self::ExtraPending => "EXTRA_PENDING",
            Self::CheckedIn => "CHECKED_IN",
            Self::CheckedOut => "CHECKED_OUT",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a database text code.
    ///
    /// # Errors
    ///
    /// Returns the unrecognized text.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "MODIFICATION_PENDING" => Ok(Self::ModificationPending),
            "EXTRA_PENDING" => Ok(Self::ExtraPending),
            "CHECKED_IN" => Ok(Self::CheckedIn),
            "CHECKED_OUT" => Ok(Self::CheckedOut),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(format!("unknown reservation status: {other}")),
        }
    }

    /// Returns `true` if no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::CheckedOut | Self::Cancelled)
    }

    /// Returns `true` if the status reserves the cabana's calendar.
    ///
    /// Occupying reservations are what the availability overlap test is
    /// checked against.
    #[must_use]
    pub const fn is_occupying(self) -> bool {
        matches!(
            self,
            Self::Approved | Self::CheckedIn | Self::ModificationPending | Self::ExtraPending
        )
    }

    /// Returns every status in the occupying set.
    #[must_use]
    pub const fn occupying() -> [Self; 4] {
        [
            Self::Approved,
            Self::CheckedIn,
            Self::ModificationPending,
            Self::ExtraPending,
        ]
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A cabana reservation.
///
/// `total_price` is a snapshot stamped by the pricing engine at the
/// transition that set it (approval, or extras resolution); it is never
/// recomputed implicitly afterwards.
///
/// # Examples
///
/// ```
/// use cabana::{DateSpan, Reservation};
///
/// let span = DateSpan::new(
///     "2025-06-10".parse().unwrap(),
///     "2025-06-13".parse().unwrap(),
/// ).unwrap();
///
/// let reservation = Reservation::builder(1, 42, "Ada Lovelace", span)
///     .build()
///     .unwrap();
/// assert_eq!(reservation.guest_name(), "Ada Lovelace");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    id: i64,
    cabana_id: i64,
    user_id: i64,
    guest_name: String,
    span: DateSpan,
    status: ReservationStatus,
    total_price: Option<Money>,
    check_in_at: Option<DateTime<Utc>>,
    checked_in_by: Option<i64>,
    check_out_at: Option<DateTime<Utc>>,
    checked_out_by: Option<i64>,
    created_at: DateTime<Utc>,
}

impl Reservation {
    /// Creates a new reservation builder.
    ///
    /// The id is 0 until the row is persisted; the database layer rebuilds
    /// the entity with its assigned rowid.
    #[must_use]
    pub fn builder(
        cabana_id: i64,
        user_id: i64,
        guest_name: impl Into<String>,
        span: DateSpan,
    ) -> ReservationBuilder {
        ReservationBuilder {
            id: 0,
            cabana_id,
            user_id,
            guest_name: guest_name.into(),
            span,
            status: ReservationStatus::Pending,
            total_price: None,
            check_in_at: None,
            checked_in_by: None,
            check_out_at: None,
            checked_out_by: None,
            created_at: None,
        }
    }

    /// Returns the reservation id.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Returns the owning cabana id.
    #[must_use]
    pub const fn cabana_id(&self) -> i64 {
        self.cabana_id
    }

    /// Returns the owning user id.
    #[must_use]
    pub const fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Returns the guest name.
    #[must_use]
    pub fn guest_name(&self) -> &str {
        &self.guest_name
    }

    /// Returns the stay span.
    #[must_use]
    pub const fn span(&self) -> DateSpan {
        self.span
    }

    /// Returns the current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ReservationStatus {
        self.status
    }

    /// Returns the stamped total price, if one has been computed.
    #[must_use]
    pub const fn total_price(&self) -> Option<Money> {
        self.total_price
    }

    /// Returns the check-in timestamp, if checked in.
    #[must_use]
    pub const fn check_in_at(&self) -> Option<DateTime<Utc>> {
        self.check_in_at
    }

    /// Returns the admin who performed check-in.
    #[must_use]
    pub const fn checked_in_by(&self) -> Option<i64> {
        self.checked_in_by
    }

    /// Returns the check-out timestamp, if checked out.
    #[must_use]
    pub const fn check_out_at(&self) -> Option<DateTime<Utc>> {
        self.check_out_at
    }

    /// Returns the admin who performed check-out.
    #[must_use]
    pub const fn checked_out_by(&self) -> Option<i64> {
        self.checked_out_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `true` if the given user owns this reservation.
    #[must_use]
    pub const fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

/// Builder for creating `Reservation` instances.
#[derive(Debug)]
pub struct ReservationBuilder {
    id: i64,
    cabana_id: i64,
    user_id: i64,
    guest_name: String,
    span: DateSpan,
    status: ReservationStatus,
    total_price: Option<Money>,
    check_in_at: Option<DateTime<Utc>>,
    checked_in_by: Option<i64>,
    check_out_at: Option<DateTime<Utc>>,
    checked_out_by: Option<i64>,
    created_at: Option<DateTime<Utc>>,
}

impl ReservationBuilder {
    /// Sets the reservation id (used when rebuilding from storage).
    #[must_use]
    pub const fn id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Sets the status (used when rebuilding from storage).
    #[must_use]
    pub const fn status(mut self, status: ReservationStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the stamped total price.
    #[must_use]
    pub const fn total_price(mut self, price: Option<Money>) -> Self {
        self.total_price = price;
        self
    }

    /// Sets the check-in audit fields.
    #[must_use]
    pub const fn checked_in(mut self, at: Option<DateTime<Utc>>, by: Option<i64>) -> Self {
        self.check_in_at = at;
        self.checked_in_by = by;
        self
    }

    /// Sets the check-out audit fields.
    #[must_use]
    pub const fn checked_out(mut self, at: Option<DateTime<Utc>>, by: Option<i64>) -> Self {
        self.check_out_at = at;
        self.checked_out_by = by;
        self
    }

    /// Sets the creation timestamp.
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Builds the reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the guest name is empty after trimming.
    pub fn build(self) -> Result<Reservation, ValidationError> {
        let guest_name = self.guest_name.trim().to_string();
        if guest_name.is_empty() {
            return Err(ValidationError {
                field: "guest_name".into(),
                message: "guest name must be non-empty after trimming whitespace".into(),
            });
        }

        Ok(Reservation {
            id: self.id,
            cabana_id: self.cabana_id,
            user_id: self.user_id,
            guest_name,
            span: self.span,
            status: self.status,
            total_price: self.total_price,
            check_in_at: self.check_in_at,
            checked_in_by: self.checked_in_by,
            check_out_at: self.check_out_at,
            checked_out_by: self.checked_out_by,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        })
    }
}

/// One immutable record in a reservation's status history.
///
/// The history is strictly append-only and is the authoritative audit trail
/// for lifecycle transitions, independent of any general audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// The record id.
    pub id: i64,
    /// The reservation this record belongs to.
    pub reservation_id: i64,
    /// The status before the transition; `None` for creation.
    pub from_status: Option<ReservationStatus>,
    /// The status after the transition.
    pub to_status: ReservationStatus,
    /// The actor who drove the transition.
    pub actor_id: i64,
    /// An optional reason, e.g. the cancellation reason.
    pub reason: Option<String>,
    /// When the transition committed.
    pub recorded_at: DateTime<Utc>,
}

/// Sub-status of a cancellation or extra-items request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Awaiting admin resolution.
    Pending,
    /// Approved by an admin.
    Approved,
    /// Rejected by an admin.
    Rejected,
}

impl RequestStatus {
    /// Returns the database text code for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Parses a database text code.
    ///
    /// # Errors
    ///
    /// Returns the unrecognized text.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(format!("unknown request status: {other}")),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A guest's request to cancel an approved reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationRequest {
    /// The request id.
    pub id: i64,
    /// The reservation being cancelled.
    pub reservation_id: i64,
    /// The requesting user.
    pub requested_by: i64,
    /// The stated reason; always non-empty.
    pub reason: String,
    /// The request sub-status.
    pub status: RequestStatus,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request was resolved, if it has been.
    pub resolved_at: Option<DateTime<Utc>>,
    /// The admin who resolved the request.
    pub resolved_by: Option<i64>,
}

/// A guest's request to add extra items to an approved reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraRequest {
    /// The request id.
    pub id: i64,
    /// The reservation the extras are for.
    pub reservation_id: i64,
    /// The requesting user.
    pub requested_by: i64,
    /// The requested items; always at least one.
    pub items: Vec<ExtraItem>,
    /// The request sub-status.
    pub status: RequestStatus,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request was resolved, if it has been.
    pub resolved_at: Option<DateTime<Utc>>,
    /// The admin who resolved the request.
    pub resolved_by: Option<i64>,
}

/// One requested extra item: a product and a positive quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraItem {
    /// The product id.
    pub product_id: i64,
    /// The requested quantity.
    pub quantity: u32,
}

impl ExtraItem {
    /// Creates a new extra item.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is zero.
    pub fn new(product_id: i64, quantity: u32) -> Result<Self, ValidationError> {
        if quantity == 0 {
            return Err(ValidationError {
                field: "quantity".into(),
                message: format!("quantity for product {product_id} must be a positive integer"),
            });
        }
        Ok(Self {
            product_id,
            quantity,
        })
    }
}

/// Error type for validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// A description of the validation failure.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}
