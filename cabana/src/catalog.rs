//! Catalog entities: cabanas, classes, concepts, products, and price sources.
//!
//! Catalog entities are read-only inputs to this core. The lifecycle never
//! mutates them; admin CRUD for the catalog lives in the surrounding
//! service. Archived entities carry an explicit flag and every core query
//! filters on it explicitly rather than through query interception.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::span::DateSpan;

/// Monetary amount with fixed-point decimal semantics.
///
/// All pricing arithmetic uses `Decimal` so multi-night sums never
/// accumulate binary floating-point drift.
pub type Money = Decimal;

/// Operational status of a cabana.
///
/// Mutable, and independent of the `open_for_reservation` flag: a cabana may
/// be marked `Reserved` for display while still accepting future spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CabanaStatus {
    /// The cabana is free for walk-up use.
    Available,
    /// The cabana is currently held by a reservation.
    Reserved,
    /// The cabana is closed for operations.
    Closed,
}

impl CabanaStatus {
    /// Returns the database text code for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Reserved => "RESERVED",
            Self::Closed => "CLOSED",
        }
    }

    /// Parses a database text code.
    ///
    /// # Errors
    ///
    /// Returns the unrecognized text so storage-layer corruption surfaces
    /// instead of defaulting silently.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "AVAILABLE" => Ok(Self::Available),
            "RESERVED" => Ok(Self::Reserved),
            "CLOSED" => Ok(Self::Closed),
            other => Err(format!("unknown cabana status: {other}")),
        }
    }
}

impl fmt::Display for CabanaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A class of structurally-identical cabanas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabanaClass {
    /// The class id.
    pub id: i64,
    /// The class name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// A bundled package of extra products and a flat service fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// The concept id.
    pub id: i64,
    /// The concept name.
    pub name: String,
    /// Flat service fee charged once per stay, not per night.
    pub service_fee: Money,
    /// Optional cabana class the concept is tied to.
    pub class_id: Option<i64>,
}

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// The product id.
    pub id: i64,
    /// The product name.
    pub name: String,
    /// Catalog sale price, used when no concept override exists.
    pub sale_price: Money,
}

/// A bookable physical cabana.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cabana {
    /// The cabana id.
    pub id: i64,
    /// Display name, e.g. "C101".
    pub name: String,
    /// The class this cabana belongs to.
    pub class_id: i64,
    /// Optional concept associated with this cabana.
    pub concept_id: Option<i64>,
    /// Operational status.
    pub status: CabanaStatus,
    /// Whether new reservations are accepted, independent of status.
    pub open_for_reservation: bool,
}

/// A point price override: one exact day for one cabana.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// The override id.
    pub id: i64,
    /// The cabana the override applies to.
    pub cabana_id: i64,
    /// The day being overridden.
    pub day: NaiveDate,
    /// The exact daily price for that day.
    pub price: Money,
}

/// A range price override: a daily price across `[start, end)`.
///
/// Ranges for one cabana may overlap. For any given day the range with the
/// highest `priority` wins; on a priority tie the most recently created
/// range wins (ids are monotone, so `id` is the recency tie-break).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// The override id. Ids increase with creation order.
    pub id: i64,
    /// The cabana the override applies to.
    pub cabana_id: i64,
    /// The covered span.
    pub span: DateSpan,
    /// The daily price inside the span.
    pub price: Money,
    /// Numeric priority; higher values win.
    pub priority: i64,
    /// Optional label, e.g. "high season".
    pub label: Option<String>,
}

/// A window during which booking is disallowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blackout {
    /// The blackout id.
    pub id: i64,
    /// The cabana the blackout is scoped to; `None` applies venue-wide.
    pub cabana_id: Option<i64>,
    /// The blocked span.
    pub span: DateSpan,
    /// The stated reason for the blackout.
    pub reason: String,
}
