#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # cabana
//!
//! The reservation core for a hospitality venue: a guarded reservation
//! lifecycle state machine, a date-range pricing engine, and an
//! availability checker over bookable cabanas.
//!
//! Reservations move through a closed status set via one guarded entry
//! point per event; every transition commits atomically with its
//! append-only history record, and pricing fails closed on any night
//! without a configured rate.
//!
//! ## Core Types
//!
//! - [`DateSpan`]: half-open `[start, end)` stay spans
//! - [`Reservation`] and [`ReservationStatus`]: the lifecycle entity
//! - [`Lifecycle`]: the transition driver
//! - [`PricingSnapshot`] and [`PriceBreakdown`]: the pricing engine
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```
//! use cabana::DateSpan;
//!
//! let span = DateSpan::new(
//!     "2025-06-10".parse().unwrap(),
//!     "2025-06-13".parse().unwrap(),
//! )
//! .unwrap();
//! assert_eq!(span.nights(), 3);
//! ```

pub mod actor;
pub mod availability;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod lifecycle;
pub mod pricing;
pub mod reservation;
pub mod span;

// Re-export key types at crate root for convenience
pub use actor::{Actor, Role};
pub use availability::UnavailableReason;
pub use catalog::{
    Blackout, Cabana, CabanaClass, CabanaStatus, Concept, Money, PricePoint, PriceRange, Product,
};
pub use config::CoreConfig;
pub use database::{Database, DatabaseConfig};
pub use error::{Error, Result};
pub use lifecycle::{EffectSink, Lifecycle, LogSink, SideEffect};
pub use pricing::{ExtraLine, NightLine, PriceBreakdown, PriceCalendar, PricingSnapshot};
pub use reservation::{
    CancellationRequest, ExtraItem, ExtraRequest, RequestStatus, Reservation, ReservationStatus,
    StatusRecord,
};
pub use span::DateSpan;
