//! SQLite-backed storage for the reservation core.
//!
//! The database opens in WAL mode with a busy timeout so concurrent
//! processes block briefly instead of failing, and every lifecycle write
//! runs inside an IMMEDIATE transaction. Schema versioning is checked on
//! open; an empty database is initialized in place.

mod catalog;
mod codec;
mod config;
mod connection;
pub mod migrations;
mod operations;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_util;

pub use config::DatabaseConfig;
pub use connection::Database;
pub use schema::CURRENT_SCHEMA_VERSION;

pub(crate) use catalog::{blackouts_for, load_pricing_snapshot, require_cabana};
pub(crate) use operations::{
    append_history, get_cancellation_request, get_extra_request, insert_cancellation_request,
    insert_extra_items, insert_extra_request, insert_reservation, load_extra_items,
    load_extra_lines, occupying_spans, require_reservation, resolve_cancellation_request, resolve_extra_request,
    set_total_price, stamp_check_in, stamp_check_out, update_status_checked,
};
