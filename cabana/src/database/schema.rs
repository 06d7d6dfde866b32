//! Database schema definitions and SQL constants.
//!
//! This module contains all SQL table definitions, indices, and constants
//! related to the database schema for the cabana reservation system.
//!
//! Dates are stored as ISO-8601 TEXT (`YYYY-MM-DD` for days, RFC 3339 for
//! timestamps) and money as decimal TEXT, so rows stay readable and the
//! fixed-point semantics survive storage.

/// Current schema version for the database.
///
/// This version is stored in the metadata table and is used to ensure
/// compatibility between the database and the application.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// SQL statement to create the metadata table.
pub const CREATE_METADATA_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )";

/// SQL statement to create the cabana classes table.
pub const CREATE_CLASSES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS cabana_classes (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        archived INTEGER NOT NULL DEFAULT 0
    )";

/// SQL statement to create the concepts table.
pub const CREATE_CONCEPTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS concepts (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        service_fee TEXT NOT NULL,
        class_id INTEGER REFERENCES cabana_classes(id),
        archived INTEGER NOT NULL DEFAULT 0
    )";

/// SQL statement to create the products table.
pub const CREATE_PRODUCTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        sale_price TEXT NOT NULL,
        archived INTEGER NOT NULL DEFAULT 0
    )";

/// SQL statement to create the per-concept product price overrides table.
pub const CREATE_CONCEPT_PRICES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS concept_prices (
        concept_id INTEGER NOT NULL REFERENCES concepts(id),
        product_id INTEGER NOT NULL REFERENCES products(id),
        price TEXT NOT NULL,
        PRIMARY KEY (concept_id, product_id)
    )";

/// SQL statement to create the cabanas table.
pub const CREATE_CABANAS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS cabanas (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        class_id INTEGER NOT NULL REFERENCES cabana_classes(id),
        concept_id INTEGER REFERENCES concepts(id),
        status TEXT NOT NULL DEFAULT 'AVAILABLE',
        open_for_reservation INTEGER NOT NULL DEFAULT 1,
        archived INTEGER NOT NULL DEFAULT 0
    )";

/// SQL statement to create the point price overrides table.
///
/// One exact day mapped to one exact daily price per cabana.
pub const CREATE_PRICE_POINTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS price_points (
        id INTEGER PRIMARY KEY,
        cabana_id INTEGER NOT NULL REFERENCES cabanas(id),
        day TEXT NOT NULL,
        price TEXT NOT NULL,
        UNIQUE (cabana_id, day)
    )";

/// SQL statement to create the range price overrides table.
///
/// Ranges are half-open `[start_day, end_day)` and may overlap; ids are
/// monotone and serve as the recency tie-break on equal priority.
pub const CREATE_PRICE_RANGES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS price_ranges (
        id INTEGER PRIMARY KEY,
        cabana_id INTEGER NOT NULL REFERENCES cabanas(id),
        start_day TEXT NOT NULL,
        end_day TEXT NOT NULL,
        price TEXT NOT NULL,
        priority INTEGER NOT NULL DEFAULT 0,
        label TEXT
    )";

/// SQL statement to create the blackout windows table.
///
/// A NULL `cabana_id` applies the window venue-wide.
pub const CREATE_BLACKOUTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS blackouts (
        id INTEGER PRIMARY KEY,
        cabana_id INTEGER REFERENCES cabanas(id),
        start_day TEXT NOT NULL,
        end_day TEXT NOT NULL,
        reason TEXT NOT NULL
    )";

/// SQL statement to create the reservations table.
///
/// Reservations are never physically deleted; cancellation is a terminal
/// status, not a row removal.
pub const CREATE_RESERVATIONS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS reservations (
        id INTEGER PRIMARY KEY,
        cabana_id INTEGER NOT NULL REFERENCES cabanas(id),
        user_id INTEGER NOT NULL,
        guest_name TEXT NOT NULL,
        start_day TEXT NOT NULL,
        end_day TEXT NOT NULL,
        status TEXT NOT NULL,
        total_price TEXT,
        check_in_at TEXT,
        checked_in_by INTEGER,
        check_out_at TEXT,
        checked_out_by INTEGER,
        created_at TEXT NOT NULL
    )";

/// SQL statement to create the status history table.
///
/// Rows are append-only: nothing in the core issues UPDATE or DELETE
/// against this table.
pub const CREATE_STATUS_HISTORY_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS status_history (
        id INTEGER PRIMARY KEY,
        reservation_id INTEGER NOT NULL REFERENCES reservations(id),
        from_status TEXT,
        to_status TEXT NOT NULL,
        actor_id INTEGER NOT NULL,
        reason TEXT,
        recorded_at TEXT NOT NULL
    )";

/// SQL statement to create the cancellation requests table.
pub const CREATE_CANCELLATION_REQUESTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS cancellation_requests (
        id INTEGER PRIMARY KEY,
        reservation_id INTEGER NOT NULL REFERENCES reservations(id),
        requested_by INTEGER NOT NULL,
        reason TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'PENDING',
        created_at TEXT NOT NULL,
        resolved_at TEXT,
        resolved_by INTEGER
    )";

/// SQL statement to create the extra-items requests table.
pub const CREATE_EXTRA_REQUESTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS extra_requests (
        id INTEGER PRIMARY KEY,
        reservation_id INTEGER NOT NULL REFERENCES reservations(id),
        requested_by INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'PENDING',
        created_at TEXT NOT NULL,
        resolved_at TEXT,
        resolved_by INTEGER
    )";

/// SQL statement to create the requested-items child table.
pub const CREATE_EXTRA_REQUEST_ITEMS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS extra_request_items (
        id INTEGER PRIMARY KEY,
        request_id INTEGER NOT NULL REFERENCES extra_requests(id),
        product_id INTEGER NOT NULL REFERENCES products(id),
        quantity INTEGER NOT NULL
    )";

/// SQL statement to create the approved extra items table.
///
/// Unit prices are persisted at approval time so a later catalog change
/// never silently alters a stamped total.
pub const CREATE_EXTRA_ITEMS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS extra_items (
        id INTEGER PRIMARY KEY,
        reservation_id INTEGER NOT NULL REFERENCES reservations(id),
        product_id INTEGER NOT NULL REFERENCES products(id),
        quantity INTEGER NOT NULL,
        unit_price TEXT NOT NULL
    )";

/// Index speeding up the availability overlap query.
pub const CREATE_RESERVATION_CABANA_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_reservations_cabana_status
    ON reservations(cabana_id, status)";

/// Index speeding up per-user reservation listings.
pub const CREATE_RESERVATION_USER_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_reservations_user ON reservations(user_id)";

/// Index speeding up history reads per reservation.
pub const CREATE_HISTORY_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_status_history_reservation
    ON status_history(reservation_id)";

/// Index speeding up calendar loads per cabana.
pub const CREATE_PRICE_RANGE_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_price_ranges_cabana ON price_ranges(cabana_id)";

/// SQL statement to select the schema version from the metadata table.
pub const SELECT_SCHEMA_VERSION: &str = "SELECT value FROM metadata WHERE key = 'schema_version'";

/// SQL statement to insert or update the schema version in the metadata table.
pub const INSERT_SCHEMA_VERSION: &str =
    "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)";

/// Every CREATE statement, in dependency order.
pub const ALL_TABLES: &[&str] = &[
    CREATE_METADATA_TABLE,
    CREATE_CLASSES_TABLE,
    CREATE_CONCEPTS_TABLE,
    CREATE_PRODUCTS_TABLE,
    CREATE_CONCEPT_PRICES_TABLE,
    CREATE_CABANAS_TABLE,
    CREATE_PRICE_POINTS_TABLE,
    CREATE_PRICE_RANGES_TABLE,
    CREATE_BLACKOUTS_TABLE,
    CREATE_RESERVATIONS_TABLE,
    CREATE_STATUS_HISTORY_TABLE,
    CREATE_CANCELLATION_REQUESTS_TABLE,
    CREATE_EXTRA_REQUESTS_TABLE,
    CREATE_EXTRA_REQUEST_ITEMS_TABLE,
    CREATE_EXTRA_ITEMS_TABLE,
];

/// Every index CREATE statement.
pub const ALL_INDICES: &[&str] = &[
    CREATE_RESERVATION_CABANA_INDEX,
    CREATE_RESERVATION_USER_INDEX,
    CREATE_HISTORY_INDEX,
    CREATE_PRICE_RANGE_INDEX,
];
