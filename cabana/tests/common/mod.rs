//! Common test utilities for integration tests.
//!
//! This module provides helper functions and fixtures for testing the
//! cabana library against a real on-disk database.

use std::path::PathBuf;

use cabana::{Database, DatabaseConfig, DateSpan, Money};

/// Creates a test database path in a temporary location.
///
/// The temp directory is leaked so the database file survives for the
/// whole test process; each test gets its own directory.
#[allow(dead_code)]
pub fn create_test_database_path() -> PathBuf {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("test.db");
    // Keep the temp_dir alive by forgetting it - this is a test helper
    std::mem::forget(temp_dir);
    db_path
}

/// Opens a database at the given path, initializing the schema on first
/// open.
#[allow(dead_code)]
pub fn open_database(path: &PathBuf) -> Database {
    Database::open(DatabaseConfig::new(path)).unwrap()
}

/// Parses a half-open date span from two ISO dates.
#[allow(dead_code)]
pub fn span(start: &str, end: &str) -> DateSpan {
    DateSpan::new(start.parse().unwrap(), end.parse().unwrap()).unwrap()
}

/// Parses a decimal money amount.
#[allow(dead_code)]
pub fn money(s: &str) -> Money {
    s.parse().unwrap()
}

/// A seeded venue: one class, one cabana, and a flat 100/night rate over
/// June 2025.
#[allow(dead_code)]
pub struct Venue {
    pub cabana_id: i64,
    pub class_id: i64,
}

/// Seeds the standard test venue into a database.
#[allow(dead_code)]
pub fn seed_venue(db: &Database) -> Venue {
    let class = db.create_class("standard", None).unwrap();
    let cabana = db.create_cabana("C101", class.id, None).unwrap();
    db.add_price_range(
        cabana.id,
        span("2025-06-01", "2025-07-01"),
        money("100"),
        0,
        None,
    )
    .unwrap();
    Venue {
        cabana_id: cabana.id,
        class_id: class.id,
    }
}
