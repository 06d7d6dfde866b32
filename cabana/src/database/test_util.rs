//! Shared helpers for database unit tests.

use tempfile::TempDir;

use super::config::DatabaseConfig;
use super::connection::Database;
use crate::catalog::Money;

/// Creates a fresh database in a temporary directory.
///
/// The directory is leaked for the duration of the test process so the
/// database file outlives this function's scope.
pub(crate) fn create_test_database() -> Database {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.db");
    std::mem::forget(dir);
    Database::open(DatabaseConfig::new(path)).unwrap()
}

/// Seeds a class and one open cabana, returning the cabana id.
pub(crate) fn seed_cabana(db: &Database, name: &str) -> i64 {
    let class = db.create_class("standard", None).unwrap();
    db.create_cabana(name, class.id, None).unwrap().id
}

/// Seeds a product, returning its id.
pub(crate) fn seed_product(db: &Database, name: &str, price: &str) -> i64 {
    let price: Money = price.parse().unwrap();
    db.create_product(name, price).unwrap().id
}
