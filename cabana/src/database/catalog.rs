//! Database operations for the catalog: cabanas, classes, concepts,
//! products, price sources, and blackout windows.
//!
//! Every read filters archived rows with an explicit `archived = 0`
//! predicate in the query text. Nothing here intercepts or rewrites
//! queries; what you read in the SQL is what runs.

use rusqlite::{params, Connection, OptionalExtension};

use crate::catalog::{
    Blackout, Cabana, CabanaClass, CabanaStatus, Concept, Money, PricePoint, PriceRange, Product,
};
use crate::error::{Error, Result};
use crate::pricing::{PriceCalendar, PricingSnapshot};
use crate::span::DateSpan;

use super::codec::{day_from_sql, day_to_sql, money_from_sql, money_to_sql, span_from_sql};
use super::connection::Database;

const SELECT_CABANA: &str = r"
    SELECT id, name, class_id, concept_id, status, open_for_reservation
    FROM cabanas
    WHERE id = ? AND archived = 0
";

const SELECT_CABANAS: &str = r"
    SELECT id, name, class_id, concept_id, status, open_for_reservation
    FROM cabanas
    WHERE archived = 0
    ORDER BY id
";

const SELECT_CLASS: &str = r"
    SELECT id, name, description FROM cabana_classes WHERE id = ? AND archived = 0
";

const SELECT_CONCEPT: &str = r"
    SELECT id, name, service_fee, class_id FROM concepts WHERE id = ? AND archived = 0
";

const SELECT_PRODUCTS: &str = r"
    SELECT id, name, sale_price FROM products WHERE archived = 0
";

const SELECT_CONCEPT_PRICES: &str = r"
    SELECT product_id, price FROM concept_prices WHERE concept_id = ?
";

const SELECT_PRICE_POINTS: &str = r"
    SELECT id, cabana_id, day, price
    FROM price_points
    WHERE cabana_id = ?1 AND day >= ?2 AND day < ?3
";

const SELECT_PRICE_RANGES: &str = r"
    SELECT id, cabana_id, start_day, end_day, price, priority, label
    FROM price_ranges
    WHERE cabana_id = ?1 AND start_day < ?3 AND end_day > ?2
";

const SELECT_BLACKOUTS: &str = r"
    SELECT id, cabana_id, start_day, end_day, reason
    FROM blackouts
    WHERE cabana_id = ? OR cabana_id IS NULL
";

fn row_to_cabana(row: &rusqlite::Row<'_>) -> rusqlite::Result<Cabana> {
    let status: String = row.get(4)?;
    Ok(Cabana {
        id: row.get(0)?,
        name: row.get(1)?,
        class_id: row.get(2)?,
        concept_id: row.get(3)?,
        status: CabanaStatus::parse(&status)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(e.into()))?,
        open_for_reservation: row.get(5)?,
    })
}

fn row_to_price_point(row: &rusqlite::Row<'_>) -> rusqlite::Result<PricePoint> {
    let day: String = row.get(2)?;
    let price: String = row.get(3)?;
    Ok(PricePoint {
        id: row.get(0)?,
        cabana_id: row.get(1)?,
        day: day_from_sql(&day)?,
        price: money_from_sql(&price)?,
    })
}

fn row_to_price_range(row: &rusqlite::Row<'_>) -> rusqlite::Result<PriceRange> {
    let start: String = row.get(2)?;
    let end: String = row.get(3)?;
    let price: String = row.get(4)?;
    Ok(PriceRange {
        id: row.get(0)?,
        cabana_id: row.get(1)?,
        span: span_from_sql(&start, &end)?,
        price: money_from_sql(&price)?,
        priority: row.get(5)?,
        label: row.get(6)?,
    })
}

fn row_to_blackout(row: &rusqlite::Row<'_>) -> rusqlite::Result<Blackout> {
    let start: String = row.get(2)?;
    let end: String = row.get(3)?;
    Ok(Blackout {
        id: row.get(0)?,
        cabana_id: row.get(1)?,
        span: span_from_sql(&start, &end)?,
        reason: row.get(4)?,
    })
}

/// Looks up a non-archived cabana by id.
pub(crate) fn get_cabana(conn: &Connection, id: i64) -> Result<Option<Cabana>> {
    conn.query_row(SELECT_CABANA, [id], row_to_cabana)
        .optional()
        .map_err(Error::from)
}

/// Looks up a cabana, failing with `NotFound` when absent or archived.
pub(crate) fn require_cabana(conn: &Connection, id: i64) -> Result<Cabana> {
    get_cabana(conn, id)?.ok_or(Error::NotFound {
        entity: "cabana",
        id,
    })
}

/// Loads the blackout windows relevant to a cabana, including venue-wide
/// windows.
pub(crate) fn blackouts_for(conn: &Connection, cabana_id: i64) -> Result<Vec<Blackout>> {
    let mut stmt = conn.prepare(SELECT_BLACKOUTS)?;
    let rows = stmt.query_map([cabana_id], row_to_blackout)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
}

/// Loads the price calendar for a cabana, restricted to overrides that can
/// touch the given span.
pub(crate) fn load_calendar(
    conn: &Connection,
    cabana_id: i64,
    span: DateSpan,
) -> Result<PriceCalendar> {
    let start = day_to_sql(span.start());
    let end = day_to_sql(span.end());

    let mut stmt = conn.prepare(SELECT_PRICE_POINTS)?;
    let points = stmt
        .query_map(params![cabana_id, start, end], row_to_price_point)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(SELECT_PRICE_RANGES)?;
    let ranges = stmt
        .query_map(params![cabana_id, start, end], row_to_price_range)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(PriceCalendar::new(points, ranges))
}

/// Loads everything the pricing engine needs to price one stay.
///
/// The snapshot is self-contained: once loaded, pricing runs without
/// further database access, so the calculation stays deterministic over
/// its inputs.
pub(crate) fn load_pricing_snapshot(
    conn: &Connection,
    cabana_id: i64,
    concept_id: Option<i64>,
    span: DateSpan,
) -> Result<PricingSnapshot> {
    let calendar = load_calendar(conn, cabana_id, span)?;

    let concept = match concept_id {
        Some(id) => Some(
            conn.query_row(SELECT_CONCEPT, [id], |row| {
                let fee: String = row.get(2)?;
                Ok(Concept {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    service_fee: money_from_sql(&fee)?,
                    class_id: row.get(3)?,
                })
            })
            .optional()?
            .ok_or(Error::NotFound {
                entity: "concept",
                id,
            })?,
        ),
        None => None,
    };

    let concept_prices = match concept_id {
        Some(id) => {
            let mut stmt = conn.prepare(SELECT_CONCEPT_PRICES)?;
            let prices = stmt
                .query_map([id], |row| {
                    let price: String = row.get(1)?;
                    Ok((row.get::<_, i64>(0)?, money_from_sql(&price)?))
                })?
                .collect::<rusqlite::Result<_>>()?;
            prices
        }
        None => std::collections::HashMap::new(),
    };

    let mut stmt = conn.prepare(SELECT_PRODUCTS)?;
    let products = stmt
        .query_map([], |row| {
            let price: String = row.get(2)?;
            Ok(Product {
                id: row.get(0)?,
                name: row.get(1)?,
                sale_price: money_from_sql(&price)?,
            })
        })?
        .map(|p| p.map(|p| (p.id, p)))
        .collect::<rusqlite::Result<_>>()?;

    Ok(PricingSnapshot {
        calendar,
        concept,
        concept_prices,
        products,
    })
}

impl Database {
    /// Creates a cabana class and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_class(&self, name: &str, description: Option<&str>) -> Result<CabanaClass> {
        self.conn.execute(
            "INSERT INTO cabana_classes (name, description) VALUES (?, ?)",
            params![name, description],
        )?;
        Ok(CabanaClass {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            description: description.map(String::from),
        })
    }

    /// Creates a concept and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_concept(
        &self,
        name: &str,
        service_fee: Money,
        class_id: Option<i64>,
    ) -> Result<Concept> {
        self.conn.execute(
            "INSERT INTO concepts (name, service_fee, class_id) VALUES (?, ?, ?)",
            params![name, money_to_sql(service_fee), class_id],
        )?;
        Ok(Concept {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            service_fee,
            class_id,
        })
    }

    /// Creates a product and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_product(&self, name: &str, sale_price: Money) -> Result<Product> {
        self.conn.execute(
            "INSERT INTO products (name, sale_price) VALUES (?, ?)",
            params![name, money_to_sql(sale_price)],
        )?;
        Ok(Product {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            sale_price,
        })
    }

    /// Updates a product's catalog sale price. Already-stamped reservation
    /// totals are unaffected; extra lines keep the unit price they were
    /// approved at.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist or is archived.
    pub fn set_product_price(&self, product_id: i64, sale_price: Money) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE products SET sale_price = ? WHERE id = ? AND archived = 0",
            params![money_to_sql(sale_price), product_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound {
                entity: "product",
                id: product_id,
            });
        }
        Ok(())
    }

    /// Sets a per-concept price override for one product.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn set_concept_price(&self, concept_id: i64, product_id: i64, price: Money) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO concept_prices (concept_id, product_id, price) VALUES (?, ?, ?)",
            params![concept_id, product_id, money_to_sql(price)],
        )?;
        Ok(())
    }

    /// Creates a cabana and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_cabana(
        &self,
        name: &str,
        class_id: i64,
        concept_id: Option<i64>,
    ) -> Result<Cabana> {
        self.conn.execute(
            "INSERT INTO cabanas (name, class_id, concept_id) VALUES (?, ?, ?)",
            params![name, class_id, concept_id],
        )?;
        Ok(Cabana {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            class_id,
            concept_id,
            status: CabanaStatus::Available,
            open_for_reservation: true,
        })
    }

    /// Sets whether a cabana accepts new reservations.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the cabana does not exist or is archived.
    pub fn set_cabana_open(&self, cabana_id: i64, open: bool) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE cabanas SET open_for_reservation = ? WHERE id = ? AND archived = 0",
            params![open, cabana_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound {
                entity: "cabana",
                id: cabana_id,
            });
        }
        Ok(())
    }

    /// Sets a cabana's operational status.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the cabana does not exist or is archived.
    pub fn set_cabana_status(&self, cabana_id: i64, status: CabanaStatus) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE cabanas SET status = ? WHERE id = ? AND archived = 0",
            params![status.as_str(), cabana_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound {
                entity: "cabana",
                id: cabana_id,
            });
        }
        Ok(())
    }

    /// Looks up a non-archived cabana by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_cabana(&self, id: i64) -> Result<Option<Cabana>> {
        get_cabana(&self.conn, id)
    }

    /// Lists all non-archived cabanas.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_cabanas(&self) -> Result<Vec<Cabana>> {
        let mut stmt = self.conn.prepare(SELECT_CABANAS)?;
        let rows = stmt.query_map([], row_to_cabana)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Looks up a non-archived cabana class by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_class(&self, id: i64) -> Result<Option<CabanaClass>> {
        self.conn
            .query_row(SELECT_CLASS, [id], |row| {
                Ok(CabanaClass {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                })
            })
            .optional()
            .map_err(Error::from)
    }

    /// Sets an exact daily price for one day, replacing any existing point
    /// override for that day.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn add_price_point(&self, cabana_id: i64, day: chrono::NaiveDate, price: Money) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO price_points (cabana_id, day, price) VALUES (?, ?, ?)",
            params![cabana_id, day_to_sql(day), money_to_sql(price)],
        )?;
        Ok(())
    }

    /// Adds a range price override and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_price_range(
        &self,
        cabana_id: i64,
        span: DateSpan,
        price: Money,
        priority: i64,
        label: Option<&str>,
    ) -> Result<PriceRange> {
        self.conn.execute(
            "INSERT INTO price_ranges (cabana_id, start_day, end_day, price, priority, label)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                cabana_id,
                day_to_sql(span.start()),
                day_to_sql(span.end()),
                money_to_sql(price),
                priority,
                label,
            ],
        )?;
        Ok(PriceRange {
            id: self.conn.last_insert_rowid(),
            cabana_id,
            span,
            price,
            priority,
            label: label.map(String::from),
        })
    }

    /// Adds a blackout window. A `None` cabana id applies it venue-wide.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_blackout(
        &self,
        cabana_id: Option<i64>,
        span: DateSpan,
        reason: &str,
    ) -> Result<Blackout> {
        self.conn.execute(
            "INSERT INTO blackouts (cabana_id, start_day, end_day, reason) VALUES (?, ?, ?, ?)",
            params![cabana_id, day_to_sql(span.start()), day_to_sql(span.end()), reason],
        )?;
        Ok(Blackout {
            id: self.conn.last_insert_rowid(),
            cabana_id,
            span,
            reason: reason.to_string(),
        })
    }

    /// Removes a blackout window.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no blackout has the given id.
    pub fn remove_blackout(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM blackouts WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(Error::NotFound {
                entity: "blackout",
                id,
            });
        }
        Ok(())
    }

    /// Loads the blackout windows relevant to a cabana.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn blackouts_for(&self, cabana_id: i64) -> Result<Vec<Blackout>> {
        blackouts_for(&self.conn, cabana_id)
    }

    /// Loads the price calendar for a cabana over a span.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn load_calendar(&self, cabana_id: i64, span: DateSpan) -> Result<PriceCalendar> {
        load_calendar(&self.conn, cabana_id, span)
    }
}
