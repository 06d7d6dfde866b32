//! Database operations for reservations, status history, and modification
//! requests.
//!
//! Connection-level functions (`pub(crate)`, taking `&Connection`) are the
//! building blocks lifecycle transitions compose inside a single
//! transaction: `rusqlite::Transaction` derefs to `Connection`, so the
//! same functions serve both transactional and standalone reads. The
//! `impl Database` wrappers expose the read API.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::catalog::Money;
use crate::error::{Error, Result};
use crate::pricing::ExtraLine;
use crate::reservation::{
    CancellationRequest, ExtraItem, ExtraRequest, RequestStatus, Reservation, ReservationStatus,
    StatusRecord,
};
use crate::span::DateSpan;

use super::codec::{
    day_to_sql, money_from_sql, money_to_sql, request_status_from_sql, reservation_status_from_sql,
    span_from_sql, timestamp_from_sql, timestamp_to_sql,
};
use super::connection::Database;

const RESERVATION_COLUMNS: &str = r"
    id, cabana_id, user_id, guest_name, start_day, end_day, status,
    total_price, check_in_at, checked_in_by, check_out_at, checked_out_by,
    created_at
";

const INSERT_RESERVATION: &str = r"
    INSERT INTO reservations
    (cabana_id, user_id, guest_name, start_day, end_day, status, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
";

const UPDATE_STATUS_CHECKED: &str = r"
    UPDATE reservations SET status = ?1
    WHERE id = ?2 AND status = ?3
";

const SET_TOTAL_PRICE: &str = "UPDATE reservations SET total_price = ? WHERE id = ?";

const STAMP_CHECK_IN: &str = r"
    UPDATE reservations SET check_in_at = ?, checked_in_by = ? WHERE id = ?
";

const STAMP_CHECK_OUT: &str = r"
    UPDATE reservations SET check_out_at = ?, checked_out_by = ? WHERE id = ?
";

const INSERT_HISTORY: &str = r"
    INSERT INTO status_history
    (reservation_id, from_status, to_status, actor_id, reason, recorded_at)
    VALUES (?, ?, ?, ?, ?, ?)
";

const SELECT_HISTORY: &str = r"
    SELECT id, reservation_id, from_status, to_status, actor_id, reason, recorded_at
    FROM status_history
    WHERE reservation_id = ?
    ORDER BY id
";

const SELECT_OCCUPYING: &str = r"
    SELECT id, start_day, end_day
    FROM reservations
    WHERE cabana_id = ?1
      AND id != ?2
      AND status IN ('APPROVED', 'CHECKED_IN', 'MODIFICATION_PENDING', 'EXTRA_PENDING')
";

const INSERT_CANCELLATION: &str = r"
    INSERT INTO cancellation_requests
    (reservation_id, requested_by, reason, status, created_at)
    VALUES (?, ?, ?, 'PENDING', ?)
";

const SELECT_CANCELLATION: &str = r"
    SELECT id, reservation_id, requested_by, reason, status, created_at, resolved_at, resolved_by
    FROM cancellation_requests
    WHERE id = ?
";

const RESOLVE_CANCELLATION: &str = r"
    UPDATE cancellation_requests
    SET status = ?1, resolved_at = ?2, resolved_by = ?3
    WHERE id = ?4 AND status = 'PENDING'
";

const INSERT_EXTRA_REQUEST: &str = r"
    INSERT INTO extra_requests (reservation_id, requested_by, status, created_at)
    VALUES (?, ?, 'PENDING', ?)
";

const INSERT_EXTRA_REQUEST_ITEM: &str = r"
    INSERT INTO extra_request_items (request_id, product_id, quantity)
    VALUES (?, ?, ?)
";

const SELECT_EXTRA_REQUEST: &str = r"
    SELECT id, reservation_id, requested_by, status, created_at, resolved_at, resolved_by
    FROM extra_requests
    WHERE id = ?
";

const SELECT_EXTRA_REQUEST_ITEMS: &str = r"
    SELECT product_id, quantity FROM extra_request_items WHERE request_id = ? ORDER BY id
";

const RESOLVE_EXTRA_REQUEST: &str = r"
    UPDATE extra_requests
    SET status = ?1, resolved_at = ?2, resolved_by = ?3
    WHERE id = ?4 AND status = 'PENDING'
";

const INSERT_EXTRA_ITEM: &str = r"
    INSERT INTO extra_items (reservation_id, product_id, quantity, unit_price)
    VALUES (?, ?, ?, ?)
";

const SELECT_EXTRA_ITEMS: &str = r"
    SELECT product_id, quantity, unit_price
    FROM extra_items WHERE reservation_id = ? ORDER BY id
";

fn row_to_reservation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reservation> {
    let id: i64 = row.get(0)?;
    let cabana_id: i64 = row.get(1)?;
    let user_id: i64 = row.get(2)?;
    let guest_name: String = row.get(3)?;
    let start: String = row.get(4)?;
    let end: String = row.get(5)?;
    let status: String = row.get(6)?;
    let total_price: Option<String> = row.get(7)?;
    let check_in_at: Option<String> = row.get(8)?;
    let checked_in_by: Option<i64> = row.get(9)?;
    let check_out_at: Option<String> = row.get(10)?;
    let checked_out_by: Option<i64> = row.get(11)?;
    let created_at: String = row.get(12)?;

    let span = span_from_sql(&start, &end)?;
    let status = reservation_status_from_sql(&status)?;
    let total_price = total_price.as_deref().map(money_from_sql).transpose()?;
    let check_in_at = check_in_at.as_deref().map(timestamp_from_sql).transpose()?;
    let check_out_at = check_out_at.as_deref().map(timestamp_from_sql).transpose()?;
    let created_at = timestamp_from_sql(&created_at)?;

    Reservation::builder(cabana_id, user_id, guest_name, span)
        .id(id)
        .status(status)
        .total_price(total_price)
        .checked_in(check_in_at, checked_in_by)
        .checked_out(check_out_at, checked_out_by)
        .created_at(created_at)
        .build()
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn row_to_status_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<StatusRecord> {
    let from_status: Option<String> = row.get(2)?;
    let to_status: String = row.get(3)?;
    let recorded_at: String = row.get(6)?;

    Ok(StatusRecord {
        id: row.get(0)?,
        reservation_id: row.get(1)?,
        from_status: from_status
            .as_deref()
            .map(reservation_status_from_sql)
            .transpose()?,
        to_status: reservation_status_from_sql(&to_status)?,
        actor_id: row.get(4)?,
        reason: row.get(5)?,
        recorded_at: timestamp_from_sql(&recorded_at)?,
    })
}

fn row_to_cancellation(row: &rusqlite::Row<'_>) -> rusqlite::Result<CancellationRequest> {
    let status: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    let resolved_at: Option<String> = row.get(6)?;

    Ok(CancellationRequest {
        id: row.get(0)?,
        reservation_id: row.get(1)?,
        requested_by: row.get(2)?,
        reason: row.get(3)?,
        status: request_status_from_sql(&status)?,
        created_at: timestamp_from_sql(&created_at)?,
        resolved_at: resolved_at.as_deref().map(timestamp_from_sql).transpose()?,
        resolved_by: row.get(7)?,
    })
}

/// Looks up a reservation by id.
pub(crate) fn get_reservation(conn: &Connection, id: i64) -> Result<Option<Reservation>> {
    let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?");
    conn.query_row(&sql, [id], row_to_reservation)
        .optional()
        .map_err(Error::from)
}

/// Looks up a reservation, failing with `NotFound` when absent.
pub(crate) fn require_reservation(conn: &Connection, id: i64) -> Result<Reservation> {
    get_reservation(conn, id)?.ok_or(Error::NotFound {
        entity: "reservation",
        id,
    })
}

/// Inserts a new reservation row and returns the stored entity with its
/// assigned id.
pub(crate) fn insert_reservation(
    conn: &Connection,
    reservation: &Reservation,
) -> Result<Reservation> {
    conn.execute(
        INSERT_RESERVATION,
        params![
            reservation.cabana_id(),
            reservation.user_id(),
            reservation.guest_name(),
            day_to_sql(reservation.span().start()),
            day_to_sql(reservation.span().end()),
            reservation.status().as_str(),
            timestamp_to_sql(reservation.created_at()),
        ],
    )?;
    require_reservation(conn, conn.last_insert_rowid())
}

/// Writes a new status, guarded by the expected current status.
///
/// The `WHERE status = ?` clause is the optimistic-concurrency check: if a
/// concurrent transition changed the status after the guard was evaluated,
/// zero rows match and the caller gets `Conflict` instead of silently
/// overwriting the winner.
pub(crate) fn update_status_checked(
    conn: &Connection,
    id: i64,
    from: ReservationStatus,
    to: ReservationStatus,
) -> Result<()> {
    let changed = conn.execute(UPDATE_STATUS_CHECKED, params![to.as_str(), id, from.as_str()])?;
    if changed == 0 {
        log::debug!("reservation {id} status changed away from {from} during transition");
        return Err(Error::Conflict {
            details: format!("reservation {id} is no longer {from}"),
        });
    }
    Ok(())
}

/// Appends one record to a reservation's status history.
///
/// History rows are only ever inserted; no code path updates or deletes
/// them.
pub(crate) fn append_history(
    conn: &Connection,
    reservation_id: i64,
    from: Option<ReservationStatus>,
    to: ReservationStatus,
    actor_id: i64,
    reason: Option<&str>,
    at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        INSERT_HISTORY,
        params![
            reservation_id,
            from.map(ReservationStatus::as_str),
            to.as_str(),
            actor_id,
            reason,
            timestamp_to_sql(at),
        ],
    )?;
    Ok(())
}

/// Loads `(id, span)` pairs for this cabana's occupying reservations,
/// optionally excluding one reservation.
pub(crate) fn occupying_spans(
    conn: &Connection,
    cabana_id: i64,
    exclude: Option<i64>,
) -> Result<Vec<(i64, DateSpan)>> {
    let mut stmt = conn.prepare(SELECT_OCCUPYING)?;
    let rows = stmt.query_map(params![cabana_id, exclude.unwrap_or(-1)], |row| {
        let id: i64 = row.get(0)?;
        let start: String = row.get(1)?;
        let end: String = row.get(2)?;
        Ok((id, span_from_sql(&start, &end)?))
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
}

/// Stamps the pricing engine's output onto a reservation.
pub(crate) fn set_total_price(conn: &Connection, id: i64, total: Money) -> Result<()> {
    conn.execute(SET_TOTAL_PRICE, params![money_to_sql(total), id])?;
    Ok(())
}

/// Stamps the check-in audit fields.
pub(crate) fn stamp_check_in(
    conn: &Connection,
    id: i64,
    at: DateTime<Utc>,
    by: i64,
) -> Result<()> {
    conn.execute(STAMP_CHECK_IN, params![timestamp_to_sql(at), by, id])?;
    Ok(())
}

/// Stamps the check-out audit fields.
pub(crate) fn stamp_check_out(
    conn: &Connection,
    id: i64,
    at: DateTime<Utc>,
    by: i64,
) -> Result<()> {
    conn.execute(STAMP_CHECK_OUT, params![timestamp_to_sql(at), by, id])?;
    Ok(())
}

/// Creates a pending cancellation request.
pub(crate) fn insert_cancellation_request(
    conn: &Connection,
    reservation_id: i64,
    requested_by: i64,
    reason: &str,
    at: DateTime<Utc>,
) -> Result<CancellationRequest> {
    conn.execute(
        INSERT_CANCELLATION,
        params![reservation_id, requested_by, reason, timestamp_to_sql(at)],
    )?;
    let id = conn.last_insert_rowid();
    get_cancellation_request(conn, id)?.ok_or(Error::NotFound {
        entity: "cancellation request",
        id,
    })
}

/// Looks up a cancellation request by id.
pub(crate) fn get_cancellation_request(
    conn: &Connection,
    id: i64,
) -> Result<Option<CancellationRequest>> {
    conn.query_row(SELECT_CANCELLATION, [id], row_to_cancellation)
        .optional()
        .map_err(Error::from)
}

/// Resolves a pending cancellation request.
///
/// Guarded on `status = 'PENDING'`; a concurrent resolution surfaces as
/// `Conflict`.
pub(crate) fn resolve_cancellation_request(
    conn: &Connection,
    id: i64,
    status: RequestStatus,
    at: DateTime<Utc>,
    by: i64,
) -> Result<()> {
    let changed = conn.execute(
        RESOLVE_CANCELLATION,
        params![status.as_str(), timestamp_to_sql(at), by, id],
    )?;
    if changed == 0 {
        return Err(Error::Conflict {
            details: format!("cancellation request {id} is no longer pending"),
        });
    }
    Ok(())
}

/// Creates a pending extra-items request with its item rows.
pub(crate) fn insert_extra_request(
    conn: &Connection,
    reservation_id: i64,
    requested_by: i64,
    items: &[ExtraItem],
    at: DateTime<Utc>,
) -> Result<ExtraRequest> {
    conn.execute(
        INSERT_EXTRA_REQUEST,
        params![reservation_id, requested_by, timestamp_to_sql(at)],
    )?;
    let id = conn.last_insert_rowid();

    let mut stmt = conn.prepare(INSERT_EXTRA_REQUEST_ITEM)?;
    for item in items {
        stmt.execute(params![id, item.product_id, item.quantity])?;
    }
    drop(stmt);

    get_extra_request(conn, id)?.ok_or(Error::NotFound {
        entity: "extra request",
        id,
    })
}

/// Looks up an extra-items request (with its items) by id.
pub(crate) fn get_extra_request(conn: &Connection, id: i64) -> Result<Option<ExtraRequest>> {
    let header = conn
        .query_row(SELECT_EXTRA_REQUEST, [id], |row| {
            let status: String = row.get(3)?;
            let created_at: String = row.get(4)?;
            let resolved_at: Option<String> = row.get(5)?;
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                request_status_from_sql(&status)?,
                timestamp_from_sql(&created_at)?,
                resolved_at.as_deref().map(timestamp_from_sql).transpose()?,
                row.get::<_, Option<i64>>(6)?,
            ))
        })
        .optional()?;

    let Some((id, reservation_id, requested_by, status, created_at, resolved_at, resolved_by)) =
        header
    else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(SELECT_EXTRA_REQUEST_ITEMS)?;
    let items = stmt
        .query_map([id], |row| {
            Ok(ExtraItem {
                product_id: row.get(0)?,
                quantity: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Some(ExtraRequest {
        id,
        reservation_id,
        requested_by,
        items,
        status,
        created_at,
        resolved_at,
        resolved_by,
    }))
}

/// Resolves a pending extra-items request.
pub(crate) fn resolve_extra_request(
    conn: &Connection,
    id: i64,
    status: RequestStatus,
    at: DateTime<Utc>,
    by: i64,
) -> Result<()> {
    let changed = conn.execute(
        RESOLVE_EXTRA_REQUEST,
        params![status.as_str(), timestamp_to_sql(at), by, id],
    )?;
    if changed == 0 {
        return Err(Error::Conflict {
            details: format!("extra request {id} is no longer pending"),
        });
    }
    Ok(())
}

/// Persists approved extra lines against a reservation.
pub(crate) fn insert_extra_items(
    conn: &Connection,
    reservation_id: i64,
    lines: &[ExtraLine],
) -> Result<()> {
    let mut stmt = conn.prepare(INSERT_EXTRA_ITEM)?;
    for line in lines {
        stmt.execute(params![
            reservation_id,
            line.product_id,
            line.quantity,
            money_to_sql(line.unit_price),
        ])?;
    }
    Ok(())
}

/// Loads the approved extra items for a reservation.
pub(crate) fn load_extra_items(conn: &Connection, reservation_id: i64) -> Result<Vec<ExtraItem>> {
    let mut stmt = conn.prepare(SELECT_EXTRA_ITEMS)?;
    let items = stmt
        .query_map([reservation_id], |row| {
            Ok(ExtraItem {
                product_id: row.get(0)?,
                quantity: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(items)
}

/// Loads the approved extra lines at the unit prices they were stamped
/// with, so a later catalog change never alters an already-approved total.
pub(crate) fn load_extra_lines(conn: &Connection, reservation_id: i64) -> Result<Vec<ExtraLine>> {
    let mut stmt = conn.prepare(SELECT_EXTRA_ITEMS)?;
    let lines = stmt
        .query_map([reservation_id], |row| {
            let quantity: u32 = row.get(1)?;
            let price: String = row.get(2)?;
            let unit_price = money_from_sql(&price)?;
            Ok(ExtraLine {
                product_id: row.get(0)?,
                quantity,
                unit_price,
                total: unit_price * Money::from(quantity),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(lines)
}

impl Database {
    /// Looks up a reservation by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_reservation(&self, id: i64) -> Result<Option<Reservation>> {
        get_reservation(&self.conn, id)
    }

    /// Returns a reservation's full status history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn history_for(&self, reservation_id: i64) -> Result<Vec<StatusRecord>> {
        let mut stmt = self.conn.prepare(SELECT_HISTORY)?;
        let rows = stmt.query_map([reservation_id], row_to_status_record)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Lists all reservations for a cabana, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn reservations_for_cabana(&self, cabana_id: i64) -> Result<Vec<Reservation>> {
        let sql =
            format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE cabana_id = ? ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([cabana_id], row_to_reservation)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Lists all reservations owned by a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn reservations_for_user(&self, user_id: i64) -> Result<Vec<Reservation>> {
        let sql =
            format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE user_id = ? ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([user_id], row_to_reservation)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Looks up a cancellation request by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn cancellation_request(&self, id: i64) -> Result<Option<CancellationRequest>> {
        get_cancellation_request(&self.conn, id)
    }

    /// Looks up an extra-items request by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn extra_request(&self, id: i64) -> Result<Option<ExtraRequest>> {
        get_extra_request(&self.conn, id)
    }

    /// Lists a reservation's approved extra items.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn extra_items_for(&self, reservation_id: i64) -> Result<Vec<ExtraItem>> {
        load_extra_items(&self.conn, reservation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_util::{create_test_database, seed_cabana};

    fn span(start: &str, end: &str) -> DateSpan {
        DateSpan::new(start.parse().unwrap(), end.parse().unwrap()).unwrap()
    }

    fn insert_test_reservation(db: &Database, cabana_id: i64, s: DateSpan) -> Reservation {
        let reservation = Reservation::builder(cabana_id, 42, "Ada", s).build().unwrap();
        insert_reservation(db.connection(), &reservation).unwrap()
    }

    #[test]
    fn test_insert_and_get_reservation() {
        let db = create_test_database();
        let cabana_id = seed_cabana(&db, "C101");

        let stored = insert_test_reservation(&db, cabana_id, span("2025-06-10", "2025-06-13"));
        assert!(stored.id() > 0);
        assert_eq!(stored.status(), ReservationStatus::Pending);

        let loaded = db.get_reservation(stored.id()).unwrap().unwrap();
        assert_eq!(loaded, stored);
    }

    #[test]
    fn test_get_missing_reservation() {
        let db = create_test_database();
        assert!(db.get_reservation(999).unwrap().is_none());
        assert!(require_reservation(db.connection(), 999).is_err());
    }

    #[test]
    fn test_update_status_checked_succeeds_from_expected() {
        let db = create_test_database();
        let cabana_id = seed_cabana(&db, "C101");
        let stored = insert_test_reservation(&db, cabana_id, span("2025-06-10", "2025-06-13"));

        update_status_checked(
            db.connection(),
            stored.id(),
            ReservationStatus::Pending,
            ReservationStatus::Approved,
        )
        .unwrap();

        let loaded = db.get_reservation(stored.id()).unwrap().unwrap();
        assert_eq!(loaded.status(), ReservationStatus::Approved);
    }

    #[test]
    fn test_update_status_checked_conflicts_on_stale_expectation() {
        let db = create_test_database();
        let cabana_id = seed_cabana(&db, "C101");
        let stored = insert_test_reservation(&db, cabana_id, span("2025-06-10", "2025-06-13"));

        let err = update_status_checked(
            db.connection(),
            stored.id(),
            ReservationStatus::Approved,
            ReservationStatus::CheckedIn,
        )
        .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_history_append_and_read() {
        let db = create_test_database();
        let cabana_id = seed_cabana(&db, "C101");
        let stored = insert_test_reservation(&db, cabana_id, span("2025-06-10", "2025-06-13"));

        append_history(
            db.connection(),
            stored.id(),
            None,
            ReservationStatus::Pending,
            42,
            None,
            Utc::now(),
        )
        .unwrap();
        append_history(
            db.connection(),
            stored.id(),
            Some(ReservationStatus::Pending),
            ReservationStatus::Approved,
            1,
            Some("approved"),
            Utc::now(),
        )
        .unwrap();

        let history = db.history_for(stored.id()).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].from_status, None);
        assert_eq!(history[1].to_status, ReservationStatus::Approved);
        assert_eq!(history[1].reason.as_deref(), Some("approved"));
    }

    #[test]
    fn test_occupying_spans_filters_status_and_exclusion() {
        let db = create_test_database();
        let cabana_id = seed_cabana(&db, "C101");

        let pending = insert_test_reservation(&db, cabana_id, span("2025-06-10", "2025-06-13"));
        let approved = insert_test_reservation(&db, cabana_id, span("2025-06-20", "2025-06-23"));
        update_status_checked(
            db.connection(),
            approved.id(),
            ReservationStatus::Pending,
            ReservationStatus::Approved,
        )
        .unwrap();

        let occupying = occupying_spans(db.connection(), cabana_id, None).unwrap();
        assert_eq!(occupying, vec![(approved.id(), approved.span())]);

        // Pending never occupies
        assert!(!occupying.iter().any(|(id, _)| *id == pending.id()));

        // Exclusion removes the reservation being transitioned
        let excluded = occupying_spans(db.connection(), cabana_id, Some(approved.id())).unwrap();
        assert!(excluded.is_empty());
    }

    #[test]
    fn test_cancellation_request_round_trip() {
        let db = create_test_database();
        let cabana_id = seed_cabana(&db, "C101");
        let stored = insert_test_reservation(&db, cabana_id, span("2025-06-10", "2025-06-13"));

        let request = insert_cancellation_request(
            db.connection(),
            stored.id(),
            42,
            "plans changed",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.reason, "plans changed");

        resolve_cancellation_request(
            db.connection(),
            request.id,
            RequestStatus::Approved,
            Utc::now(),
            1,
        )
        .unwrap();

        let resolved = db.cancellation_request(request.id).unwrap().unwrap();
        assert_eq!(resolved.status, RequestStatus::Approved);
        assert_eq!(resolved.resolved_by, Some(1));

        // Second resolution loses the pending guard
        let err = resolve_cancellation_request(
            db.connection(),
            request.id,
            RequestStatus::Rejected,
            Utc::now(),
            1,
        )
        .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_extra_request_round_trip() {
        let db = create_test_database();
        let cabana_id = seed_cabana(&db, "C101");
        let stored = insert_test_reservation(&db, cabana_id, span("2025-06-10", "2025-06-13"));
        let product_id = crate::database::test_util::seed_product(&db, "towel set", "15");

        let items = vec![ExtraItem::new(product_id, 2).unwrap()];
        let request = insert_extra_request(db.connection(), stored.id(), 42, &items, Utc::now())
            .unwrap();
        assert_eq!(request.items, items);
        assert_eq!(request.status, RequestStatus::Pending);

        resolve_extra_request(
            db.connection(),
            request.id,
            RequestStatus::Approved,
            Utc::now(),
            1,
        )
        .unwrap();
        let resolved = db.extra_request(request.id).unwrap().unwrap();
        assert_eq!(resolved.status, RequestStatus::Approved);
    }

    #[test]
    fn test_extra_items_persist_unit_price() {
        let db = create_test_database();
        let cabana_id = seed_cabana(&db, "C101");
        let stored = insert_test_reservation(&db, cabana_id, span("2025-06-10", "2025-06-13"));
        let product_id = crate::database::test_util::seed_product(&db, "towel set", "15");

        let lines = vec![ExtraLine {
            product_id,
            quantity: 2,
            unit_price: "15".parse().unwrap(),
            total: "30".parse().unwrap(),
        }];
        insert_extra_items(db.connection(), stored.id(), &lines).unwrap();

        let items = db.extra_items_for(stored.id()).unwrap();
        assert_eq!(items, vec![ExtraItem { product_id, quantity: 2 }]);
    }

    #[test]
    fn test_reservations_for_user_and_cabana() {
        let db = create_test_database();
        let cabana_id = seed_cabana(&db, "C101");
        let other_cabana = seed_cabana(&db, "C102");

        insert_test_reservation(&db, cabana_id, span("2025-06-10", "2025-06-13"));
        insert_test_reservation(&db, other_cabana, span("2025-06-10", "2025-06-13"));

        assert_eq!(db.reservations_for_cabana(cabana_id).unwrap().len(), 1);
        assert_eq!(db.reservations_for_user(42).unwrap().len(), 2);
        assert!(db.reservations_for_user(7).unwrap().is_empty());
    }
}
