//! The reservation lifecycle state machine.
//!
//! Every status change goes through one guarded entry point per event.
//! A transition re-reads the reservation inside an IMMEDIATE transaction,
//! validates its guard against the freshly-read status, and commits the
//! status write, the history row, and any derived rows as one atomic
//! unit. Side effects queue during the transition and dispatch only after
//! commit.
//!
//! Authorization guards live here, not in the caller: which transitions
//! are valid depends on which actor performs the event.

mod checkin;
mod create;
mod effects;
mod requests;
mod review;

pub use effects::{EffectSink, LogSink, SideEffect, SinkError};

use rusqlite::{Transaction, TransactionBehavior};

use crate::actor::Actor;
use crate::database::{self, Database};
use crate::error::{Error, Result};
use crate::pricing::PriceBreakdown;
use crate::reservation::{ExtraItem, Reservation, ReservationStatus};
use crate::span::DateSpan;

/// Drives reservation lifecycle transitions against one database.
///
/// # Examples
///
/// ```no_run
/// use cabana::database::{Database, DatabaseConfig};
/// use cabana::{Actor, DateSpan, Lifecycle, LogSink, Role};
///
/// let mut db = Database::open(DatabaseConfig::new("/tmp/cabana.db")).unwrap();
/// let sink = LogSink;
/// let mut lifecycle = Lifecycle::new(&mut db, &sink);
///
/// let guest = Actor::new(42, Role::Guest);
/// let span = DateSpan::new(
///     "2025-06-10".parse().unwrap(),
///     "2025-06-13".parse().unwrap(),
/// )
/// .unwrap();
/// let reservation = lifecycle.create_reservation(&guest, 1, "Ada", span).unwrap();
/// ```
pub struct Lifecycle<'a> {
    db: &'a mut Database,
    sink: &'a dyn EffectSink,
}

impl<'a> Lifecycle<'a> {
    /// Creates a lifecycle driver over a database and an effect sink.
    pub fn new(db: &'a mut Database, sink: &'a dyn EffectSink) -> Self {
        Self { db, sink }
    }

    /// Begins an IMMEDIATE transaction so the write lock is taken up
    /// front, before any guard reads.
    fn begin(&mut self) -> Result<Transaction<'_>> {
        self.db
            .connection_mut()
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(Error::from)
    }

    /// Commits the transaction, then dispatches the queued effects.
    fn finish(tx: Transaction<'_>, sink: &dyn EffectSink, effects: Vec<SideEffect>) -> Result<()> {
        tx.commit()?;
        effects::dispatch(sink, effects);
        Ok(())
    }

    /// Prices a prospective stay without creating or touching any
    /// reservation.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the cabana or concept does not exist.
    /// - [`Error::UnpricedDates`] naming every night without a price
    ///   source.
    /// - [`Error::UnknownProduct`] if an extra references a missing
    ///   product.
    pub fn preview_price(
        &self,
        cabana_id: i64,
        concept_id: Option<i64>,
        span: DateSpan,
        items: &[ExtraItem],
    ) -> Result<PriceBreakdown> {
        let conn = self.db.connection();
        database::require_cabana(conn, cabana_id)?;
        let snapshot = database::load_pricing_snapshot(conn, cabana_id, concept_id, span)?;
        snapshot.price_stay(span, items)
    }
}

/// Fails with `Forbidden` unless the actor holds an administrative role.
fn require_admin(actor: &Actor, action: &'static str) -> Result<()> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(Error::Forbidden {
            actor_id: actor.id,
            action,
        })
    }
}

/// Fails with `InvalidTransition` unless the reservation sits in the
/// expected source state for this event.
fn ensure_status(
    reservation: &Reservation,
    expected: ReservationStatus,
    event: &'static str,
) -> Result<()> {
    if reservation.status() == expected {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            from: reservation.status(),
            event,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use crate::database::test_util::create_test_database;
    use crate::database::Database;
    use crate::span::DateSpan;

    /// A database seeded with a class, an open cabana, and a flat-rate
    /// price range covering June 2025.
    pub(crate) fn seeded_database() -> (Database, i64) {
        let db = create_test_database();
        let class = db.create_class("standard", None).unwrap();
        let cabana = db.create_cabana("C101", class.id, None).unwrap();
        db.add_price_range(
            cabana.id,
            june("2025-06-01", "2025-07-01"),
            "100".parse().unwrap(),
            0,
            None,
        )
        .unwrap();
        (db, cabana.id)
    }

    pub(crate) fn june(start: &str, end: &str) -> DateSpan {
        DateSpan::new(start.parse().unwrap(), end.parse().unwrap()).unwrap()
    }
}
