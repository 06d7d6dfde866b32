//! Admin review of pending reservations: approval and rejection.

use chrono::Utc;

use crate::actor::Actor;
use crate::database;
use crate::error::{Error, Result};
use crate::reservation::{Reservation, ReservationStatus};

use super::{effects::SideEffect, ensure_status, require_admin, Lifecycle};

impl Lifecycle<'_> {
    /// Approves a `PENDING` reservation, stamping its total price.
    ///
    /// Approval claims the cabana's calendar, so availability is
    /// re-checked inside the transaction (excluding this reservation) and
    /// the stay is priced from current catalog data. A pricing failure
    /// rolls the whole transition back, leaving the reservation `PENDING`
    /// with no price stamped.
    ///
    /// # Errors
    ///
    /// - [`Error::Forbidden`] if the actor is not an administrator.
    /// - [`Error::InvalidTransition`] if the reservation is not `PENDING`.
    /// - [`Error::Unavailable`] if the span is no longer bookable.
    /// - [`Error::UnpricedDates`] naming every unpriced night.
    /// - [`Error::Conflict`] if a concurrent transition won the race.
    pub fn approve(&mut self, actor: &Actor, reservation_id: i64) -> Result<Reservation> {
        require_admin(actor, "approve reservation")?;
        let sink = self.sink;
        let tx = self.begin()?;

        let reservation = database::require_reservation(&tx, reservation_id)?;
        ensure_status(&reservation, ReservationStatus::Pending, "approve")?;

        let cabana = database::require_cabana(&tx, reservation.cabana_id())?;
        let blackouts = database::blackouts_for(&tx, cabana.id)?;
        let occupying = database::occupying_spans(&tx, cabana.id, Some(reservation_id))?;
        let reasons =
            crate::availability::assess(&cabana, reservation.span(), &blackouts, &occupying);
        if !reasons.is_empty() {
            return Err(Error::Unavailable { reasons });
        }

        let extras = database::load_extra_items(&tx, reservation_id)?;
        let snapshot = database::load_pricing_snapshot(
            &tx,
            cabana.id,
            cabana.concept_id,
            reservation.span(),
        )?;
        let breakdown = snapshot.price_stay(reservation.span(), &extras)?;

        database::set_total_price(&tx, reservation_id, breakdown.total)?;
        database::update_status_checked(
            &tx,
            reservation_id,
            ReservationStatus::Pending,
            ReservationStatus::Approved,
        )?;
        database::append_history(
            &tx,
            reservation_id,
            Some(ReservationStatus::Pending),
            ReservationStatus::Approved,
            actor.id,
            None,
            Utc::now(),
        )?;
        let updated = database::require_reservation(&tx, reservation_id)?;

        let effects = vec![
            SideEffect::Audit {
                actor_id: actor.id,
                action: "reservation.approve",
                entity: "reservation",
                entity_id: reservation_id,
                old_value: Some(ReservationStatus::Pending.to_string()),
                new_value: Some(ReservationStatus::Approved.to_string()),
            },
            SideEffect::Notify {
                user_id: updated.user_id(),
                title: "Reservation approved".into(),
                message: format!(
                    "Your reservation for {} has been approved at {}",
                    updated.span(),
                    breakdown.total
                ),
            },
        ];
        Self::finish(tx, sink, effects)?;
        Ok(updated)
    }

    /// Rejects a `PENDING` reservation.
    ///
    /// # Errors
    ///
    /// - [`Error::Forbidden`] if the actor is not an administrator.
    /// - [`Error::InvalidTransition`] if the reservation is not `PENDING`.
    /// - [`Error::Conflict`] if a concurrent transition won the race.
    pub fn reject(&mut self, actor: &Actor, reservation_id: i64) -> Result<Reservation> {
        require_admin(actor, "reject reservation")?;
        let sink = self.sink;
        let tx = self.begin()?;

        let reservation = database::require_reservation(&tx, reservation_id)?;
        ensure_status(&reservation, ReservationStatus::Pending, "reject")?;

        database::update_status_checked(
            &tx,
            reservation_id,
            ReservationStatus::Pending,
            ReservationStatus::Rejected,
        )?;
        database::append_history(
            &tx,
            reservation_id,
            Some(ReservationStatus::Pending),
            ReservationStatus::Rejected,
            actor.id,
            None,
            Utc::now(),
        )?;
        let updated = database::require_reservation(&tx, reservation_id)?;

        let effects = vec![
            SideEffect::Audit {
                actor_id: actor.id,
                action: "reservation.reject",
                entity: "reservation",
                entity_id: reservation_id,
                old_value: Some(ReservationStatus::Pending.to_string()),
                new_value: Some(ReservationStatus::Rejected.to_string()),
            },
            SideEffect::Notify {
                user_id: updated.user_id(),
                title: "Reservation rejected".into(),
                message: format!("Your reservation for {} was rejected", updated.span()),
            },
        ];
        Self::finish(tx, sink, effects)?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::test_util::{june, seeded_database};
    use crate::lifecycle::LogSink;
    use crate::Role;

    fn setup() -> (crate::database::Database, i64, i64) {
        let (mut db, cabana_id) = seeded_database();
        let sink = LogSink;
        let mut lifecycle = Lifecycle::new(&mut db, &sink);
        let guest = Actor::new(42, Role::Guest);
        let reservation = lifecycle
            .create_reservation(&guest, cabana_id, "Ada", june("2025-06-10", "2025-06-13"))
            .unwrap();
        (db, cabana_id, reservation.id())
    }

    #[test]
    fn test_approve_stamps_total_price() {
        let (mut db, _, reservation_id) = setup();
        let sink = LogSink;
        let mut lifecycle = Lifecycle::new(&mut db, &sink);
        let admin = Actor::new(1, Role::Admin);

        let approved = lifecycle.approve(&admin, reservation_id).unwrap();
        assert_eq!(approved.status(), ReservationStatus::Approved);
        // 3 nights at 100
        assert_eq!(approved.total_price(), Some("300".parse().unwrap()));

        let history = db.history_for(reservation_id).unwrap();
        assert_eq!(history.last().unwrap().to_status, ReservationStatus::Approved);
        assert_eq!(history.last().unwrap().actor_id, 1);
    }

    #[test]
    fn test_approve_requires_admin() {
        let (mut db, _, reservation_id) = setup();
        let sink = LogSink;
        let mut lifecycle = Lifecycle::new(&mut db, &sink);
        let guest = Actor::new(42, Role::Guest);

        let err = lifecycle.approve(&guest, reservation_id).unwrap_err();
        assert!(matches!(err, Error::Forbidden { actor_id: 42, .. }));
    }

    #[test]
    fn test_approve_twice_is_invalid_transition() {
        let (mut db, _, reservation_id) = setup();
        let sink = LogSink;
        let mut lifecycle = Lifecycle::new(&mut db, &sink);
        let admin = Actor::new(1, Role::Admin);

        lifecycle.approve(&admin, reservation_id).unwrap();
        let err = lifecycle.approve(&admin, reservation_id).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: ReservationStatus::Approved,
                event: "approve"
            }
        ));
    }

    #[test]
    fn test_approve_with_unpriced_night_leaves_pending() {
        let (mut db, cabana_id) = seeded_database();
        let sink = LogSink;
        let mut lifecycle = Lifecycle::new(&mut db, &sink);
        let guest = Actor::new(42, Role::Guest);
        let admin = Actor::new(1, Role::Admin);

        // July 1 is outside the seeded June range
        let reservation = lifecycle
            .create_reservation(&guest, cabana_id, "Ada", june("2025-06-30", "2025-07-02"))
            .unwrap();

        let err = lifecycle.approve(&admin, reservation.id()).unwrap_err();
        let Error::UnpricedDates { dates } = err else {
            panic!("expected UnpricedDates, got {err}");
        };
        assert_eq!(dates, vec!["2025-07-01".parse().unwrap()]);

        let unchanged = db.get_reservation(reservation.id()).unwrap().unwrap();
        assert_eq!(unchanged.status(), ReservationStatus::Pending);
        assert_eq!(unchanged.total_price(), None);
    }

    #[test]
    fn test_second_overlapping_approval_is_unavailable() {
        let (mut db, cabana_id, first) = setup();
        let sink = LogSink;
        let mut lifecycle = Lifecycle::new(&mut db, &sink);
        let guest = Actor::new(43, Role::Guest);
        let admin = Actor::new(1, Role::Admin);

        let second = lifecycle
            .create_reservation(&guest, cabana_id, "Grace", june("2025-06-12", "2025-06-14"))
            .unwrap();

        lifecycle.approve(&admin, first).unwrap();
        let err = lifecycle.approve(&admin, second.id()).unwrap_err();
        assert!(matches!(err, Error::Unavailable { .. }));
    }

    #[test]
    fn test_reject_is_terminal() {
        let (mut db, _, reservation_id) = setup();
        let sink = LogSink;
        let mut lifecycle = Lifecycle::new(&mut db, &sink);
        let admin = Actor::new(1, Role::Admin);

        let rejected = lifecycle.reject(&admin, reservation_id).unwrap();
        assert_eq!(rejected.status(), ReservationStatus::Rejected);
        assert!(rejected.status().is_terminal());

        let err = lifecycle.approve(&admin, reservation_id).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
    }
}
