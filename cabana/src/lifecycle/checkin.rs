//! Guest arrival and departure: check-in and check-out.

use chrono::Utc;
use serde_json::json;

use crate::actor::Actor;
use crate::database;
use crate::error::Result;
use crate::reservation::{Reservation, ReservationStatus};

use super::{effects::SideEffect, ensure_status, require_admin, Lifecycle};

impl Lifecycle<'_> {
    /// Checks a guest in, moving `APPROVED` to `CHECKED_IN` and stamping
    /// the arrival audit fields.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Forbidden`] if the actor is not an administrator.
    /// - [`crate::Error::InvalidTransition`] if the reservation is not
    ///   `APPROVED`.
    /// - [`crate::Error::Conflict`] if a concurrent transition won the race.
    pub fn check_in(&mut self, actor: &Actor, reservation_id: i64) -> Result<Reservation> {
        require_admin(actor, "check in")?;
        let sink = self.sink;
        let tx = self.begin()?;

        let reservation = database::require_reservation(&tx, reservation_id)?;
        ensure_status(&reservation, ReservationStatus::Approved, "check in")?;

        let now = Utc::now();
        database::stamp_check_in(&tx, reservation_id, now, actor.id)?;
        database::update_status_checked(
            &tx,
            reservation_id,
            ReservationStatus::Approved,
            ReservationStatus::CheckedIn,
        )?;
        database::append_history(
            &tx,
            reservation_id,
            Some(ReservationStatus::Approved),
            ReservationStatus::CheckedIn,
            actor.id,
            None,
            now,
        )?;
        let updated = database::require_reservation(&tx, reservation_id)?;

        let effects = vec![
            SideEffect::Audit {
                actor_id: actor.id,
                action: "reservation.check_in",
                entity: "reservation",
                entity_id: reservation_id,
                old_value: Some(ReservationStatus::Approved.to_string()),
                new_value: Some(ReservationStatus::CheckedIn.to_string()),
            },
            SideEffect::Broadcast {
                event: "reservation.checked_in",
                payload: json!({
                    "reservation_id": reservation_id,
                    "cabana_id": updated.cabana_id(),
                }),
            },
            SideEffect::Notify {
                user_id: updated.user_id(),
                title: "Checked in".into(),
                message: format!("Welcome! Your stay {} has begun", updated.span()),
            },
        ];
        Self::finish(tx, sink, effects)?;
        Ok(updated)
    }

    /// Checks a guest out, moving `CHECKED_IN` to the terminal
    /// `CHECKED_OUT` and stamping the departure audit fields.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Forbidden`] if the actor is not an administrator.
    /// - [`crate::Error::InvalidTransition`] if the reservation is not
    ///   `CHECKED_IN`.
    /// - [`crate::Error::Conflict`] if a concurrent transition won the race.
    pub fn check_out(&mut self, actor: &Actor, reservation_id: i64) -> Result<Reservation> {
        require_admin(actor, "check out")?;
        let sink = self.sink;
        let tx = self.begin()?;

        let reservation = database::require_reservation(&tx, reservation_id)?;
        ensure_status(&reservation, ReservationStatus::CheckedIn, "check out")?;

        let now = Utc::now();
        database::stamp_check_out(&tx, reservation_id, now, actor.id)?;
        database::update_status_checked(
            &tx,
            reservation_id,
            ReservationStatus::CheckedIn,
            ReservationStatus::CheckedOut,
        )?;
        database::append_history(
            &tx,
            reservation_id,
            Some(ReservationStatus::CheckedIn),
            ReservationStatus::CheckedOut,
            actor.id,
            None,
            now,
        )?;
        let updated = database::require_reservation(&tx, reservation_id)?;

        let effects = vec![
            SideEffect::Audit {
                actor_id: actor.id,
                action: "reservation.check_out",
                entity: "reservation",
                entity_id: reservation_id,
                old_value: Some(ReservationStatus::CheckedIn.to_string()),
                new_value: Some(ReservationStatus::CheckedOut.to_string()),
            },
            SideEffect::Broadcast {
                event: "reservation.checked_out",
                payload: json!({
                    "reservation_id": reservation_id,
                    "cabana_id": updated.cabana_id(),
                }),
            },
        ];
        Self::finish(tx, sink, effects)?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::lifecycle::test_util::{june, seeded_database};
    use crate::lifecycle::LogSink;
    use crate::Role;

    const GUEST: Actor = Actor::new(42, Role::Guest);
    const ADMIN: Actor = Actor::new(1, Role::Admin);

    fn approved_reservation() -> (crate::database::Database, i64) {
        let (mut db, cabana_id) = seeded_database();
        let sink = LogSink;
        let mut lifecycle = Lifecycle::new(&mut db, &sink);
        let reservation = lifecycle
            .create_reservation(&GUEST, cabana_id, "Ada", june("2025-06-10", "2025-06-13"))
            .unwrap();
        lifecycle.approve(&ADMIN, reservation.id()).unwrap();
        (db, reservation.id())
    }

    #[test]
    fn test_check_in_stamps_audit_fields() {
        let (mut db, reservation_id) = approved_reservation();
        let sink = LogSink;
        let mut lifecycle = Lifecycle::new(&mut db, &sink);

        let checked_in = lifecycle.check_in(&ADMIN, reservation_id).unwrap();
        assert_eq!(checked_in.status(), ReservationStatus::CheckedIn);
        assert!(checked_in.check_in_at().is_some());
        assert_eq!(checked_in.checked_in_by(), Some(ADMIN.id));
    }

    #[test]
    fn test_check_out_completes_the_stay() {
        let (mut db, reservation_id) = approved_reservation();
        let sink = LogSink;
        let mut lifecycle = Lifecycle::new(&mut db, &sink);

        lifecycle.check_in(&ADMIN, reservation_id).unwrap();
        let checked_out = lifecycle.check_out(&ADMIN, reservation_id).unwrap();
        assert_eq!(checked_out.status(), ReservationStatus::CheckedOut);
        assert!(checked_out.status().is_terminal());
        assert!(checked_out.check_out_at().is_some());
        assert_eq!(checked_out.checked_out_by(), Some(ADMIN.id));
    }

    #[test]
    fn test_check_out_without_check_in_fails() {
        let (mut db, reservation_id) = approved_reservation();
        let sink = LogSink;
        let mut lifecycle = Lifecycle::new(&mut db, &sink);

        let err = lifecycle.check_out(&ADMIN, reservation_id).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: ReservationStatus::Approved,
                event: "check out"
            }
        ));
    }

    #[test]
    fn test_check_in_requires_admin() {
        let (mut db, reservation_id) = approved_reservation();
        let sink = LogSink;
        let mut lifecycle = Lifecycle::new(&mut db, &sink);

        let err = lifecycle.check_in(&GUEST, reservation_id).unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));
    }
}
