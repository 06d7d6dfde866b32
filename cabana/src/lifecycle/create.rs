//! Reservation creation.

use chrono::Utc;

use crate::actor::Actor;
use crate::database;
use crate::error::{Error, Result};
use crate::reservation::{Reservation, ReservationStatus};
use crate::span::DateSpan;

use super::{effects::SideEffect, Lifecycle};

impl Lifecycle<'_> {
    /// Creates a `PENDING` reservation owned by the acting user.
    ///
    /// The availability check runs inside the same transaction as the
    /// insert, so two concurrent creations for overlapping spans cannot
    /// both pass the overlap test against a stale snapshot.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the cabana does not exist or is archived.
    /// - [`Error::Unavailable`] listing every reason the span cannot be
    ///   booked.
    /// - [`Error::Validation`] if the guest name is blank.
    pub fn create_reservation(
        &mut self,
        actor: &Actor,
        cabana_id: i64,
        guest_name: &str,
        span: DateSpan,
    ) -> Result<Reservation> {
        let sink = self.sink;
        let tx = self.begin()?;

        let cabana = database::require_cabana(&tx, cabana_id)?;
        let blackouts = database::blackouts_for(&tx, cabana_id)?;
        let occupying = database::occupying_spans(&tx, cabana_id, None)?;
        let reasons = crate::availability::assess(&cabana, span, &blackouts, &occupying);
        if !reasons.is_empty() {
            return Err(Error::Unavailable { reasons });
        }

        let draft = Reservation::builder(cabana_id, actor.id, guest_name, span).build()?;
        let stored = database::insert_reservation(&tx, &draft)?;
        database::append_history(
            &tx,
            stored.id(),
            None,
            ReservationStatus::Pending,
            actor.id,
            None,
            Utc::now(),
        )?;

        let effects = vec![
            SideEffect::Audit {
                actor_id: actor.id,
                action: "reservation.create",
                entity: "reservation",
                entity_id: stored.id(),
                old_value: None,
                new_value: Some(ReservationStatus::Pending.to_string()),
            },
            SideEffect::NotifyAdmins {
                title: "New reservation request".into(),
                message: format!(
                    "Reservation {} for cabana {} over {}",
                    stored.id(),
                    cabana.name,
                    span
                ),
            },
        ];
        Self::finish(tx, sink, effects)?;

        log::debug!("created reservation {} for cabana {cabana_id}", stored.id());
        Ok(stored)
    }
}
