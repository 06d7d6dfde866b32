//! Guest-initiated modification flows: cancellation requests and
//! extra-item requests, each resolved by an admin action that also drives
//! the parent reservation's status.

use chrono::Utc;

use crate::actor::Actor;
use crate::catalog::Money;
use crate::database;
use crate::error::{Error, Result};
use crate::reservation::{
    CancellationRequest, ExtraItem, ExtraRequest, RequestStatus, Reservation, ReservationStatus,
};

use super::{effects::SideEffect, ensure_status, require_admin, Lifecycle};

impl Lifecycle<'_> {
    /// Asks to cancel an `APPROVED` reservation, parking it in
    /// `MODIFICATION_PENDING` until an admin resolves the request.
    ///
    /// # Errors
    ///
    /// - [`Error::Forbidden`] if the actor does not own the reservation.
    /// - [`Error::InvalidTransition`] if the reservation is not
    ///   `APPROVED`.
    /// - [`Error::Validation`] if the reason is blank.
    pub fn request_cancellation(
        &mut self,
        actor: &Actor,
        reservation_id: i64,
        reason: &str,
    ) -> Result<CancellationRequest> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(Error::Validation {
                field: "reason".into(),
                message: "a cancellation reason is required".into(),
            });
        }

        let sink = self.sink;
        let tx = self.begin()?;

        let reservation = database::require_reservation(&tx, reservation_id)?;
        if !reservation.is_owned_by(actor.id) {
            return Err(Error::Forbidden {
                actor_id: actor.id,
                action: "request cancellation",
            });
        }
        ensure_status(&reservation, ReservationStatus::Approved, "request cancellation")?;

        let request =
            database::insert_cancellation_request(&tx, reservation_id, actor.id, reason, Utc::now())?;
        database::update_status_checked(
            &tx,
            reservation_id,
            ReservationStatus::Approved,
            ReservationStatus::ModificationPending,
        )?;
        database::append_history(
            &tx,
            reservation_id,
            Some(ReservationStatus::Approved),
            ReservationStatus::ModificationPending,
            actor.id,
            Some(reason),
            Utc::now(),
        )?;

        let effects = vec![
            SideEffect::Audit {
                actor_id: actor.id,
                action: "reservation.request_cancellation",
                entity: "cancellation_request",
                entity_id: request.id,
                old_value: None,
                new_value: Some(RequestStatus::Pending.to_string()),
            },
            SideEffect::NotifyAdmins {
                title: "Cancellation requested".into(),
                message: format!("Reservation {reservation_id}: {reason}"),
            },
        ];
        Self::finish(tx, sink, effects)?;
        Ok(request)
    }

    /// Resolves a pending cancellation request.
    ///
    /// Approval cancels the reservation; rejection restores it to
    /// `APPROVED`. The restoration is unconditional: the reservation held
    /// its claim on the calendar the whole time it sat in
    /// `MODIFICATION_PENDING`, so no re-validation is needed.
    ///
    /// # Errors
    ///
    /// - [`Error::Forbidden`] if the actor is not an administrator.
    /// - [`Error::NotFound`] if the request does not exist.
    /// - [`Error::Conflict`] if the request was already resolved.
    /// - [`Error::InvalidTransition`] if the reservation left
    ///   `MODIFICATION_PENDING`.
    pub fn resolve_cancellation(
        &mut self,
        actor: &Actor,
        request_id: i64,
        approve: bool,
    ) -> Result<Reservation> {
        require_admin(actor, "resolve cancellation")?;
        let sink = self.sink;
        let tx = self.begin()?;

        let request = database::get_cancellation_request(&tx, request_id)?.ok_or(Error::NotFound {
            entity: "cancellation request",
            id: request_id,
        })?;
        let reservation = database::require_reservation(&tx, request.reservation_id)?;
        ensure_status(
            &reservation,
            ReservationStatus::ModificationPending,
            "resolve cancellation",
        )?;

        let (request_status, next) = if approve {
            (RequestStatus::Approved, ReservationStatus::Cancelled)
        } else {
            (RequestStatus::Rejected, ReservationStatus::Approved)
        };

        database::resolve_cancellation_request(&tx, request_id, request_status, Utc::now(), actor.id)?;
        database::update_status_checked(
            &tx,
            request.reservation_id,
            ReservationStatus::ModificationPending,
            next,
        )?;
        database::append_history(
            &tx,
            request.reservation_id,
            Some(ReservationStatus::ModificationPending),
            next,
            actor.id,
            Some(&request.reason),
            Utc::now(),
        )?;
        let updated = database::require_reservation(&tx, request.reservation_id)?;

        let mut effects = vec![SideEffect::Audit {
            actor_id: actor.id,
            action: "reservation.resolve_cancellation",
            entity: "cancellation_request",
            entity_id: request_id,
            old_value: Some(RequestStatus::Pending.to_string()),
            new_value: Some(request_status.to_string()),
        }];
        if approve {
            effects.push(SideEffect::Notify {
                user_id: updated.user_id(),
                title: "Reservation cancelled".into(),
                message: format!("Your reservation for {} was cancelled", updated.span()),
            });
        }
        Self::finish(tx, sink, effects)?;
        Ok(updated)
    }

    /// Asks to add extra items to an `APPROVED` reservation, parking it in
    /// `EXTRA_PENDING` until an admin resolves the request.
    ///
    /// # Errors
    ///
    /// - [`Error::Forbidden`] if the actor does not own the reservation.
    /// - [`Error::InvalidTransition`] if the reservation is not
    ///   `APPROVED`.
    /// - [`Error::Validation`] if no items are given or any quantity is
    ///   zero.
    pub fn request_extra_items(
        &mut self,
        actor: &Actor,
        reservation_id: i64,
        items: &[ExtraItem],
    ) -> Result<ExtraRequest> {
        if items.is_empty() {
            return Err(Error::Validation {
                field: "items".into(),
                message: "at least one extra item is required".into(),
            });
        }
        if items.iter().any(|item| item.quantity == 0) {
            return Err(Error::Validation {
                field: "quantity".into(),
                message: "extra item quantities must be positive".into(),
            });
        }

        let sink = self.sink;
        let tx = self.begin()?;

        let reservation = database::require_reservation(&tx, reservation_id)?;
        if !reservation.is_owned_by(actor.id) {
            return Err(Error::Forbidden {
                actor_id: actor.id,
                action: "request extra items",
            });
        }
        ensure_status(&reservation, ReservationStatus::Approved, "request extra items")?;

        let request =
            database::insert_extra_request(&tx, reservation_id, actor.id, items, Utc::now())?;
        database::update_status_checked(
            &tx,
            reservation_id,
            ReservationStatus::Approved,
            ReservationStatus::ExtraPending,
        )?;
        database::append_history(
            &tx,
            reservation_id,
            Some(ReservationStatus::Approved),
            ReservationStatus::ExtraPending,
            actor.id,
            None,
            Utc::now(),
        )?;

        let effects = vec![
            SideEffect::Audit {
                actor_id: actor.id,
                action: "reservation.request_extras",
                entity: "extra_request",
                entity_id: request.id,
                old_value: None,
                new_value: Some(RequestStatus::Pending.to_string()),
            },
            SideEffect::NotifyAdmins {
                title: "Extra items requested".into(),
                message: format!(
                    "Reservation {reservation_id}: {} item(s) requested",
                    items.len()
                ),
            },
        ];
        Self::finish(tx, sink, effects)?;
        Ok(request)
    }

    /// Resolves a pending extra-items request.
    ///
    /// Approval prices the new items from the current catalog, adds the
    /// previously approved lines at their stamped unit prices, and persists
    /// the new lines plus the updated total. Rejection restores `APPROVED`
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::Forbidden`] if the actor is not an administrator.
    /// - [`Error::NotFound`] if the request does not exist.
    /// - [`Error::Conflict`] if the request was already resolved.
    /// - [`Error::InvalidTransition`] if the reservation left
    ///   `EXTRA_PENDING`.
    /// - [`Error::UnpricedDates`] or [`Error::UnknownProduct`] if the
    ///   re-pricing fails; the whole resolution rolls back.
    pub fn resolve_extra_items(
        &mut self,
        actor: &Actor,
        request_id: i64,
        approve: bool,
    ) -> Result<Reservation> {
        require_admin(actor, "resolve extra items")?;
        let sink = self.sink;
        let tx = self.begin()?;

        let request = database::get_extra_request(&tx, request_id)?.ok_or(Error::NotFound {
            entity: "extra request",
            id: request_id,
        })?;
        let reservation = database::require_reservation(&tx, request.reservation_id)?;
        ensure_status(&reservation, ReservationStatus::ExtraPending, "resolve extra items")?;

        let (request_status, effect_title) = if approve {
            let cabana = database::require_cabana(&tx, reservation.cabana_id())?;
            let snapshot = database::load_pricing_snapshot(
                &tx,
                cabana.id,
                cabana.concept_id,
                reservation.span(),
            )?;
            // Only the new items are priced from the current catalog;
            // already-approved lines keep their stamped unit prices.
            let breakdown = snapshot.price_stay(reservation.span(), &request.items)?;
            let stamped: Money = database::load_extra_lines(&tx, request.reservation_id)?
                .iter()
                .map(|line| line.total)
                .sum();

            database::insert_extra_items(&tx, request.reservation_id, &breakdown.extras)?;
            database::set_total_price(&tx, request.reservation_id, breakdown.total + stamped)?;

            (RequestStatus::Approved, "Extra items approved")
        } else {
            (RequestStatus::Rejected, "Extra items rejected")
        };

        database::resolve_extra_request(&tx, request_id, request_status, Utc::now(), actor.id)?;
        database::update_status_checked(
            &tx,
            request.reservation_id,
            ReservationStatus::ExtraPending,
            ReservationStatus::Approved,
        )?;
        database::append_history(
            &tx,
            request.reservation_id,
            Some(ReservationStatus::ExtraPending),
            ReservationStatus::Approved,
            actor.id,
            None,
            Utc::now(),
        )?;
        let updated = database::require_reservation(&tx, request.reservation_id)?;

        let effects = vec![
            SideEffect::Audit {
                actor_id: actor.id,
                action: "reservation.resolve_extras",
                entity: "extra_request",
                entity_id: request_id,
                old_value: Some(RequestStatus::Pending.to_string()),
                new_value: Some(request_status.to_string()),
            },
            SideEffect::Notify {
                user_id: updated.user_id(),
                title: effect_title.into(),
                message: format!("Reservation {} was updated", updated.id()),
            },
        ];
        Self::finish(tx, sink, effects)?;
        Ok(updated)
    }
}
