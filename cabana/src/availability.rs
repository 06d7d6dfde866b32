//! Availability checking for cabana date spans.
//!
//! The assessment itself is a pure function over loaded inputs; the
//! database layer loads those inputs inside the same transaction as the
//! reservation write so the check-then-act window is closed.
//!
//! Mirroring the pricing engine's policy, every violated constraint is
//! reported at once rather than failing on the first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{Blackout, Cabana};
use crate::span::DateSpan;

/// One reason a cabana is not bookable for a span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnavailableReason {
    /// The cabana's `open_for_reservation` flag is off.
    NotOpenForReservation,
    /// The span intersects an active blackout window.
    Blackout {
        /// The blackout's span.
        span: DateSpan,
        /// The blackout's stated reason.
        reason: String,
        /// Whether the blackout applies venue-wide.
        venue_wide: bool,
    },
    /// Another occupying reservation overlaps the span.
    Overlap {
        /// The conflicting reservation.
        reservation_id: i64,
        /// The conflicting reservation's span.
        span: DateSpan,
    },
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOpenForReservation => write!(f, "cabana is not open for reservation"),
            Self::Blackout {
                span,
                reason,
                venue_wide,
            } => {
                let scope = if *venue_wide { "venue-wide " } else { "" };
                write!(f, "{scope}blackout {span}: {reason}")
            }
            Self::Overlap {
                reservation_id,
                span,
            } => write!(f, "overlaps reservation {reservation_id} ({span})"),
        }
    }
}

/// Assesses whether a cabana is bookable for a span.
///
/// `occupying` holds `(reservation_id, span)` pairs for this cabana's
/// reservations in an occupying status; callers may pre-exclude the
/// reservation currently being transitioned. Blackouts may include
/// venue-wide windows (no cabana scope) and windows scoped to other
/// cabanas; the latter are ignored here.
///
/// Returns an empty vector when the span is bookable.
///
/// # Examples
///
/// ```
/// use cabana::availability::assess;
/// use cabana::{Cabana, CabanaStatus, DateSpan};
///
/// let cabana = Cabana {
///     id: 1,
///     name: "C101".into(),
///     class_id: 1,
///     concept_id: None,
///     status: CabanaStatus::Available,
///     open_for_reservation: true,
/// };
/// let span = DateSpan::new(
///     "2025-06-10".parse().unwrap(),
///     "2025-06-13".parse().unwrap(),
/// ).unwrap();
///
/// assert!(assess(&cabana, span, &[], &[]).is_empty());
/// ```
#[must_use]
pub fn assess(
    cabana: &Cabana,
    span: DateSpan,
    blackouts: &[Blackout],
    occupying: &[(i64, DateSpan)],
) -> Vec<UnavailableReason> {
    let mut reasons = Vec::new();

    if !cabana.open_for_reservation {
        reasons.push(UnavailableReason::NotOpenForReservation);
    }

    for blackout in blackouts {
        let applies = blackout.cabana_id.is_none() || blackout.cabana_id == Some(cabana.id);
        if applies && blackout.span.overlaps(span) {
            reasons.push(UnavailableReason::Blackout {
                span: blackout.span,
                reason: blackout.reason.clone(),
                venue_wide: blackout.cabana_id.is_none(),
            });
        }
    }

    for &(reservation_id, other) in occupying {
        if other.overlaps(span) {
            reasons.push(UnavailableReason::Overlap {
                reservation_id,
                span: other,
            });
        }
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CabanaStatus;

    fn span(start: &str, end: &str) -> DateSpan {
        DateSpan::new(start.parse().unwrap(), end.parse().unwrap()).unwrap()
    }

    fn cabana(open: bool) -> Cabana {
        Cabana {
            id: 1,
            name: "C101".into(),
            class_id: 1,
            concept_id: None,
            status: CabanaStatus::Available,
            open_for_reservation: open,
        }
    }

    fn blackout(cabana_id: Option<i64>, start: &str, end: &str) -> Blackout {
        Blackout {
            id: 1,
            cabana_id,
            span: span(start, end),
            reason: "maintenance".into(),
        }
    }

    #[test]
    fn test_bookable_when_no_constraints() {
        let reasons = assess(&cabana(true), span("2025-06-10", "2025-06-13"), &[], &[]);
        assert!(reasons.is_empty());
    }

    #[test]
    fn test_closed_flag_blocks() {
        let reasons = assess(&cabana(false), span("2025-06-10", "2025-06-13"), &[], &[]);
        assert_eq!(reasons, vec![UnavailableReason::NotOpenForReservation]);
    }

    #[test]
    fn test_scoped_blackout_blocks() {
        let reasons = assess(
            &cabana(true),
            span("2025-06-10", "2025-06-13"),
            &[blackout(Some(1), "2025-06-12", "2025-06-14")],
            &[],
        );
        assert_eq!(reasons.len(), 1);
        assert!(matches!(
            reasons[0],
            UnavailableReason::Blackout { venue_wide: false, .. }
        ));
    }

    #[test]
    fn test_venue_wide_blackout_blocks() {
        let reasons = assess(
            &cabana(true),
            span("2025-06-10", "2025-06-13"),
            &[blackout(None, "2025-06-01", "2025-06-30")],
            &[],
        );
        assert!(matches!(
            reasons[0],
            UnavailableReason::Blackout { venue_wide: true, .. }
        ));
    }

    #[test]
    fn test_blackout_for_other_cabana_ignored() {
        let reasons = assess(
            &cabana(true),
            span("2025-06-10", "2025-06-13"),
            &[blackout(Some(2), "2025-06-01", "2025-06-30")],
            &[],
        );
        assert!(reasons.is_empty());
    }

    #[test]
    fn test_non_overlapping_blackout_ignored() {
        let reasons = assess(
            &cabana(true),
            span("2025-06-10", "2025-06-13"),
            &[blackout(Some(1), "2025-06-13", "2025-06-20")],
            &[],
        );
        assert!(reasons.is_empty());
    }

    #[test]
    fn test_overlapping_reservation_blocks() {
        let reasons = assess(
            &cabana(true),
            span("2025-06-10", "2025-06-13"),
            &[],
            &[(7, span("2025-06-12", "2025-06-15"))],
        );
        assert_eq!(
            reasons,
            vec![UnavailableReason::Overlap {
                reservation_id: 7,
                span: span("2025-06-12", "2025-06-15"),
            }]
        );
    }

    #[test]
    fn test_back_to_back_reservation_allowed() {
        let reasons = assess(
            &cabana(true),
            span("2025-06-10", "2025-06-13"),
            &[],
            &[(7, span("2025-06-13", "2025-06-15"))],
        );
        assert!(reasons.is_empty());
    }

    #[test]
    fn test_all_reasons_collected_at_once() {
        let reasons = assess(
            &cabana(false),
            span("2025-06-10", "2025-06-13"),
            &[blackout(None, "2025-06-01", "2025-06-30")],
            &[(7, span("2025-06-11", "2025-06-12"))],
        );
        assert_eq!(reasons.len(), 3);
    }
}
