//! Date span types for nightly stays.
//!
//! This module provides the half-open `[start, end)` date span used by
//! reservations, price ranges, and blackout windows, including overlap
//! testing and per-night iteration.

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize};

/// A half-open date span `[start, end)`.
///
/// The end date is checkout: it is never charged and never occupied. A span
/// always covers at least one night (`start < end`).
///
/// # Examples
///
/// ```
/// use cabana::DateSpan;
///
/// let start = "2025-06-10".parse().unwrap();
/// let end = "2025-06-13".parse().unwrap();
/// let span = DateSpan::new(start, end).unwrap();
///
/// assert_eq!(span.nights(), 3);
/// assert!(span.contains("2025-06-12".parse().unwrap()));
/// assert!(!span.contains(end));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateSpan {
    start: NaiveDate,
    end: NaiveDate,
}

// Deserialization funnels through `new` so the `start < end` invariant
// holds for every constructed span, not only programmatic ones.
impl<'de> Deserialize<'de> for DateSpan {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            start: NaiveDate,
            end: NaiveDate,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.start, raw.end).map_err(de::Error::custom)
    }
}

impl DateSpan {
    /// Creates a new date span.
    ///
    /// # Errors
    ///
    /// Returns an error if `start` is not strictly before `end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cabana::DateSpan;
    ///
    /// let start = "2025-06-10".parse().unwrap();
    /// let end = "2025-06-13".parse().unwrap();
    /// assert!(DateSpan::new(start, end).is_ok());
    ///
    /// // Zero-night spans are invalid
    /// assert!(DateSpan::new(start, start).is_err());
    /// ```
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidDateSpanError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(InvalidDateSpanError {
                start,
                end,
                reason: "start must be strictly before end".into(),
            })
        }
    }

    /// Returns the first occupied night.
    #[must_use]
    pub const fn start(self) -> NaiveDate {
        self.start
    }

    /// Returns the checkout date (exclusive).
    #[must_use]
    pub const fn end(self) -> NaiveDate {
        self.end
    }

    /// Returns the number of nights covered by the span.
    ///
    /// # Examples
    ///
    /// ```
    /// use cabana::DateSpan;
    ///
    /// let span = DateSpan::new(
    ///     "2025-06-10".parse().unwrap(),
    ///     "2025-06-13".parse().unwrap(),
    /// ).unwrap();
    /// assert_eq!(span.nights(), 3);
    /// ```
    #[must_use]
    pub fn nights(self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Returns `true` if the given day falls inside the span.
    ///
    /// The checkout date is outside the span.
    #[must_use]
    pub fn contains(self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }

    /// Returns `true` if two spans share at least one night.
    ///
    /// Uses the half-open interval test `a.start < b.end && b.start < a.end`,
    /// so a span starting on another's checkout date does not overlap it.
    ///
    /// # Examples
    ///
    /// ```
    /// use cabana::DateSpan;
    ///
    /// let a = DateSpan::new(
    ///     "2025-06-10".parse().unwrap(),
    ///     "2025-06-13".parse().unwrap(),
    /// ).unwrap();
    /// let b = DateSpan::new(
    ///     "2025-06-13".parse().unwrap(),
    ///     "2025-06-15".parse().unwrap(),
    /// ).unwrap();
    ///
    /// // Back-to-back stays do not conflict
    /// assert!(!a.overlaps(b));
    /// ```
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Iterates over every occupied night in the span.
    pub fn nights_iter(self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.nights()).map(move |offset| {
            // Offsets are bounded by nights(), which fits in u64
            start + Days::new(offset.unsigned_abs())
        })
    }
}

impl fmt::Display for DateSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Error type for invalid date spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDateSpanError {
    /// The start date of the invalid span.
    pub start: NaiveDate,
    /// The end date of the invalid span.
    pub end: NaiveDate,
    /// The reason the span is invalid.
    pub reason: String,
}

impl fmt::Display for InvalidDateSpanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid date span {}..{}: {}",
            self.start, self.end, self.reason
        )
    }
}

impl std::error::Error for InvalidDateSpanError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn span(start: &str, end: &str) -> DateSpan {
        DateSpan::new(date(start), date(end)).unwrap()
    }

    #[test]
    fn test_span_rejects_reversed_dates() {
        let result = DateSpan::new(date("2025-06-13"), date("2025-06-10"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.reason.contains("strictly before"));
    }

    #[test]
    fn test_span_rejects_zero_nights() {
        assert!(DateSpan::new(date("2025-06-10"), date("2025-06-10")).is_err());
    }

    #[test]
    fn test_nights_count() {
        assert_eq!(span("2025-06-10", "2025-06-11").nights(), 1);
        assert_eq!(span("2025-06-10", "2025-06-13").nights(), 3);
        assert_eq!(span("2025-01-01", "2026-01-01").nights(), 365);
    }

    #[test]
    fn test_contains_excludes_checkout() {
        let s = span("2025-06-10", "2025-06-13");
        assert!(s.contains(date("2025-06-10")));
        assert!(s.contains(date("2025-06-12")));
        assert!(!s.contains(date("2025-06-13")));
        assert!(!s.contains(date("2025-06-09")));
    }

    #[test]
    fn test_overlap_half_open() {
        let a = span("2025-06-10", "2025-06-13");
        let b = span("2025-06-12", "2025-06-15");
        let c = span("2025-06-13", "2025-06-15");

        assert!(a.overlaps(b));
        assert!(b.overlaps(a));
        assert!(!a.overlaps(c));
        assert!(!c.overlaps(a));
    }

    #[test]
    fn test_overlap_containment() {
        let outer = span("2025-06-01", "2025-06-30");
        let inner = span("2025-06-10", "2025-06-12");
        assert!(outer.overlaps(inner));
        assert!(inner.overlaps(outer));
    }

    #[test]
    fn test_nights_iter_enumerates_occupied_nights() {
        let s = span("2025-06-10", "2025-06-13");
        let nights: Vec<NaiveDate> = s.nights_iter().collect();
        assert_eq!(
            nights,
            vec![
                date("2025-06-10"),
                date("2025-06-11"),
                date("2025-06-12"),
            ]
        );
    }

    #[test]
    fn test_display() {
        let s = span("2025-06-10", "2025-06-13");
        assert_eq!(format!("{s}"), "2025-06-10..2025-06-13");
    }

    #[test]
    fn test_serde_round_trip() {
        let s = span("2025-06-10", "2025-06-13");
        let json = serde_json::to_string(&s).unwrap();
        let back: DateSpan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_deserialize_rejects_invalid_span() {
        let reversed = r#"{"start":"2025-06-13","end":"2025-06-10"}"#;
        assert!(serde_json::from_str::<DateSpan>(reversed).is_err());

        let empty = r#"{"start":"2025-06-10","end":"2025-06-10"}"#;
        assert!(serde_json::from_str::<DateSpan>(empty).is_err());
    }

    // Property-based tests for the half-open interval arithmetic
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn span_strategy() -> impl Strategy<Value = DateSpan> {
            (0i64..365, 1i64..60).prop_map(|(offset, nights)| {
                let start = date("2025-01-01") + Days::new(offset.unsigned_abs());
                let end = start + Days::new(nights.unsigned_abs());
                DateSpan::new(start, end).unwrap()
            })
        }

        proptest! {
            // PROPERTY: overlap is symmetric
            #[test]
            fn prop_overlap_is_symmetric(a in span_strategy(), b in span_strategy()) {
                prop_assert_eq!(a.overlaps(b), b.overlaps(a));
            }

            // PROPERTY: every span overlaps itself
            #[test]
            fn prop_span_overlaps_itself(a in span_strategy()) {
                prop_assert!(a.overlaps(a));
            }

            // PROPERTY: abutting spans never overlap
            #[test]
            fn prop_abutting_spans_do_not_overlap(a in span_strategy(), nights in 1i64..60) {
                let next = DateSpan::new(a.end(), a.end() + Days::new(nights.unsigned_abs()))
                    .unwrap();
                prop_assert!(!a.overlaps(next));
                prop_assert!(!next.overlaps(a));
            }

            // PROPERTY: nights() equals the count of nights_iter()
            #[test]
            fn prop_nights_matches_iteration(a in span_strategy()) {
                prop_assert_eq!(a.nights(), i64::try_from(a.nights_iter().count()).unwrap());
            }
        }
    }
}
