//! Storage codecs for domain values.
//!
//! Days and timestamps are stored as ISO-8601 TEXT and money as decimal
//! TEXT. Decode failures surface as conversion errors rather than
//! defaulting, so storage corruption is never papered over.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::catalog::Money;
use crate::reservation::{RequestStatus, ReservationStatus};
use crate::span::DateSpan;

const DAY_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn day_to_sql(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

pub(crate) fn day_from_sql(text: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DAY_FORMAT)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub(crate) fn span_from_sql(start: &str, end: &str) -> rusqlite::Result<DateSpan> {
    let span = DateSpan::new(day_from_sql(start)?, day_from_sql(end)?)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    Ok(span)
}

pub(crate) fn money_to_sql(amount: Money) -> String {
    amount.to_string()
}

pub(crate) fn money_from_sql(text: &str) -> rusqlite::Result<Money> {
    Decimal::from_str(text).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub(crate) fn timestamp_to_sql(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

pub(crate) fn timestamp_from_sql(text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub(crate) fn reservation_status_from_sql(text: &str) -> rusqlite::Result<ReservationStatus> {
    ReservationStatus::parse(text).map_err(|msg| rusqlite::Error::ToSqlConversionFailure(msg.into()))
}

pub(crate) fn request_status_from_sql(text: &str) -> rusqlite::Result<RequestStatus> {
    RequestStatus::parse(text).map_err(|msg| rusqlite::Error::ToSqlConversionFailure(msg.into()))
}
