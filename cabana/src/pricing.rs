//! Date-range pricing engine.
//!
//! Pricing is a pure function of a catalog snapshot: given the price
//! calendar for a cabana, an optional concept, and requested extra items,
//! it produces an itemized breakdown or a typed error. It performs no I/O
//! and never mutates anything; the database layer loads the snapshot and
//! hands it here.
//!
//! There is no implicit base rate. A night with neither a point override
//! nor a covering range override fails closed, and every unpriced night is
//! reported in one response.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{Concept, Money, PricePoint, PriceRange, Product};
use crate::error::{Error, Result};
use crate::reservation::ExtraItem;
use crate::span::DateSpan;

/// The price sources for one cabana across a span.
///
/// Point overrides always beat range overrides. Among ranges covering a
/// day, the highest `priority` wins; on a tie, the highest id (most
/// recently created) wins, so resolution is totally ordered and never
/// silently ambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceCalendar {
    points: HashMap<NaiveDate, Money>,
    ranges: Vec<PriceRange>,
}

impl PriceCalendar {
    /// Builds a calendar from loaded overrides.
    #[must_use]
    pub fn new(points: Vec<PricePoint>, ranges: Vec<PriceRange>) -> Self {
        Self {
            points: points.into_iter().map(|p| (p.day, p.price)).collect(),
            ranges,
        }
    }

    /// An empty calendar with no overrides.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            points: HashMap::new(),
            ranges: Vec::new(),
        }
    }

    /// Resolves the daily price for one night, or `None` if unpriced.
    #[must_use]
    pub fn resolve(&self, day: NaiveDate) -> Option<Money> {
        if let Some(price) = self.points.get(&day) {
            return Some(*price);
        }
        self.ranges
            .iter()
            .filter(|r| r.span.contains(day))
            .max_by_key(|r| (r.priority, r.id))
            .map(|r| r.price)
    }
}

/// Everything the engine needs to price one stay, loaded at a single point
/// in catalog time.
#[derive(Debug, Clone)]
pub struct PricingSnapshot {
    /// The cabana's price calendar.
    pub calendar: PriceCalendar,
    /// The concept applied to the stay, if any.
    pub concept: Option<Concept>,
    /// Per-concept product price overrides, keyed by product id.
    pub concept_prices: HashMap<i64, Money>,
    /// The product catalog, keyed by product id.
    pub products: HashMap<i64, Product>,
}

/// One charged night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightLine {
    /// The night being charged.
    pub day: NaiveDate,
    /// The resolved daily price.
    pub price: Money,
}

/// One extra-item line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraLine {
    /// The product being purchased.
    pub product_id: i64,
    /// The purchased quantity.
    pub quantity: u32,
    /// The resolved unit price (concept override, else catalog sale price).
    pub unit_price: Money,
    /// `unit_price * quantity`.
    pub total: Money,
}

/// An itemized cost breakdown for one stay.
///
/// `total` always equals `subtotal_nights + concept_fee` plus the sum of
/// the extra line totals, in exact decimal arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// One line per charged night, in date order.
    pub nights: Vec<NightLine>,
    /// Sum of the nightly prices.
    pub subtotal_nights: Money,
    /// The concept's flat service fee, charged once per stay.
    pub concept_fee: Money,
    /// One line per requested extra item, in request order.
    pub extras: Vec<ExtraLine>,
    /// The grand total.
    pub total: Money,
}

impl PricingSnapshot {
    /// Prices a stay: nightly charges, concept fee, and extra items.
    ///
    /// Deterministic and side-effect free: identical inputs always yield an
    /// identical breakdown.
    ///
    /// # Errors
    ///
    /// - [`Error::UnpricedDates`] naming every night without a price source.
    /// - [`Error::UnknownProduct`] if an extra references a missing product.
    /// - [`Error::Validation`] if an extra quantity is zero.
    pub fn price_stay(&self, span: DateSpan, items: &[ExtraItem]) -> Result<PriceBreakdown> {
        let mut nights = Vec::with_capacity(usize::try_from(span.nights()).unwrap_or_default());
        let mut unpriced = Vec::new();

        for day in span.nights_iter() {
            match self.calendar.resolve(day) {
                Some(price) => nights.push(NightLine { day, price }),
                None => unpriced.push(day),
            }
        }

        if !unpriced.is_empty() {
            return Err(Error::UnpricedDates { dates: unpriced });
        }

        let subtotal_nights: Money = nights.iter().map(|n| n.price).sum();

        let concept_fee = self
            .concept
            .as_ref()
            .map_or(Decimal::ZERO, |c| c.service_fee);

        let mut extras = Vec::with_capacity(items.len());
        for item in items {
            extras.push(self.price_extra(*item)?);
        }

        let extras_total: Money = extras.iter().map(|e| e.total).sum();
        let total = subtotal_nights + concept_fee + extras_total;

        Ok(PriceBreakdown {
            nights,
            subtotal_nights,
            concept_fee,
            extras,
            total,
        })
    }

    /// Prices one extra item.
    ///
    /// # Errors
    ///
    /// See [`PricingSnapshot::price_stay`].
    pub fn price_extra(&self, item: ExtraItem) -> Result<ExtraLine> {
        if item.quantity == 0 {
            return Err(Error::Validation {
                field: "quantity".into(),
                message: format!(
                    "quantity for product {} must be a positive integer",
                    item.product_id
                ),
            });
        }

        let product = self
            .products
            .get(&item.product_id)
            .ok_or(Error::UnknownProduct {
                product_id: item.product_id,
            })?;

        let unit_price = self
            .concept_prices
            .get(&item.product_id)
            .copied()
            .unwrap_or(product.sale_price);

        Ok(ExtraLine {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price,
            total: unit_price * Decimal::from(item.quantity),
        })
    }
}
