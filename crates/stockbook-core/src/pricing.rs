//! # Pricing Module
//!
//! Recommended selling prices, marketplace fees and profit.
//!
//! ## Price Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Price Calculation Flow                               │
//! │                                                                         │
//! │  buying_price, markup                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  markup <= 99% ? ──yes──► final = buying / (1 - markup)   (margin)     │
//! │       │                                                                 │
//! │       no                                                                │
//! │       ▼                                                                 │
//! │  final = buying × (1 + markup)                            (cost-plus)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  admin_fee     = final × 13%                                           │
//! │  packaging_fee = final × 4%                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  profit = final - buying - admin_fee - packaging_fee                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! Every step works on integer minor units and rounds half away from zero,
//! the same rule [`Money::apply_rate`] uses. Fees are taken from the rounded
//! final price, and profit is the exact difference of the rounded parts.
//!
//! ## Example
//! ```rust
//! use stockbook_core::money::Money;
//! use stockbook_core::pricing;
//! use stockbook_core::types::Rate;
//!
//! let quote = pricing::quote(Money::from_cents(1_000_000), Rate::from_whole_percent(25))?;
//! assert_eq!(quote.final_price.cents(), 1_333_333);
//! assert_eq!(quote.admin_fee.cents(), 173_333);
//! assert_eq!(quote.packaging_fee.cents(), 53_333);
//! assert_eq!(quote.profit.cents(), 106_667);
//! # Ok::<(), stockbook_core::CoreError>(())
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, BPS_SCALE};
use crate::types::Rate;
use crate::validation::{validate_buying_price, validate_markup};
use crate::{ADMIN_FEE, DEFAULT_MARKUPS_PERCENT, MARGIN_MARKUP_LIMIT, PACKAGING_FEE};

// =============================================================================
// Result Types
// =============================================================================

/// Marketplace fees taken from a selling price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeBreakdown {
    pub admin_fee: Money,
    pub packaging_fee: Money,
    /// admin_fee + packaging_fee
    pub total: Money,
}

/// One row of the price recommendation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceQuote {
    pub buying_price: Money,
    pub markup: Rate,
    /// buying_price × markup, as shown next to the markup input.
    pub markup_amount: Money,
    pub final_price: Money,
    pub admin_fee: Money,
    pub packaging_fee: Money,
    pub profit: Money,
}

/// What is left of a selling price after marketplace fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceAnalysis {
    pub price: Money,
    pub admin_fee: Money,
    pub packaging_fee: Money,
    /// price - admin_fee - packaging_fee
    pub net: Money,
}

// =============================================================================
// Calculations
// =============================================================================

/// Recommended selling price for a buying price and markup.
///
/// Markups up to and including 99% are applied as a margin on the final
/// price; anything higher falls back to cost-plus. The switch is abrupt:
/// 99% yields 100× the buying price while 100% yields 2×. Callers that offer
/// free-form markups should be aware of it.
///
/// ## Errors
/// - `Validation` if `buying` is not positive or above `MAX_PRICE_CENTS`,
///   or `markup` is above `MAX_MARKUP`
/// - `AmountOverflow` if the price does not fit in minor units
///
/// ## Example
/// ```rust
/// use stockbook_core::money::Money;
/// use stockbook_core::pricing::recommended_price;
/// use stockbook_core::types::Rate;
///
/// let buying = Money::from_cents(1_000_000);
/// assert_eq!(recommended_price(buying, Rate::from_whole_percent(50))?.cents(), 2_000_000);
/// assert_eq!(recommended_price(buying, Rate::from_whole_percent(150))?.cents(), 2_500_000);
/// assert!(recommended_price(Money::zero(), Rate::from_whole_percent(50)).is_err());
/// # Ok::<(), stockbook_core::CoreError>(())
/// ```
pub fn recommended_price(buying: Money, markup: Rate) -> CoreResult<Money> {
    validate_buying_price(buying.cents())?;
    validate_markup(markup)?;

    let bps = markup.bps() as i128;
    let price = if markup <= MARGIN_MARKUP_LIMIT {
        // denominator is at least 100 bps here
        buying.checked_scale(BPS_SCALE, BPS_SCALE - bps)
    } else {
        buying.checked_scale(BPS_SCALE + bps, BPS_SCALE)
    };
    price.ok_or(CoreError::AmountOverflow {
        context: "recommended price",
    })
}

/// Admin (13%) and packaging (4%) fees on a selling price.
pub fn fee_breakdown(selling: Money) -> FeeBreakdown {
    let admin_fee = selling.apply_rate(ADMIN_FEE);
    let packaging_fee = selling.apply_rate(PACKAGING_FEE);
    FeeBreakdown {
        admin_fee,
        packaging_fee,
        total: admin_fee + packaging_fee,
    }
}

/// Profit on one unit: selling - buying - fees.
pub fn profit(selling: Money, buying: Money) -> Money {
    selling - buying - fee_breakdown(selling).total
}

/// Full quote for a single markup.
///
/// Fails the same way [`recommended_price`] does.
pub fn quote(buying: Money, markup: Rate) -> CoreResult<PriceQuote> {
    let final_price = recommended_price(buying, markup)?;
    let markup_amount = buying
        .checked_apply_rate(markup)
        .ok_or(CoreError::AmountOverflow {
            context: "markup amount",
        })?;
    let fees = fee_breakdown(final_price);
    Ok(PriceQuote {
        buying_price: buying,
        markup,
        markup_amount,
        final_price,
        admin_fee: fees.admin_fee,
        packaging_fee: fees.packaging_fee,
        profit: final_price - buying - fees.total,
    })
}

/// Quotes for every selected markup, lowest markup first.
///
/// Stops at the first markup that cannot be quoted.
pub fn quotes(buying: Money, selection: &MarkupSelection) -> CoreResult<Vec<PriceQuote>> {
    selection.iter().map(|markup| quote(buying, markup)).collect()
}

/// Breaks a selling price down into fees and what remains.
///
/// ## User Workflow
/// ```text
/// Owner types a marketplace price: Rp 20.000
///      │
///      ▼
/// analyze_price ← THIS FUNCTION
///      │
///      ▼
/// admin Rp 2.600 · packaging Rp 800 · net Rp 16.600
/// ```
pub fn analyze_price(selling: Money) -> PriceAnalysis {
    let fees = fee_breakdown(selling);
    PriceAnalysis {
        price: selling,
        admin_fee: fees.admin_fee,
        packaging_fee: fees.packaging_fee,
        net: selling - fees.total,
    }
}

// =============================================================================
// Markup Selection
// =============================================================================

/// The markups shown in the recommendation table.
///
/// Always sorted ascending with no duplicates. Persisted under the
/// `selectedMarkups` snapshot key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Rate>", into = "Vec<Rate>")]
pub struct MarkupSelection {
    markups: Vec<Rate>,
}

impl MarkupSelection {
    /// Builds a selection from any list of markups, sorting and de-duplicating.
    pub fn from_rates(mut markups: Vec<Rate>) -> Self {
        markups.sort_unstable();
        markups.dedup();
        MarkupSelection { markups }
    }

    /// Adds the markup if absent, removes it if present.
    pub fn toggle(&mut self, markup: Rate) {
        match self.markups.binary_search(&markup) {
            Ok(index) => {
                self.markups.remove(index);
            }
            Err(index) => self.markups.insert(index, markup),
        }
    }

    pub fn contains(&self, markup: Rate) -> bool {
        self.markups.binary_search(&markup).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Rate> + '_ {
        self.markups.iter().copied()
    }

    pub fn as_slice(&self) -> &[Rate] {
        &self.markups
    }

    pub fn len(&self) -> usize {
        self.markups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markups.is_empty()
    }
}

impl Default for MarkupSelection {
    /// 10%, 20%, … 90%
    fn default() -> Self {
        MarkupSelection::from_rates(
            DEFAULT_MARKUPS_PERCENT
                .iter()
                .map(|pct| Rate::from_whole_percent(*pct))
                .collect(),
        )
    }
}

impl From<Vec<Rate>> for MarkupSelection {
    fn from(markups: Vec<Rate>) -> Self {
        MarkupSelection::from_rates(markups)
    }
}

impl From<MarkupSelection> for Vec<Rate> {
    fn from(selection: MarkupSelection) -> Self {
        selection.markups
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::{MAX_MARKUP, MAX_PRICE_CENTS};

    fn pct(p: u32) -> Rate {
        Rate::from_whole_percent(p)
    }

    #[test]
    fn test_reference_scenario() {
        // Rp 10.000 at 25% markup
        let q = quote(Money::from_cents(1_000_000), pct(25)).unwrap();

        assert_eq!(q.final_price.cents(), 1_333_333);
        assert_eq!(q.admin_fee.cents(), 173_333);
        assert_eq!(q.packaging_fee.cents(), 53_333);
        assert_eq!(q.profit.cents(), 106_667);
        assert_eq!(q.markup_amount.cents(), 250_000);
    }

    #[test]
    fn test_profit_matches_quote() {
        let buying = Money::from_cents(1_000_000);
        let q = quote(buying, pct(25)).unwrap();
        assert_eq!(profit(q.final_price, buying), q.profit);
    }

    #[test]
    fn test_buying_price_must_be_positive() {
        for cents in [0, -1_000_000] {
            let err = recommended_price(Money::from_cents(cents), pct(25)).unwrap_err();
            assert_eq!(
                err,
                CoreError::Validation(ValidationError::MustBePositive {
                    field: "buying_price".to_string()
                })
            );
            assert!(quote(Money::from_cents(cents), pct(25)).is_err());
        }
    }

    #[test]
    fn test_out_of_range_inputs_are_errors() {
        let huge = Money::from_cents(i64::MAX / 2);
        assert!(matches!(
            quote(huge, pct(30)),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(matches!(
            recommended_price(Money::from_cents(1_000_000), Rate::from_bps(MAX_MARKUP.bps() + 1)),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(quotes(huge, &MarkupSelection::default()).is_err());
    }

    #[test]
    fn test_largest_inputs_still_quote() {
        let buying = Money::from_cents(MAX_PRICE_CENTS);

        let q = quote(buying, MAX_MARKUP).unwrap();
        assert_eq!(q.final_price.cents(), MAX_PRICE_CENTS * 11 - MAX_PRICE_CENTS / 100);
        assert_eq!(
            recommended_price(buying, pct(99)).unwrap().cents(),
            MAX_PRICE_CENTS * 100
        );
    }

    #[test]
    fn test_zero_markup_returns_buying_price() {
        let buying = Money::from_cents(754_321);
        assert_eq!(recommended_price(buying, Rate::zero()).unwrap(), buying);
    }

    #[test]
    fn test_margin_boundary_discontinuity() {
        // Pinned: 99% is still a margin, 100% is cost-plus.
        let buying = Money::from_cents(1_000_000);
        assert_eq!(recommended_price(buying, pct(99)).unwrap().cents(), 100_000_000);
        assert_eq!(recommended_price(buying, pct(100)).unwrap().cents(), 2_000_000);
        assert_eq!(
            recommended_price(buying, Rate::from_bps(9901)).unwrap().cents(),
            1_990_100
        );
    }

    #[test]
    fn test_final_price_exceeds_buying_and_grows_with_markup() {
        for buying_cents in [10_000_i64, 1_000_000, 12_345_678] {
            let buying = Money::from_cents(buying_cents);
            let mut previous = buying;
            for p in 1..=99 {
                let price = recommended_price(buying, pct(p)).unwrap();
                assert!(price > buying, "markup {}% on {}", p, buying);
                assert!(price > previous, "markup {}% on {}", p, buying);
                previous = price;
            }
        }
    }

    #[test]
    fn test_fee_breakdown() {
        let fees = fee_breakdown(Money::from_cents(2_000_000));
        assert_eq!(fees.admin_fee.cents(), 260_000);
        assert_eq!(fees.packaging_fee.cents(), 80_000);
        assert_eq!(fees.total.cents(), 340_000);
    }

    #[test]
    fn test_analyze_price() {
        let analysis = analyze_price(Money::from_cents(2_000_000));
        assert_eq!(analysis.net.cents(), 1_660_000);
        assert_eq!(analysis.price.cents(), 2_000_000);
    }

    #[test]
    fn test_quotes_follow_selection_order() {
        let selection = MarkupSelection::from_rates(vec![pct(50), pct(10)]);
        let rows = quotes(Money::from_cents(1_000_000), &selection).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].markup, pct(10));
        assert_eq!(rows[1].markup, pct(50));
        assert_eq!(rows[1].final_price.cents(), 2_000_000);
    }

    #[test]
    fn test_default_markup_selection() {
        let selection = MarkupSelection::default();
        assert_eq!(selection.len(), 9);
        assert_eq!(selection.as_slice().first(), Some(&pct(10)));
        assert_eq!(selection.as_slice().last(), Some(&pct(90)));
    }

    #[test]
    fn test_markup_toggle_keeps_sorted_unique() {
        let mut selection = MarkupSelection::default();

        selection.toggle(pct(30));
        assert!(!selection.contains(pct(30)));
        assert_eq!(selection.len(), 8);

        selection.toggle(pct(25));
        selection.toggle(pct(30));
        let values: Vec<u32> = selection.iter().map(|r| r.bps()).collect();
        let mut sorted = values.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(values, sorted);
        assert!(selection.contains(pct(25)));
    }

    #[test]
    fn test_markup_selection_json_normalizes() {
        let selection: MarkupSelection = serde_json::from_str("[5000, 1000, 5000]").unwrap();
        assert_eq!(selection.as_slice(), &[pct(10), pct(50)]);
        assert_eq!(serde_json::to_string(&selection).unwrap(), "[1000,5000]");
    }
}
