//! # Document Totals Engine
//!
//! Derives subtotal, VAT total and grand total from a document's line items
//! and its document-level discount.
//!
//! ## The Discount-Ratio Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. raw_subtotal    = Σ quantity × unit_price            (all lines)    │
//! │  2. subtotal        = max(0, raw_subtotal - discount)    (silent cap)   │
//! │  3. ratio           = subtotal / raw_subtotal            (1 if raw = 0) │
//! │  4. line_tax        = (line_ht × ratio) × rate / 100     (per line)     │
//! │  5. tax_total       = Σ line_tax                                        │
//! │  6. total           = subtotal + tax_total                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The absolute discount is pro-rated uniformly across lines by the ratio,
//! so VAT is computed on the DISCOUNTED base without storing a per-line
//! discounted amount. This is the easy part to get wrong: computing VAT on
//! the raw base and then subtracting the discount overstates the tax.
//!
//! No intermediate rounding anywhere; see [`crate::money::Money::rounded`].
//!
//! Any renderer that needs a per-rate VAT table (PDF export, dashboards)
//! must use [`tax_breakdown`] rather than re-deriving tax with its own
//! semantics, so printed totals always match the editor.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{Money, TaxRate};
use crate::types::LineItem;

// =============================================================================
// Totals
// =============================================================================

/// The three monetary outputs of a totals computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Pre-tax amount after the discount cap: `max(0, Σ qty×price - discount)`.
    pub subtotal: Money,
    /// Sum of per-line VAT computed on the discounted base.
    pub tax_total: Money,
    /// `subtotal + tax_total`.
    pub total: Money,
}

impl DocumentTotals {
    /// All-zero totals (an empty document).
    pub fn zero() -> Self {
        DocumentTotals::default()
    }
}

/// One row of a per-rate VAT table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxLine {
    pub rate: TaxRate,
    /// Discounted pre-tax base taxed at this rate.
    pub base: Money,
    /// VAT amount for this rate.
    pub amount: Money,
}

// =============================================================================
// Engine
// =============================================================================

/// Computes document totals from line items and an absolute discount.
///
/// Order of operations is contractual:
/// - the discount is capped so the subtotal never goes negative, silently;
/// - the ratio divides the discounted by the raw subtotal when the raw
///   subtotal is positive, and is `1` otherwise (empty documents and
///   all-credit documents skip pro-ration);
/// - each line's VAT is computed on its pro-rated discounted amount.
///
/// Pure function: same lines + same discount → same totals.
pub fn compute(lines: &[LineItem], discount: Money) -> DocumentTotals {
    let raw_subtotal = lines
        .iter()
        .fold(Money::zero(), |acc, line| acc + line.line_total());

    let subtotal = Money::zero().max(raw_subtotal - discount);
    let ratio = discount_ratio(raw_subtotal, subtotal);

    let tax_total = lines.iter().fold(Money::zero(), |acc, line| {
        let discounted_ht = line.line_total() * ratio;
        acc + discounted_ht.tax_at(line.tax_rate)
    });

    DocumentTotals {
        subtotal,
        tax_total,
        total: subtotal + tax_total,
    }
}

/// Per-rate VAT table over the SAME discounted bases as [`compute`].
///
/// Rows are sorted by ascending rate. The row amounts sum exactly to
/// `compute(lines, discount).tax_total`.
pub fn tax_breakdown(lines: &[LineItem], discount: Money) -> Vec<TaxLine> {
    let raw_subtotal = lines
        .iter()
        .fold(Money::zero(), |acc, line| acc + line.line_total());
    let subtotal = Money::zero().max(raw_subtotal - discount);
    let ratio = discount_ratio(raw_subtotal, subtotal);

    let mut by_rate: BTreeMap<TaxRate, (Money, Money)> = BTreeMap::new();
    for line in lines {
        let discounted_ht = line.line_total() * ratio;
        let tax = discounted_ht.tax_at(line.tax_rate);
        let entry = by_rate
            .entry(line.tax_rate)
            .or_insert((Money::zero(), Money::zero()));
        entry.0 += discounted_ht;
        entry.1 += tax;
    }

    by_rate
        .into_iter()
        .map(|(rate, (base, amount))| TaxLine { rate, base, amount })
        .collect()
}

/// Fraction of the pre-discount value each line retains.
fn discount_ratio(raw_subtotal: Money, subtotal: Money) -> Decimal {
    if raw_subtotal.is_positive() {
        subtotal.amount() / raw_subtotal.amount()
    } else {
        Decimal::ONE
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewLineItem;
    use rust_decimal_macros::dec;

    fn line(qty: Decimal, price: Decimal, rate_percent: Decimal, position: i64) -> LineItem {
        LineItem::new(
            NewLineItem {
                description: format!("Line {position}"),
                quantity: qty,
                unit: None,
                unit_price: Money::new(price),
                tax_rate: TaxRate::from_percent(rate_percent),
            },
            position,
        )
    }

    #[test]
    fn test_no_discount() {
        // (2 × 100 @ 20%) + (1 × 50 @ 10%) → 250 / 45 / 295
        let lines = vec![
            line(dec!(2), dec!(100), dec!(20), 0),
            line(dec!(1), dec!(50), dec!(10), 1),
        ];
        let totals = compute(&lines, Money::zero());

        assert_eq!(totals.subtotal.amount(), dec!(250));
        assert_eq!(totals.tax_total.amount(), dec!(45));
        assert_eq!(totals.total.amount(), dec!(295));
    }

    #[test]
    fn test_discount_prorated_across_lines() {
        // raw 200, discount 50 → subtotal 150, ratio 0.75
        // line 1: 100 × 0.75 = 75 @ 20% → 15
        // line 2: 100 × 0.75 = 75 @ 0%  → 0
        let lines = vec![
            line(dec!(1), dec!(100), dec!(20), 0),
            line(dec!(1), dec!(100), dec!(0), 1),
        ];
        let totals = compute(&lines, Money::from_major(50));

        assert_eq!(totals.subtotal.amount(), dec!(150));
        assert_eq!(totals.tax_total.amount(), dec!(15));
        assert_eq!(totals.total.amount(), dec!(165));
    }

    #[test]
    fn test_tax_on_discounted_base_not_raw() {
        // The classic miscoding computes VAT on the raw subtotal and then
        // subtracts the discount: 200 @ 20% = 40 tax. Correct is 30.
        let lines = vec![line(dec!(2), dec!(100), dec!(20), 0)];
        let totals = compute(&lines, Money::from_major(50));

        assert_eq!(totals.subtotal.amount(), dec!(150));
        assert_eq!(totals.tax_total.amount(), dec!(30));
        assert_eq!(totals.total.amount(), dec!(180));
    }

    #[test]
    fn test_discount_capped_at_zero() {
        let lines = vec![
            line(dec!(1), dec!(150), dec!(20), 0),
            line(dec!(1), dec!(50), dec!(10), 1),
        ];
        let totals = compute(&lines, Money::from_major(1000));

        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.tax_total, Money::zero());
        assert_eq!(totals.total, Money::zero());
    }

    #[test]
    fn test_empty_document_no_division_by_zero() {
        let totals = compute(&[], Money::zero());
        assert_eq!(totals, DocumentTotals::zero());

        // Even with a discount on an empty document.
        let totals = compute(&[], Money::from_major(40));
        assert_eq!(totals, DocumentTotals::zero());
    }

    #[test]
    fn test_fractional_quantities_exact() {
        // 2.5 m² × 48.30 @ 10% = 120.75 HT, 12.075 VAT
        let lines = vec![line(dec!(2.5), dec!(48.30), dec!(10), 0)];
        let totals = compute(&lines, Money::zero());

        assert_eq!(totals.subtotal.amount(), dec!(120.750));
        assert_eq!(totals.tax_total.amount(), dec!(12.0750));
        assert_eq!(totals.total.amount(), dec!(132.8250));
        // Presentation rounding happens at the edge, once.
        assert_eq!(totals.total.rounded().amount(), dec!(132.83));
    }

    #[test]
    fn test_negative_line_acts_as_credit() {
        // Credit lines pass through the arithmetic untouched (policy Allow).
        let lines = vec![
            line(dec!(1), dec!(100), dec!(20), 0),
            line(dec!(-1), dec!(30), dec!(20), 1),
        ];
        let totals = compute(&lines, Money::zero());

        assert_eq!(totals.subtotal.amount(), dec!(70));
        assert_eq!(totals.tax_total.amount(), dec!(14));
        assert_eq!(totals.total.amount(), dec!(84));
    }

    #[test]
    fn test_breakdown_groups_by_rate() {
        let lines = vec![
            line(dec!(1), dec!(100), dec!(20), 0),
            line(dec!(2), dec!(50), dec!(20), 1),
            line(dec!(1), dec!(80), dec!(5.5), 2),
        ];
        let breakdown = tax_breakdown(&lines, Money::zero());

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].rate, TaxRate::reduced());
        assert_eq!(breakdown[0].base.amount(), dec!(80));
        assert_eq!(breakdown[0].amount.amount(), dec!(4.40));
        assert_eq!(breakdown[1].rate, TaxRate::standard());
        assert_eq!(breakdown[1].base.amount(), dec!(200));
        assert_eq!(breakdown[1].amount.amount(), dec!(40));
    }

    #[test]
    fn test_breakdown_sums_to_tax_total_under_discount() {
        // The renderer-facing table must agree with the editor totals even
        // when a discount pro-rates every base. raw = 412.44, discount
        // 103.11 → ratio exactly 0.75, so equality is exact digit-for-digit.
        let lines = vec![
            line(dec!(3), dec!(33.33), dec!(20), 0),
            line(dec!(1.5), dec!(48.30), dec!(10), 1),
            line(dec!(2), dec!(120), dec!(5.5), 2),
        ];
        let discount = Money::new(dec!(103.11));

        let totals = compute(&lines, discount);
        let breakdown = tax_breakdown(&lines, discount);

        let base_sum = breakdown
            .iter()
            .fold(Money::zero(), |acc, row| acc + row.base);
        let tax_sum = breakdown
            .iter()
            .fold(Money::zero(), |acc, row| acc + row.amount);

        assert_eq!(tax_sum, totals.tax_total);
        assert_eq!(base_sum, totals.subtotal);
    }
}
