//! # Validation Module
//!
//! Document completeness validation for the Devis BTP engine.
//!
//! ## Validation Strategy
//! Findings are ACCUMULATED into a list and recomputed alongside every
//! totals recomputation. They never interrupt the arithmetic: an incomplete
//! draft still gets live totals, and the caller decides whether findings
//! block saving or sending.
//!
//! ## Usage
//! ```rust
//! use devis_core::types::{Document, DocumentKind};
//! use devis_core::validation::{validate, AmountPolicy};
//!
//! let doc = Document::new(DocumentKind::Invoice, "F2026-0001");
//! let findings = validate(&doc, &[], AmountPolicy::Allow);
//! assert!(findings.is_empty());
//! ```

use crate::error::ValidationError;
use crate::types::{Document, LineItem};

// =============================================================================
// Amount Policy
// =============================================================================

/// Whether negative quantities and unit prices are acceptable.
///
/// Negative amounts are not rejected by the totals arithmetic either way;
/// this policy only controls whether validation REPORTS them. `Allow` is the
/// default: credit lines (deducting an advance payment, returning material)
/// are a legitimate construction-billing case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmountPolicy {
    /// Negative quantity/unit price is a credit line; no finding.
    #[default]
    Allow,
    /// Negative quantity/unit price is reported as a validation finding.
    Reject,
}

// =============================================================================
// Validation
// =============================================================================

/// Validates a document and its line items.
///
/// ## Rules
/// - `number` must not be empty or whitespace-only
/// - `currency_code` must not be empty or whitespace-only
/// - every line needs a non-blank description; reported at most once, for
///   the FIRST offending line
/// - under [`AmountPolicy::Reject`], the first negative quantity and the
///   first negative unit price are each reported once
pub fn validate(
    document: &Document,
    lines: &[LineItem],
    policy: AmountPolicy,
) -> Vec<ValidationError> {
    let mut findings = Vec::new();

    if document.number.trim().is_empty() {
        findings.push(ValidationError::MissingNumber);
    }

    if document.currency_code.trim().is_empty() {
        findings.push(ValidationError::MissingCurrency);
    }

    if let Some(line) = lines.iter().find(|l| l.description.trim().is_empty()) {
        findings.push(ValidationError::MissingLineDescription {
            position: line.position,
        });
    }

    if policy == AmountPolicy::Reject {
        if let Some(line) = lines.iter().find(|l| l.quantity.is_sign_negative()) {
            findings.push(ValidationError::NegativeQuantity {
                position: line.position,
            });
        }
        if let Some(line) = lines.iter().find(|l| l.unit_price.is_negative()) {
            findings.push(ValidationError::NegativeUnitPrice {
                position: line.position,
            });
        }
    }

    findings
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Money, TaxRate};
    use crate::types::{DocumentKind, NewLineItem};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn doc() -> Document {
        let mut d = Document::new(DocumentKind::Invoice, "F2026-0042");
        d.client_name = Some("SARL Bâti Sud".to_string());
        d
    }

    fn named_line(description: &str, position: i64) -> LineItem {
        LineItem::new(
            NewLineItem {
                description: description.to_string(),
                quantity: Decimal::ONE,
                unit: None,
                unit_price: Money::from_major(10),
                tax_rate: TaxRate::standard(),
            },
            position,
        )
    }

    #[test]
    fn test_complete_document_has_no_findings() {
        let lines = vec![named_line("Maçonnerie", 0), named_line("Enduit", 1)];
        assert!(validate(&doc(), &lines, AmountPolicy::Allow).is_empty());
    }

    #[test]
    fn test_missing_number() {
        let mut d = doc();
        d.number = "   ".to_string();
        let findings = validate(&d, &[], AmountPolicy::Allow);
        assert_eq!(findings, vec![ValidationError::MissingNumber]);
    }

    #[test]
    fn test_missing_currency() {
        let mut d = doc();
        d.currency_code = String::new();
        let findings = validate(&d, &[], AmountPolicy::Allow);
        assert_eq!(findings, vec![ValidationError::MissingCurrency]);
    }

    #[test]
    fn test_missing_number_and_currency_accumulate() {
        let mut d = doc();
        d.number = String::new();
        d.currency_code = String::new();
        let findings = validate(&d, &[], AmountPolicy::Allow);
        assert_eq!(
            findings,
            vec![
                ValidationError::MissingNumber,
                ValidationError::MissingCurrency
            ]
        );
    }

    #[test]
    fn test_blank_description_reported_once_first_line_wins() {
        let lines = vec![
            named_line("Plomberie", 0),
            named_line("  ", 1),
            named_line("", 2),
        ];
        let findings = validate(&doc(), &lines, AmountPolicy::Allow);
        assert_eq!(
            findings,
            vec![ValidationError::MissingLineDescription { position: 1 }]
        );
    }

    #[test]
    fn test_negative_amounts_allowed_by_default() {
        let mut credit = named_line("Reprise acompte", 0);
        credit.quantity = dec!(-1);
        let findings = validate(&doc(), &[credit], AmountPolicy::Allow);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_negative_amounts_rejected_under_policy() {
        let mut credit = named_line("Reprise acompte", 0);
        credit.quantity = dec!(-1);
        let mut bad_price = named_line("Fourniture", 1);
        bad_price.unit_price = Money::from_major(-5);

        let findings = validate(&doc(), &[credit, bad_price], AmountPolicy::Reject);
        assert_eq!(
            findings,
            vec![
                ValidationError::NegativeQuantity { position: 0 },
                ValidationError::NegativeUnitPrice { position: 1 },
            ]
        );
    }
}
