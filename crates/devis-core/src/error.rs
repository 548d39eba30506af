//! # Error Types
//!
//! Domain-specific error types for devis-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  devis-core errors (this file)                                          │
//! │  ├── CoreError        - Editor misuse (bad indices)                     │
//! │  └── ValidationError  - Document completeness findings                  │
//! │                                                                         │
//! │  devis-db errors (separate crate)                                       │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── ServiceError     - Aggregates Core + Db for the editor service     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual impls
//! 2. Errors are enum variants with context, never String
//! 3. Validation findings are ACCUMULATED into a list, not thrown -
//!    callers decide whether an incomplete document blocks saving

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Editor command errors.
///
/// Totals arithmetic itself cannot fail; the only failure mode in the core
/// is addressing a line that does not exist.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line index outside the document was referenced.
    #[error("line index {index} out of range (document has {len} lines)")]
    LineOutOfRange { index: usize, len: usize },

    /// Too many lines on one document.
    #[error("document cannot have more than {max} lines")]
    TooManyLines { max: usize },

    /// Validation finding promoted to an error by a caller that chose to
    /// block on it.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single document-completeness finding.
///
/// These never block in-memory computation; they gate "is this document
/// ready to save/send". The engine reports them as a list alongside every
/// totals recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationError {
    /// Document number is empty or whitespace-only.
    #[error("document number is required")]
    MissingNumber,

    /// Currency code is empty or whitespace-only.
    #[error("currency code is required")]
    MissingCurrency,

    /// A line item has an empty description. Reported at most once, for the
    /// first offending line.
    #[error("line {position} is missing a description")]
    MissingLineDescription { position: i64 },

    /// Negative quantity, rejected under `AmountPolicy::Reject`.
    #[error("line {position} has a negative quantity")]
    NegativeQuantity { position: i64 },

    /// Negative unit price, rejected under `AmountPolicy::Reject`.
    #[error("line {position} has a negative unit price")]
    NegativeUnitPrice { position: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::LineOutOfRange { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "line index 7 out of range (document has 3 lines)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::MissingNumber.to_string(),
            "document number is required"
        );
        assert_eq!(
            ValidationError::MissingLineDescription { position: 2 }.to_string(),
            "line 2 is missing a description"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::MissingCurrency.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
