//! # Validation Module
//!
//! Input validation utilities for Stockbook.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard forms                                              │
//! │  └── coerce_non_negative: unparsable / negative numbers become 0       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, non-negative amounts                    │
//! │  └── Draft lines restored from a snapshot                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store (SQLite)                                               │
//! │  ├── NOT NULL / CHECK (stock_quantity >= 0) constraints                │
//! │  └── Rows re-validated when read (MalformedRecord)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::validation::{coerce_non_negative, validate_quantity};
//!
//! assert!(validate_quantity(5).is_ok());
//! assert_eq!(coerce_non_negative("-3"), 0);
//! assert_eq!(coerce_non_negative("abc"), 0);
//! ```

use crate::error::ValidationError;
use crate::types::{LineItem, ProductInput, Rate, SupplierInput};
use crate::{MAX_DRAFT_ITEMS, MAX_ITEM_QUANTITY, MAX_MARKUP, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_CODE_LEN: usize = 50;
const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field: non-empty after trimming, at most `max`
/// characters.
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a business code (product or supplier id the owner types in).
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_code;
///
/// assert!(validate_code("KS-01").is_ok());
/// assert!(validate_code("").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    validate_required("code", code, MAX_CODE_LEN)
}

/// Validates a display name.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    validate_required("name", name, MAX_NAME_LEN)
}

/// Validates a task or category text.
pub fn validate_text(field: &str, text: &str) -> ValidationResult<()> {
    validate_required(field, text, MAX_TEXT_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
///
/// ## User Workflow
/// ```text
/// Restock form: quantity 24
///      │
///      ▼
/// validate_quantity(24) ← THIS FUNCTION
///      │
///      ├── qty <= 0?    → "quantity must be positive"
///      ├── qty > 9999?  → "quantity must be between 1 and 9999"
///      └── OK → line added to the draft
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a non-negative amount or count (prices, stock).
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a stored or entered price: `0..=MAX_PRICE_CENTS`.
pub fn validate_price(field: &str, cents: i64) -> ValidationResult<()> {
    validate_non_negative(field, cents)?;

    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a buying price fed to the pricing calculator.
///
/// Unlike a stored price it must be strictly positive.
pub fn validate_buying_price(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "buying_price".to_string(),
        });
    }

    validate_price("buying_price", cents)
}

/// Validates a markup fed to the pricing calculator (at most 999%).
pub fn validate_markup(markup: Rate) -> ValidationResult<()> {
    if markup > MAX_MARKUP {
        return Err(ValidationError::OutOfRange {
            field: "markup".to_string(),
            min: 0,
            max: i64::from(MAX_MARKUP.bps()),
        });
    }

    Ok(())
}

/// Turns numeric form input into a non-negative integer.
///
/// Unparsable text and negative numbers both become `0`; fractional input is
/// truncated.
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::coerce_non_negative;
///
/// assert_eq!(coerce_non_negative("12"), 12);
/// assert_eq!(coerce_non_negative(" 7.9 "), 7);
/// assert_eq!(coerce_non_negative(""), 0);
/// ```
pub fn coerce_non_negative(input: &str) -> i64 {
    let input = input.trim();
    if let Ok(value) = input.parse::<i64>() {
        return value.max(0);
    }
    match input.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value.trunc() as i64,
        _ => 0,
    }
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates the product form.
///
/// ## Rules
/// - code and name are required
/// - prices are within `0..=MAX_PRICE_CENTS`
/// - stock is non-negative
pub fn validate_product_input(input: &ProductInput) -> ValidationResult<()> {
    validate_code(&input.code)?;
    validate_name(&input.name)?;
    validate_price("buying_price", input.buying_price_cents)?;
    validate_price("selling_price", input.selling_price_cents)?;
    validate_non_negative("stock_quantity", input.stock_quantity)?;
    Ok(())
}

/// Validates the supplier form. Contact may be empty.
pub fn validate_supplier_input(input: &SupplierInput) -> ValidationResult<()> {
    validate_code(&input.code)?;
    validate_name(&input.name)?;
    Ok(())
}

/// Validates a line item, whether freshly built or read back from storage.
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    if item.product_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }
    validate_quantity(item.quantity)?;
    validate_price("unit_price", item.unit_price_cents)?;
    validate_price("unit_cost", item.unit_cost_cents)?;
    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more line fits in a draft holding `current_items`.
pub fn validate_draft_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_DRAFT_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 0,
            max: MAX_DRAFT_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product_input() -> ProductInput {
        ProductInput {
            code: "KS-01".to_string(),
            name: "Kopi Susu".to_string(),
            buying_price_cents: 1_000_000,
            selling_price_cents: 1_500_000,
            stock_quantity: 5,
            supplier: "Toko Sumber".to_string(),
        }
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "Kopi", 10).is_ok());
        assert!(validate_required("name", "   ", 10).is_err());
        assert!(matches!(
            validate_required("name", "abcdefghijk", 10),
            Err(ValidationError::TooLong { max: 10, .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_buying_price() {
        assert!(validate_buying_price(1).is_ok());
        assert!(validate_buying_price(MAX_PRICE_CENTS).is_ok());
        assert!(validate_buying_price(0).is_err());
        assert!(matches!(
            validate_buying_price(MAX_PRICE_CENTS + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_markup() {
        assert!(validate_markup(Rate::zero()).is_ok());
        assert!(validate_markup(MAX_MARKUP).is_ok());
        assert_eq!(
            validate_markup(Rate::from_bps(MAX_MARKUP.bps() + 1)),
            Err(ValidationError::OutOfRange {
                field: "markup".to_string(),
                min: 0,
                max: 99_900,
            })
        );
    }

    #[test]
    fn test_validate_price_bounds() {
        assert!(validate_price("selling_price", 0).is_ok());
        assert!(validate_price("selling_price", MAX_PRICE_CENTS).is_ok());
        assert!(matches!(
            validate_price("selling_price", -1),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
        assert!(matches!(
            validate_price("selling_price", MAX_PRICE_CENTS + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_product_with_overflowing_price_is_rejected() {
        let mut input = product_input();
        input.buying_price_cents = i64::MAX / 2;
        assert_eq!(
            validate_product_input(&input),
            Err(ValidationError::OutOfRange {
                field: "buying_price".to_string(),
                min: 0,
                max: MAX_PRICE_CENTS,
            })
        );

        let mut input = product_input();
        input.selling_price_cents = i64::MAX;
        assert!(validate_product_input(&input).is_err());
    }

    #[test]
    fn test_coerce_non_negative() {
        assert_eq!(coerce_non_negative("42"), 42);
        assert_eq!(coerce_non_negative("-5"), 0);
        assert_eq!(coerce_non_negative("-5.5"), 0);
        assert_eq!(coerce_non_negative("3.99"), 3);
        assert_eq!(coerce_non_negative("NaN"), 0);
        assert_eq!(coerce_non_negative("dua"), 0);
    }

    #[test]
    fn test_validate_product_input() {
        assert!(validate_product_input(&product_input()).is_ok());

        let mut input = product_input();
        input.stock_quantity = -1;
        assert_eq!(
            validate_product_input(&input),
            Err(ValidationError::MustNotBeNegative {
                field: "stock_quantity".to_string()
            })
        );

        let mut input = product_input();
        input.name = String::new();
        assert!(validate_product_input(&input).is_err());
    }

    #[test]
    fn test_validate_supplier_input_allows_empty_contact() {
        let input = SupplierInput {
            code: "SUP-1".to_string(),
            name: "Toko Sumber".to_string(),
            contact: String::new(),
        };
        assert!(validate_supplier_input(&input).is_ok());
    }

    #[test]
    fn test_validate_line_item() {
        let item = LineItem {
            product_id: "p-1".to_string(),
            product_name: "Kopi Susu".to_string(),
            quantity: 2,
            unit_price_cents: 1_000_000,
            unit_cost_cents: 1_000_000,
            supplier_name: None,
        };
        assert!(validate_line_item(&item).is_ok());

        let bad = LineItem {
            quantity: 0,
            ..item.clone()
        };
        assert!(validate_line_item(&bad).is_err());

        let bad = LineItem {
            unit_price_cents: -1,
            ..item.clone()
        };
        assert!(validate_line_item(&bad).is_err());

        let bad = LineItem {
            unit_cost_cents: i64::MAX / 2,
            ..item
        };
        assert!(matches!(
            validate_line_item(&bad),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_draft_size() {
        assert!(validate_draft_size(0).is_ok());
        assert!(validate_draft_size(MAX_DRAFT_ITEMS - 1).is_ok());
        assert!(validate_draft_size(MAX_DRAFT_ITEMS).is_err());
    }
}
