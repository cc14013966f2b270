//! # Validation Module
//!
//! Business-rule validation for catalog and POS input. Handlers validate
//! before touching the database; SQLite constraints (NOT NULL, UNIQUE,
//! foreign keys) remain the last line of defense.
//!
//! ## Usage
//! ```rust
//! use vitrine_core::validation::{validate_ean, validate_quantity};
//!
//! assert!(validate_ean("7891234567895").is_ok());
//! assert!(validate_quantity(3).is_ok());
//! ```

use crate::error::ValidationError;
use crate::{MAX_INSTALLMENTS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (brand, model, product, customer).
///
/// Must be non-empty after trimming and at most 200 characters.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a URL slug: lowercase alphanumerics and hyphens only.
pub fn validate_slug(slug: &str) -> ValidationResult<()> {
    let slug = slug.trim();

    if slug.is_empty() {
        return Err(ValidationError::Required {
            field: "slug".to_string(),
        });
    }

    if slug.len() > 80 {
        return Err(ValidationError::TooLong {
            field: "slug".to_string(),
            max: 80,
        });
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "slug".to_string(),
            reason: "must contain only lowercase letters, digits, and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates an EAN-13 barcode: exactly 13 digits.
pub fn validate_ean(ean: &str) -> ValidationResult<()> {
    let ean = ean.trim();

    if ean.len() != 13 || !ean.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "ean".to_string(),
            reason: "must be exactly 13 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates an IMEI: exactly 15 digits.
pub fn validate_imei(imei: &str) -> ValidationResult<()> {
    let imei = imei.trim();

    if imei.len() != 15 || !imei.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "imei".to_string(),
            reason: "must be exactly 15 digits".to_string(),
        });
    }

    Ok(())
}

/// Derives a slug from a display name: lowercase, non-alphanumerics
/// collapsed to single hyphens. Used when the editor leaves the slug blank.
///
/// ```rust
/// use vitrine_core::validation::slugify;
///
/// assert_eq!(slugify("iPhone 13 Pro Max"), "iphone-13-pro-max");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_hyphen = true; // avoid a leading hyphen

    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item quantity: 1..=MAX_ITEM_QUANTITY.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 1 || quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or cost in centavos: must not be negative.
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a payment amount: strictly positive.
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Fee Validators
// =============================================================================

/// Validates a fee-table row. This is the central enforcement of the
/// `applied >= operator` invariant; the repository calls it on every
/// upsert so no edit path can bypass it.
pub fn validate_payment_fee(
    installments: i64,
    operator_fee_bps: i64,
    applied_fee_bps: i64,
) -> ValidationResult<()> {
    if installments < 1 || installments > MAX_INSTALLMENTS {
        return Err(ValidationError::OutOfRange {
            field: "installments".to_string(),
            min: 1,
            max: MAX_INSTALLMENTS,
        });
    }

    if operator_fee_bps < 0 {
        return Err(ValidationError::MustBePositive {
            field: "operator_fee_bps".to_string(),
        });
    }

    if applied_fee_bps < operator_fee_bps {
        return Err(ValidationError::FeeBelowOperatorCost {
            applied_bps: applied_fee_bps,
            operator_bps: operator_fee_bps,
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

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "iPhone 13").is_ok());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"a".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("iphone-13-128gb").is_ok());
        assert!(validate_slug("IPhone").is_err());
        assert!(validate_slug("has space").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("iPhone 13 Pro Max"), "iphone-13-pro-max");
        assert_eq!(slugify("  Galaxy S24+  "), "galaxy-s24");
        assert_eq!(slugify("Moto G"), "moto-g");
        assert!(validate_slug(&slugify("Xiaomi Redmi Note 12")).is_ok());
    }

    #[test]
    fn test_validate_ean() {
        assert!(validate_ean("7891234567895").is_ok());
        assert!(validate_ean("789123456789").is_err()); // 12 digits
        assert!(validate_ean("78912345678xx").is_err());
    }

    #[test]
    fn test_validate_imei() {
        assert!(validate_imei("356789104321987").is_ok());
        assert!(validate_imei("35678910432198").is_err()); // 14 digits
    }

    #[test]
    fn test_validate_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_fee_invariant_enforced() {
        assert!(validate_payment_fee(3, 450, 600).is_ok());
        assert!(validate_payment_fee(3, 450, 450).is_ok());
        assert!(matches!(
            validate_payment_fee(3, 450, 300),
            Err(ValidationError::FeeBelowOperatorCost { .. })
        ));
        assert!(validate_payment_fee(0, 100, 200).is_err());
        assert!(validate_payment_fee(MAX_INSTALLMENTS + 1, 100, 200).is_err());
    }

    #[test]
    fn test_payment_amount_strictly_positive() {
        assert!(validate_payment_amount(1).is_ok());
        assert!(validate_payment_amount(0).is_err());
        assert!(validate_payment_amount(-5).is_err());
    }
}
