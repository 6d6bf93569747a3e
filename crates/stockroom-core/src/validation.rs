//! # Validation Module
//!
//! Input rules applied before anything reaches the database.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (admin-api)                                   │
//! │  └── Body must be JSON of the right shape                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, formats                                 │
//! │  └── Cross-field rules (selling ≥ base, ...)                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (slug, sku, supplier code)                                 │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators that guard a whole record collect every problem and return
//! them together as [`ValidationError::Many`].

use crate::error::ValidationError;
use crate::money::TaxRate;
use crate::types::{Product, Supplier};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Turns a list of problems into a single result.
///
/// No problems is `Ok`, one problem is returned as-is, several become
/// [`ValidationError::Many`].
pub fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Many(
            errors.iter().map(ToString::to_string).collect(),
        )),
    }
}

// =============================================================================
// String Validators
// =============================================================================

/// Requires a non-blank value no longer than `max` characters.
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@` with text on both sides
/// - Domain contains a dot that is not at either end
/// - No whitespace
pub fn validate_email(field: &str, email: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::required(field));
    }

    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid email address".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validates a `#rrggbb` color.
pub fn validate_hex_color(field: &str, color: &str) -> ValidationResult<()> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a #rrggbb color".to_string(),
        })
    }
}

/// Identifier made of letters, digits, `-` and `_`, 1 to 50 characters.
pub fn is_valid_reference_id(id: &str) -> bool {
    (1..=50).contains(&id.len())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Postal code: 3 to 10 letters, digits, spaces or hyphens.
pub fn is_valid_postal_code(code: &str) -> bool {
    (3..=10).contains(&code.chars().count())
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || c == '-')
}

/// Validates a SKU.
///
/// ## Rules
/// - 1 to 50 characters
/// - Letters, digits, hyphens, underscores
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    if sku.trim().is_empty() {
        return Err(ValidationError::required("sku"));
    }
    if !is_valid_reference_id(sku) {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "only letters, numbers, hyphens and underscores (max 50)".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Sanitizing
// =============================================================================

/// Strips markup-ish content from free text.
///
/// Removes `<` and `>`, every `javascript:` (any case) and inline handler
/// prefixes such as `onclick =`, then trims.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::sanitize_text;
///
/// assert_eq!(sanitize_text(" <b>Hi</b> "), "bHi/b");
/// assert_eq!(sanitize_text("JavaScript:alert(1)"), "alert(1)");
/// assert_eq!(sanitize_text("x onload= y"), "x  y");
/// ```
pub fn sanitize_text(input: &str) -> String {
    let without_brackets: String = input.chars().filter(|c| *c != '<' && *c != '>').collect();
    let without_scheme = remove_ignore_ascii_case(&without_brackets, "javascript:");
    strip_inline_handlers(&without_scheme).trim().to_string()
}

fn remove_ignore_ascii_case(haystack: &str, needle: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;

    // ASCII lowercasing keeps byte offsets aligned with the original.
    for (start, _) in lower.match_indices(needle) {
        out.push_str(&haystack[last..start]);
        last = start + needle.len();
    }
    out.push_str(&haystack[last..]);
    out
}

/// Removes `on<word>` followed by optional whitespace and `=`.
fn strip_inline_handlers(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        if let Some(end) = inline_handler_end(&chars, i) {
            i = end;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// Index just past a handler match starting at `start`, if there is one.
fn inline_handler_end(chars: &[char], start: usize) -> Option<usize> {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';

    if !chars.get(start)?.eq_ignore_ascii_case(&'o') || !chars.get(start + 1)?.eq_ignore_ascii_case(&'n') {
        return None;
    }

    let mut i = start + 2;
    while chars.get(i).is_some_and(|c| is_word(*c)) {
        i += 1;
    }
    if i == start + 2 {
        return None;
    }
    while chars.get(i).is_some_and(|c| c.is_whitespace()) {
        i += 1;
    }
    (chars.get(i) == Some(&'=')).then_some(i + 1)
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a complete product record (after create or merge).
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if let Err(e) = validate_required_text("name", &product.name, 255) {
        errors.push(e);
    }
    if product.slug.is_empty() {
        errors.push(ValidationError::required("slug"));
    }
    if product.category_id.trim().is_empty() {
        errors.push(ValidationError::required("category_id"));
    }
    if let Some(sku) = &product.sku {
        if let Err(e) = validate_sku(sku) {
            errors.push(e);
        }
    }
    if product.base_price_cents <= 0 {
        errors.push(ValidationError::MustBePositive {
            field: "base_price".into(),
        });
    }
    if product.selling_price_cents <= 0 {
        errors.push(ValidationError::MustBePositive {
            field: "selling_price".into(),
        });
    }
    if product.selling_price_cents < product.base_price_cents {
        errors.push(ValidationError::Rule(
            "Selling price cannot be lower than base price".into(),
        ));
    }
    if product.cost_price_cents.is_some_and(|c| c < 0) {
        errors.push(ValidationError::OutOfRange {
            field: "cost_price".into(),
            min: 0,
            max: i64::MAX,
        });
    }
    if product.stock_quantity < 0 {
        errors.push(ValidationError::Rule("Stock quantity cannot be negative".into()));
    }
    if product.min_stock_level < 0 {
        errors.push(ValidationError::Rule("Minimum stock level cannot be negative".into()));
    }
    for (field, bps) in [
        ("tax_rate", product.tax_rate_bps),
        ("discount", product.discount_bps),
    ] {
        if bps > TaxRate::MAX_BPS {
            errors.push(ValidationError::OutOfRange {
                field: field.into(),
                min: 0,
                max: TaxRate::MAX_BPS as i64,
            });
        }
    }

    collect(errors)
}

/// Validates a complete supplier record (after create or merge).
pub fn validate_supplier(supplier: &Supplier) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if let Err(e) = validate_required_text("name", &supplier.name, 255) {
        errors.push(e);
    }
    if let Err(e) = validate_email("email", &supplier.email) {
        errors.push(e);
    }
    if let Some(email) = supplier.primary_contact_email.as_deref().filter(|e| !e.is_empty()) {
        if let Err(e) = validate_email("primary_contact_email", email) {
            errors.push(e);
        }
    }
    if supplier.rating.is_some_and(|r| !(0.0..=5.0).contains(&r)) {
        errors.push(ValidationError::OutOfRange {
            field: "rating".into(),
            min: 0,
            max: 5,
        });
    }
    for (field, value) in [
        ("credit_limit", supplier.credit_limit_cents),
        ("minimum_order", supplier.minimum_order_cents),
        ("lead_time_days", supplier.lead_time_days),
    ] {
        if value.is_some_and(|v| v < 0) {
            errors.push(ValidationError::OutOfRange {
                field: field.into(),
                min: 0,
                max: i64::MAX,
            });
        }
    }

    collect(errors)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect() {
        assert!(collect(vec![]).is_ok());
        assert_eq!(
            collect(vec![ValidationError::required("a")]).unwrap_err(),
            ValidationError::required("a")
        );
        let many = collect(vec![ValidationError::required("a"), ValidationError::required("b")]);
        assert_eq!(many.unwrap_err().messages().len(), 2);
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", "sales@example.com").is_ok());
        assert!(validate_email("email", "").is_err());
        assert!(validate_email("email", "no-at-sign").is_err());
        assert!(validate_email("email", "a@b").is_err());
        assert!(validate_email("email", "a b@c.com").is_err());
        assert!(validate_email("email", "a@@c.com").is_err());
    }

    #[test]
    fn test_validate_hex_color() {
        assert!(validate_hex_color("c", "#3b82f6").is_ok());
        assert!(validate_hex_color("c", "#3B82F6").is_ok());
        assert!(validate_hex_color("c", "3b82f6").is_err());
        assert!(validate_hex_color("c", "#3b82f").is_err());
        assert!(validate_hex_color("c", "#zzzzzz").is_err());
    }

    #[test]
    fn test_reference_id_and_postal_code() {
        assert!(is_valid_reference_id("prod_01-A"));
        assert!(!is_valid_reference_id(""));
        assert!(!is_valid_reference_id("bad id"));
        assert!(!is_valid_reference_id(&"x".repeat(51)));

        assert!(is_valid_postal_code("94105"));
        assert!(is_valid_postal_code("K1A 0B1"));
        assert!(!is_valid_postal_code("12"));
        assert!(!is_valid_postal_code("12345678901"));
        assert!(!is_valid_postal_code("941#5"));
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("<script>x</script>"), "scriptx/script");
        assert_eq!(sanitize_text("jAvAsCrIpT:go()"), "go()");
        assert_eq!(sanitize_text("img onerror =boom"), "img boom");
        assert_eq!(sanitize_text("  plain text  "), "plain text");
        // "on" without a following word char and '=' is left alone
        assert_eq!(sanitize_text("button on = off"), "button on = off");
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("MUG-001").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("MUG 001").is_err());
    }
}
