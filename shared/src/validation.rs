//! Validation utilities for DairyFlow inputs

use rust_decimal::Decimal;

/// Minimum password length for admin accounts
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum characters for a free-text search
pub const MIN_SEARCH_LEN: usize = 2;

// ============================================================================
// Identity
// ============================================================================

/// Validate a mobile number: exactly 10 ASCII digits
pub fn validate_mobile(mobile: &str) -> Result<(), &'static str> {
    if mobile.len() != 10 {
        return Err("Mobile number must be 10 digits");
    }
    if !mobile.chars().all(|c| c.is_ascii_digit()) {
        return Err("Mobile number must contain only digits");
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.')
    {
        return Err("Invalid email format");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

/// Validate a required text field is not blank
pub fn validate_required(value: &str, message: &'static str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err(message);
    }
    Ok(())
}

/// Normalise a search term; `None` when it is too short to be useful
pub fn normalize_search(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| t.chars().count() >= MIN_SEARCH_LEN)
        .map(str::to_string)
}

// ============================================================================
// Stock and Requests
// ============================================================================

/// Validate a requested bag count
pub fn validate_qty_bags(qty: i32) -> Result<(), &'static str> {
    if qty < 1 {
        return Err("Quantity must be at least 1 bag");
    }
    Ok(())
}

/// Validate an on-hand stock quantity
pub fn validate_stock_quantity(qty: i32) -> Result<(), &'static str> {
    if qty < 0 {
        return Err("Quantity must be non-negative");
    }
    Ok(())
}

/// Validate bag weight in kilograms (at least 0.1 kg)
pub fn validate_bag_weight(weight: Decimal) -> Result<(), &'static str> {
    if weight < Decimal::new(1, 1) {
        return Err("Bag weight must be at least 0.1 kg");
    }
    Ok(())
}

/// Validate a unit price
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price must be non-negative");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_mobile() {
        assert!(validate_mobile("9876543210").is_ok());
        assert!(validate_mobile("0000000000").is_ok());
        assert_eq!(
            validate_mobile("98765"),
            Err("Mobile number must be 10 digits")
        );
        assert_eq!(
            validate_mobile("98765-4321"),
            Err("Mobile number must contain only digits")
        );
        assert!(validate_mobile("+919876543").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ravi@coop.in").is_ok());
        assert!(validate_email("a.b@mail.example.com").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@coop.in").is_err());
        assert!(validate_email("x@.in").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("Pellet", "Feed name is required").is_ok());
        assert_eq!(
            validate_required("   ", "Feed name is required"),
            Err("Feed name is required")
        );
    }

    #[test]
    fn test_normalize_search() {
        assert_eq!(normalize_search(Some("  ra ")), Some("ra".to_string()));
        assert_eq!(normalize_search(Some("r")), None);
        assert_eq!(normalize_search(None), None);
    }

    #[test]
    fn test_quantities() {
        assert!(validate_qty_bags(1).is_ok());
        assert!(validate_qty_bags(0).is_err());
        assert!(validate_qty_bags(-3).is_err());
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(-1).is_err());
    }

    #[test]
    fn test_bag_weight_and_price() {
        assert!(validate_bag_weight(Decimal::new(1, 1)).is_ok());
        assert!(validate_bag_weight(Decimal::from(50)).is_ok());
        assert!(validate_bag_weight(Decimal::new(5, 2)).is_err());
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(Decimal::new(-1, 2)).is_err());
    }
}
