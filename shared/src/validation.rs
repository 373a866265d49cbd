//! Validation utilities shared by the storefront and back-office APIs

use rust_decimal::Decimal;

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate phone number: 7-15 digits after stripping separators
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 7 || digits.len() > 15 {
        return Err("Phone number must contain 7-15 digits");
    }
    Ok(())
}

/// Validate a barcode or serial number.
///
/// Scanned codes arrive as already-decoded strings; we only require them to
/// be non-empty printable ASCII without whitespace, up to 64 characters.
/// No checksum validation is performed (matching is by equality only).
pub fn validate_barcode(code: &str) -> Result<(), &'static str> {
    if code.is_empty() {
        return Err("Barcode cannot be empty");
    }
    if code.len() > 64 {
        return Err("Barcode must be at most 64 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_graphic())
    {
        return Err("Barcode must be printable ASCII without spaces");
    }
    Ok(())
}

/// Validate a monetary amount is strictly positive
pub fn validate_positive_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err("Amount must be positive");
    }
    Ok(())
}

/// Validate a receipt number: `RCP-YYYYMMDD-NNNN`. The sequence segment is
/// at least four digits; busy days widen it rather than wrapping.
pub fn validate_receipt_number(receipt: &str) -> Result<(), &'static str> {
    let parts: Vec<&str> = receipt.split('-').collect();

    if parts.len() != 3 || parts[0] != "RCP" {
        return Err("Receipt number must be in format RCP-YYYYMMDD-NNNN");
    }
    if parts[1].len() != 8 || !parts[1].chars().all(|c| c.is_ascii_digit()) {
        return Err("Invalid date segment in receipt number");
    }
    if parts[2].len() < 4 || !parts[2].chars().all(|c| c.is_ascii_digit()) {
        return Err("Invalid sequence segment in receipt number");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("admin@store.co").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@.").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("0812345678").is_ok());
        assert!(validate_phone("+1 (415) 555-0100").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("1234567890123456").is_err());
    }

    #[test]
    fn test_validate_barcode_valid() {
        assert!(validate_barcode("4006381333931").is_ok());
        assert!(validate_barcode("SN-2024-00042").is_ok());
    }

    #[test]
    fn test_validate_barcode_invalid() {
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("has space").is_err());
        assert!(validate_barcode(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_positive_amount() {
        assert!(validate_positive_amount(Decimal::from(10)).is_ok());
        assert!(validate_positive_amount(Decimal::ZERO).is_err());
        assert!(validate_positive_amount(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_validate_receipt_number() {
        assert!(validate_receipt_number("RCP-20240307-0012").is_ok());
        assert!(validate_receipt_number("RCP-20240307-10000").is_ok());
        assert!(validate_receipt_number("RCP-2024037-0012").is_err());
        assert!(validate_receipt_number("REC-20240307-0012").is_err());
        assert!(validate_receipt_number("RCP-20240307-12").is_err());
    }
}
