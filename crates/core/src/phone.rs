//! Phone number helpers

/// Country prefix every stored number carries
pub const TANZANIA_PREFIX: &str = "+255";

/// Strip a leading `+` so the number can be handed to the SMS gateway.
pub fn normalize_phone(phone: &str) -> String {
    let trimmed = phone.trim();
    trimmed.strip_prefix('+').unwrap_or(trimmed).to_string()
}

/// Best-effort conversion of local formats (`07xx...`, `255...`) to `+255...`
pub fn to_international(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if let Some(rest) = digits.strip_prefix("255") {
        format!("{}{}", TANZANIA_PREFIX, rest)
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("{}{}", TANZANIA_PREFIX, rest)
    } else {
        format!("{}{}", TANZANIA_PREFIX, digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_plus() {
        assert_eq!(normalize_phone("+255712345678"), "255712345678");
        assert_eq!(normalize_phone(" 255712345678 "), "255712345678");
    }

    #[test]
    fn test_to_international() {
        assert_eq!(to_international("0712 345 678"), "+255712345678");
        assert_eq!(to_international("255712345678"), "+255712345678");
        assert_eq!(to_international("+255712345678"), "+255712345678");
    }
}
