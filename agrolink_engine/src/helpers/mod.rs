//! Small validation helpers shared by the engine APIs.
use std::sync::OnceLock;

use regex::Regex;

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

/// Phone numbers accept digits, spaces, parentheses, dashes and a leading `+`, 6 to 20 chars.
pub fn is_valid_phone(phone: &str) -> bool {
    let re = PHONE_RE.get_or_init(|| Regex::new(r"^[+0-9\s()-]{6,20}$").expect("phone regex is valid"));
    re.is_match(phone)
}

/// Emails are stored and compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn phone_validation() {
        assert!(is_valid_phone("+56 9 1234 5678"));
        assert!(is_valid_phone("(02) 123-456"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("not a phone"));
        assert!(!is_valid_phone("+56 9 1234 5678 9012 3456"));
    }

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }
}
