//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

/// Generate a short url-safe referral code
pub fn generate_referral_code() -> String {
    random_token(8)
}

/// Generate a random account password
pub fn generate_password() -> String {
    random_token(10)
}

fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Validate email format (local@domain.tld)
pub fn is_valid_email(email: &str) -> bool {
    let re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern");
    re.is_match(email)
}

/// Validate a platform username (must start with @)
pub fn is_valid_handle(username: &str) -> bool {
    username.starts_with('@') && username.len() > 1
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Format a process runtime as "Xh Ym"
pub fn format_runtime(seconds: u64) -> String {
    format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
}

/// Extract the chat handle from a t.me link or @-handle task target
pub fn chat_handle_from_link(link: &str) -> String {
    let tail = link.rsplit('/').next().unwrap_or(link);
    if tail.starts_with('@') {
        tail.to_string()
    } else {
        format!("@{}", tail)
    }
}

/// Split a referral start argument ("ref_<chat_id>") into the referrer id
pub fn parse_referral_arg(arg: &str) -> Option<i64> {
    arg.strip_prefix("ref_")?.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referral_code_shape() {
        let code = generate_referral_code();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b@mail.co"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("spaces in@mail.com"));
    }

    #[test]
    fn test_handle_validation() {
        assert!(is_valid_handle("@someone"));
        assert!(!is_valid_handle("someone"));
        assert!(!is_valid_handle("@"));
    }

    #[test]
    fn test_chat_handle_from_link() {
        assert_eq!(chat_handle_from_link("https://t.me/taskchecked"), "@taskchecked");
        assert_eq!(chat_handle_from_link("@taskchecked"), "@taskchecked");
        assert_eq!(chat_handle_from_link("taskchecked"), "@taskchecked");
    }

    #[test]
    fn test_parse_referral_arg() {
        assert_eq!(parse_referral_arg("ref_12345"), Some(12345));
        assert_eq!(parse_referral_arg("ref_abc"), None);
        assert_eq!(parse_referral_arg("12345"), None);
    }

    #[test]
    fn test_format_runtime() {
        assert_eq!(format_runtime(0), "0h 0m");
        assert_eq!(format_runtime(3700), "1h 1m");
    }
}
