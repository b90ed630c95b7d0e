//! Phone number and OTP code format utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Number of digits in an OTP code
pub const OTP_CODE_LENGTH: usize = 6;

// 10-digit mobile number whose leading digit is 6, 7, 8 or 9.
// `[0-9]` rather than `\d`: the regex crate's `\d` matches any Unicode digit.
static MOBILE_PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("mobile phone regex is valid"));

static OTP_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("otp code regex is valid"));

/// Check if a phone number is a valid 10-digit mobile number
pub fn validate_phone(phone: &str) -> bool {
    MOBILE_PHONE_REGEX.is_match(phone)
}

/// Check if an OTP code is exactly six ASCII digits
pub fn validate_code_format(code: &str) -> bool {
    OTP_CODE_REGEX.is_match(code)
}

/// Mask a phone number for logging, keeping only the last four characters
///
/// ```
/// use otp_shared::phone::mask_phone_number;
/// assert_eq!(mask_phone_number("9876543210"), "******3210");
/// ```
pub fn mask_phone_number(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}
