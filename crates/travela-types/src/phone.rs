//! Phone number normalization.
//!
//! Phone numbers are the primary key for users, OTP rows and conversations,
//! so every entry point normalizes them the same way before use. Local
//! Kenyan formats (`07XXXXXXXX`, `7XXXXXXXX`) are rewritten to `+254...`;
//! numbers already in international form are kept.

/// Default country calling code applied to local numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "+254";

/// Normalize a raw phone number.
///
/// Returns `None` when the input contains no digits at all.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let mut cleaned = String::with_capacity(raw.len());
    for (i, c) in raw.trim().chars().enumerate() {
        if c.is_ascii_digit() || (c == '+' && i == 0) {
            cleaned.push(c);
        }
    }

    let digits = cleaned.trim_start_matches('+');
    if digits.is_empty() {
        return None;
    }

    if cleaned.starts_with('+') {
        return Some(cleaned);
    }

    if cleaned.starts_with('0') && cleaned.len() == 10 {
        return Some(format!("{DEFAULT_COUNTRY_CODE}{}", &cleaned[1..]));
    }

    if cleaned.len() == 9 {
        return Some(format!("{DEFAULT_COUNTRY_CODE}{cleaned}"));
    }

    Some(cleaned)
}

/// Mask a phone number for logs, keeping only the last four digits.
pub fn mask_phone(phone: &str) -> String {
    let hidden = phone.chars().count().saturating_sub(4);
    phone
        .chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { '*' } else { c })
        .collect()
}
