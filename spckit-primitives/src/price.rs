//! Price helpers for localized display strings such as `"약 450,000원"`.

const CURRENCY_SUFFIX: &str = "원";

/// Extracts the integer amount from a display price.
///
/// Every non-digit character is dropped and the remaining digits are read as a
/// base-10 integer. Strings without digits, and amounts that overflow, yield 0.
#[must_use]
pub fn extract_price(price: &str) -> u64 {
    let digits: String = price.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Formats an amount with thousands separators and the won suffix.
#[must_use]
pub fn format_price(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + CURRENCY_SUFFIX.len());
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push_str(CURRENCY_SUFFIX);
    grouped
}
