//! Display formatting helpers.
//!
//! Counts in this domain reach 2^128, so display formatting works on
//! decimal strings and `Option<u128>` counts (`None` meaning exactly 2^128).

use crate::models::FULL_SPACE_COUNT;

/// Plain decimal rendering of a count, covering the 2^128 case.
pub fn count_decimal(count: Option<u128>) -> String {
    match count {
        Some(n) => n.to_string(),
        None => FULL_SPACE_COUNT.to_string(),
    }
}

/// Group a decimal string with thousands separators.
///
/// # Examples
/// ```
/// use ipv6_subnet_planner::output::group_digits;
/// assert_eq!(group_digits("1024"), "1,024");
/// assert_eq!(group_digits("42"), "42");
/// ```
pub fn group_digits(decimal: &str) -> String {
    let digits: Vec<char> = decimal.chars().collect();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out
}

/// Digit-grouped rendering of a `u128`.
pub fn grouped(n: u128) -> String {
    group_digits(&n.to_string())
}

/// Digit-grouped rendering of a count, covering the 2^128 case.
pub fn grouped_count(count: Option<u128>) -> String {
    group_digits(&count_decimal(count))
}
