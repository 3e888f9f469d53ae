//! Client-side record identifiers.
//!
//! Ids are `<millis base-36>-<random base-36>`. The leading time segment is what
//! the legacy timestamp backfill decodes.

use std::collections::HashSet;
use uuid::Uuid;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn base36_digits(s: &str) -> impl Iterator<Item = u32> + '_ {
    s.chars().map_while(|c| c.to_digit(36))
}

/// Value of the leading run of base-36 digits, None when empty or it overflows `i64`
pub fn decode_base36_prefix(s: &str) -> Option<i64> {
    let mut digits = base36_digits(s).peekable();
    digits.peek()?;
    digits.try_fold(0i64, |acc, d| acc.checked_mul(36)?.checked_add(d as i64))
}

/// Leading base-36 prefix reduced modulo `modulus`; 0 when there is no prefix
pub fn base36_prefix_mod(s: &str, modulus: i64) -> i64 {
    base36_digits(s).fold(0i64, |acc, d| (acc * 36 + d as i64) % modulus)
}

pub fn generate_unique_id(now_millis: i64) -> String {
    let random = Uuid::new_v4().as_u128() as u64;
    format!("{}-{}", to_base36(now_millis.max(0) as u64), to_base36(random))
}

/// Generate an id that does not collide with any id in `existing`
pub fn generate_unique_id_avoiding(now_millis: i64, existing: &HashSet<&str>) -> String {
    loop {
        let id = generate_unique_id(now_millis);
        if !existing.contains(id.as_str()) {
            return id;
        }
    }
}
