//! Base-36 order identifiers.
//!
//! PITCH encodes order ids as fixed-width, zero-padded base-36 strings
//! (`0-9`, `A-Z`). Decoding accepts lowercase digits as well.

/// Decode a base-36 string into an integer.
///
/// Returns `None` for an empty string, a non-alphanumeric character, or a
/// value that does not fit into `u64`.
///
/// # Example
/// ```
/// use pitch_sales::base36;
///
/// assert_eq!(base36::decode("000000000007"), Some(7));
/// assert_eq!(base36::decode("1Z"), Some(71));
/// ```
pub fn decode(s: &str) -> Option<u64> {
    if s.is_empty() {
        return None;
    }
    s.bytes().try_fold(0u64, |acc, b| {
        let digit = (b as char).to_digit(36)? as u64;
        acc.checked_mul(36)?.checked_add(digit)
    })
}

/// Encode an integer as an uppercase base-36 string without padding.
pub fn encode(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::with_capacity(13);
    while n != 0 {
        let rem = (n % 36) as u8;
        digits.push(if rem < 10 { b'0' + rem } else { b'A' + rem - 10 });
        n /= 36;
    }
    digits.reverse();
    // only ASCII digits/letters were pushed
    String::from_utf8(digits).unwrap_or_default()
}
