//! Stable 32-bit string hashing used for plugin identifiers and menu keys

/// Hash a string as `h = 31 * h + c` over its Unicode scalar values with
/// wrapping 32-bit arithmetic.
///
/// The value is stable across runs and platforms, which `std`'s
/// `DefaultHasher` does not guarantee. It is not collision resistant.
pub fn string_hash(s: &str) -> i32 {
    s.chars()
        .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(c as i32))
}

/// Lower-case hexadecimal rendering of a hash, two's complement for negatives
pub fn to_hex(value: i32) -> String {
    format!("{:x}", value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_hashes_to_zero() {
        assert_eq!(string_hash(""), 0);
    }

    #[test]
    fn matches_polynomial_definition() {
        // 'a' = 97, 'b' = 98: 97 * 31 + 98
        assert_eq!(string_hash("ab"), 97 * 31 + 98);
    }

    #[test]
    fn long_strings_wrap_instead_of_overflowing() {
        let long = "x".repeat(1000);
        let _ = string_hash(&long);
    }

    #[test]
    fn hex_of_negative_value_is_unsigned() {
        assert_eq!(to_hex(-1), "ffffffff");
        assert_eq!(to_hex(255), "ff");
    }
}
