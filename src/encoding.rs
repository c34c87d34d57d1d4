//! The binary-to-text alphabet used for salts, hashes and byte-valued parameters, and the
//! byte comparison used when verifying passwords.

use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};
use subtle::{Choice, ConstantTimeEq};

pub fn encode(bytes: &[u8]) -> String {
    STANDARD_NO_PAD.encode(bytes)
}

pub fn decode(text: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    STANDARD_NO_PAD.decode(text)
}

/// Compares two byte strings without short-circuiting on the first mismatch.
///
/// When the lengths differ, the comparison still walks the longer buffer (missing bytes
/// read as zero), so the running time depends only on the longer length.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let same_len = (a.len() as u64).ct_eq(&(b.len() as u64));
    let same_bytes = (0..len).fold(Choice::from(1), |acc, index| {
        let x = a.get(index).copied().unwrap_or(0);
        let y = b.get(index).copied().unwrap_or(0);
        acc & x.ct_eq(&y)
    });

    (same_len & same_bytes).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_without_padding() {
        assert_eq!(encode(b"somesalt"), "c29tZXNhbHQ");
        assert_eq!(encode(b"salt"), "c2FsdA");
        assert_eq!(decode("c2FsdA").unwrap(), b"salt");
    }

    #[test]
    fn rejects_padding_and_foreign_characters() {
        assert!(decode("c2FsdA==").is_err());
        assert!(decode("c2F_dA").is_err());
    }

    #[test]
    fn compares_equal_and_unequal_buffers() {
        assert!(constant_time_eq(b"", b""));
        assert!(constant_time_eq(b"abcdef", b"abcdef"));
        assert!(!constant_time_eq(b"abcdef", b"abcdeg"));
        assert!(!constant_time_eq(b"bbcdef", b"abcdef"));
    }

    #[test]
    fn length_mismatch_is_unequal_even_with_zero_tail() {
        assert!(!constant_time_eq(b"abc", b"abc\0"));
        assert!(!constant_time_eq(b"abc\0\0", b"abc"));
        assert!(!constant_time_eq(b"", b"\0"));
    }
}
