//! Identity encoding.

/// Random bytes behind a freshly generated identity (128 bits)
pub const IDENTITY_BYTES: usize = 16;

/// Encode identity bytes as 32 lowercase hex characters.
pub fn encode_identity(bytes: &[u8; IDENTITY_BYTES]) -> String {
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_as_lowercase_hex() {
        let bytes = [
            0x00, 0x01, 0x0a, 0x0f, 0x10, 0x7f, 0x80, 0xab, 0xcd, 0xef, 0xff, 0x12, 0x34, 0x56,
            0x78, 0x9a,
        ];

        assert_eq!(encode_identity(&bytes), "00010a0f107f80abcdefff123456789a");
    }

    #[test]
    fn output_is_32_chars() {
        assert_eq!(encode_identity(&[0u8; IDENTITY_BYTES]).len(), 32);
        assert_eq!(encode_identity(&[0xFFu8; IDENTITY_BYTES]), "f".repeat(32));
    }
}
