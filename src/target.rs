//! Target decoding and little-endian hash/target comparison.
//!
//! Mirrors `MiningCommon.cpp`'s `check_hash_target_real`: both hash and
//! target are 32-byte little-endian integers; the most significant byte is
//! at index 31, so comparison walks from index 31 down to 0.

/// Compare a 32-byte hash against a 32-byte target, both little-endian.
/// Returns true iff `hash <= target` (equality counts as a hit).
pub fn check_hash_target(hash: &[u8; 32], target: &[u8; 32]) -> bool {
    for i in (0..32).rev() {
        if hash[i] < target[i] {
            return true;
        }
        if hash[i] > target[i] {
            return false;
        }
    }
    true
}

/// Decode a pool-supplied target into a 32-byte little-endian value.
///
/// Most pools for this algorithm send a 4-byte "compact" target; this
/// implementation expands it into the high-order 4 bytes of a 32-byte value,
/// zero-filling the rest. A full 32-byte target is used as-is. Any other
/// length is rejected.
pub fn decode_target(bytes: &[u8]) -> Option<[u8; 32]> {
    match bytes.len() {
        32 => {
            let mut out = [0u8; 32];
            out.copy_from_slice(bytes);
            Some(out)
        }
        4 => {
            let mut out = [0u8; 32];
            out[28..32].copy_from_slice(bytes);
            Some(out)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_target_all_ones() {
        let target = [0xffu8; 32];
        let mut hash = [0u8; 32];
        hash[0] = 0x01;
        hash[31] = 0x7f;
        assert!(check_hash_target(&hash, &target));

        let hash_max = [0xffu8; 32];
        assert!(check_hash_target(&hash_max, &target));
    }

    #[test]
    fn s2_target_zero() {
        let target = [0u8; 32];
        let hash_zero = [0u8; 32];
        assert!(check_hash_target(&hash_zero, &target));

        let mut hash_one = [0u8; 32];
        hash_one[0] = 0x01;
        assert!(!check_hash_target(&hash_one, &target));
    }

    #[test]
    fn s3_boundary() {
        let mut target = [0u8; 32];
        target[31] = 0x01;

        let mut hash = [0xffu8; 32];
        hash[31] = 0x00;
        assert!(check_hash_target(&hash, &target));
    }

    #[test]
    fn total_order_property() {
        let a = {
            let mut b = [0u8; 32];
            b[31] = 5;
            b
        };
        let b = {
            let mut b = [0u8; 32];
            b[31] = 5;
            b
        };
        assert!(check_hash_target(&a, &b) && check_hash_target(&b, &a));

        let c = {
            let mut b = [0u8; 32];
            b[31] = 6;
            b
        };
        assert!(check_hash_target(&a, &c));
        assert!(!check_hash_target(&c, &a));

        // One direction always holds.
        assert!(check_hash_target(&a, &c) || check_hash_target(&c, &a));
    }

    #[test]
    fn decode_target_32_bytes() {
        let bytes = [0xab; 32];
        assert_eq!(decode_target(&bytes), Some(bytes));
    }

    #[test]
    fn decode_target_compact_4_bytes() {
        let compact = [0x00, 0x00, 0x00, 0xff];
        let expanded = decode_target(&compact).unwrap();
        let mut expected = [0u8; 32];
        expected[28..32].copy_from_slice(&compact);
        assert_eq!(expanded, expected);
    }

    #[test]
    fn decode_target_rejects_other_lengths() {
        assert_eq!(decode_target(&[0u8; 8]), None);
        assert_eq!(decode_target(&[]), None);
    }
}
