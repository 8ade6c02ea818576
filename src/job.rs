//! Mining job and solution types, and nonce injection into a blob.

use crate::target::{check_hash_target, decode_target};

/// Byte offset of the 4-byte nonce field within a job's blob.
pub const NONCE_OFFSET: usize = 39;
/// Minimum blob length for the nonce field to fit.
pub const MIN_BLOB_LEN: usize = NONCE_OFFSET + 4;

/// A work unit received from the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningJob {
    pub job_id: String,
    pub blob: Vec<u8>,
    pub target: [u8; 32],
    pub seed_hash: [u8; 32],
}

/// A qualifying hash found by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub job_id: String,
    pub nonce: u32,
    pub result_hash: [u8; 32],
}

/// Overwrite bytes `[39, 43)` of `blob` with `nonce` in little-endian order.
/// Leaves all other bytes untouched. No-op (other than the overwrite) if the
/// blob is long enough; callers must check `blob.len() >= MIN_BLOB_LEN`
/// beforehand via [`MiningJob::is_hashable`].
pub fn insert_nonce(blob: &mut [u8], nonce: u32) {
    let bytes = nonce.to_le_bytes();
    blob[NONCE_OFFSET..NONCE_OFFSET + 4].copy_from_slice(&bytes);
}

impl MiningJob {
    /// Whether this job's blob is long enough to carry a nonce. Pools are
    /// expected to send >= 76-byte blobs; anything shorter than
    /// `MIN_BLOB_LEN` cannot be mined and is treated as permanently
    /// non-qualifying.
    pub fn is_hashable(&self) -> bool {
        self.blob.len() >= MIN_BLOB_LEN
    }

    /// Build the hash input for `nonce`: a copy of the blob with the nonce
    /// field overwritten.
    pub fn hash_input(&self, nonce: u32) -> Vec<u8> {
        let mut blob = self.blob.clone();
        insert_nonce(&mut blob, nonce);
        blob
    }

    /// Check whether `hash` qualifies as a share for this job's target.
    pub fn qualifies(&self, hash: &[u8; 32]) -> bool {
        check_hash_target(hash, &self.target)
    }
}

/// Parse a job's wire fields (already-decoded bytes) into a [`MiningJob`].
/// Returns `None` if `target_bytes` is not a 4- or 32-byte compact/full
/// target, or if `seed_bytes` is not exactly 32 bytes.
pub fn build_job(
    job_id: String,
    blob: Vec<u8>,
    target_bytes: &[u8],
    seed_bytes: &[u8],
) -> Option<MiningJob> {
    let target = decode_target(target_bytes)?;
    if seed_bytes.len() != 32 {
        return None;
    }
    let mut seed_hash = [0u8; 32];
    seed_hash.copy_from_slice(seed_bytes);
    Some(MiningJob {
        job_id,
        blob,
        target,
        seed_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s4_nonce_injection() {
        let mut blob = vec![0u8; 43];
        insert_nonce(&mut blob, 0x1122_3344);
        assert_eq!(&blob[39..43], &[0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn nonce_insertion_is_positional() {
        let mut blob = vec![0xAAu8; 80];
        let before_prefix = blob[0..39].to_vec();
        let before_suffix = blob[43..].to_vec();
        insert_nonce(&mut blob, 0xDEAD_BEEF);
        assert_eq!(&blob[0..39], before_prefix.as_slice());
        assert_eq!(&blob[43..], before_suffix.as_slice());
        assert_eq!(&blob[39..43], &0xDEAD_BEEFu32.to_le_bytes());
    }

    #[test]
    fn short_blob_is_not_hashable() {
        let job = MiningJob {
            job_id: "J".to_string(),
            blob: vec![0u8; 10],
            target: [0xff; 32],
            seed_hash: [0u8; 32],
        };
        assert!(!job.is_hashable());
    }

    #[test]
    fn build_job_rejects_bad_target_length() {
        assert!(build_job("J".into(), vec![0u8; 76], &[0u8; 7], &[0u8; 32]).is_none());
    }

    #[test]
    fn build_job_rejects_bad_seed_length() {
        assert!(build_job("J".into(), vec![0u8; 76], &[0xff; 32], &[0u8; 10]).is_none());
    }

    #[test]
    fn build_job_accepts_compact_target() {
        let job = build_job("J".into(), vec![0u8; 76], &[0x00, 0x00, 0x00, 0x01], &[0u8; 32])
            .expect("valid job");
        assert_eq!(job.target[31], 0x01);
    }
}
