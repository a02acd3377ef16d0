use std::path::Path;

use bws_core::errors::BwsError;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::serde::to_canonical_json_bytes;

/// Computes a stable hexadecimal hash for the provided serializable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, BwsError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(format!("{:x}", Sha256::digest(bytes)))
}

/// SHA-256 over raw bytes.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Hashes the contents of several files in order.
///
/// Each file contributes its length before its bytes, so moving data
/// between adjacent files changes the digest.
pub fn hash_files<P: AsRef<Path>>(paths: &[P]) -> Result<String, BwsError> {
    let mut hasher = Sha256::new();
    for path in paths {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|err| BwsError::io("hash-read", path.display(), err))?;
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
