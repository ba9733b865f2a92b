//! Password hashing. Uses a plain SHA-256 hex digest (no salt) to match the
//! wire-visible login contract used by the lobby and developer services.

use sha2::{Digest, Sha256};

/// Hashes `password` returning its lowercase hex SHA-256 digest.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    hex_encode(&digest)
}

/// Checks `password` against a previously hashed digest.
pub fn verify_password(password: &str, hash: &str) -> bool {
    hash_password(password) == hash
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut out, "{byte:02x}").expect("writing to a String never fails");
    }
    out
}
