//! Content hashing for cache keys.
//!
//! MD5 is used for key derivation only, never for anything security related.
//! Keeping it lets keys line up with entries written by older deployments.

/// Lowercase hex MD5 digest of `text`.
pub fn md5_hex(text: &str) -> String {
    format!("{:x}", md5::compute(text.as_bytes()))
}
