//! Cache key generation for geocoded addresses.

use sha2::{Digest, Sha256};

/// Compute the lookup key for a queried address.
///
/// Addresses are trimmed and upper-cased before hashing so lookups ignore
/// case, including non-ASCII letters SQLite's `upper()` would leave alone.
pub fn address_key(address: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(address.trim().to_uppercase().as_bytes());
    hex::encode(hasher.finalize())
}
