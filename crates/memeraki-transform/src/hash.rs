#![deny(unsafe_code)]

use sha2::Digest;

/// Separator placed between natural-key parts before hashing.
const KEY_SEPARATOR: char = '\u{1f}';

/// Deterministic 16-byte identifier of a natural key, rendered as lowercase
/// hex. Parts are lowercased so that case-only differences map to the same
/// document.
pub fn natural_key_hash(parts: &[String]) -> String {
    let joined = parts
        .iter()
        .map(|part| part.trim().to_lowercase())
        .collect::<Vec<_>>()
        .join(&KEY_SEPARATOR.to_string());
    let digest = sha2::Sha256::digest(joined.as_bytes());
    hex::encode(&digest[..16])
}
