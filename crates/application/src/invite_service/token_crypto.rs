use std::fmt::Write;

use sha2::{Digest, Sha256};

use super::*;

/// Generates a random invite token and its SHA-256 hash.
///
/// Returns `(raw_token_hex, sha256_hash_hex)`.
pub(super) fn generate_token() -> AppResult<(String, String)> {
    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes)
        .map_err(|error| AppError::Internal(format!("failed to generate invite token: {error}")))?;

    let raw_token = to_hex(&bytes);
    let token_hash = hash_token(&raw_token);
    Ok((raw_token, token_hash))
}

/// Hashes a raw token for lookup.
pub(super) fn hash_token(raw_token: &str) -> String {
    to_hex(&Sha256::digest(raw_token.as_bytes()))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        })
}
