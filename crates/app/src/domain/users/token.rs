//! API token generation and hashing.

use std::fmt;

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// API token prefix.
pub const API_TOKEN_PREFIX: &str = "mt";

/// Number of secret bytes encoded in a token.
pub const API_TOKEN_SECRET_BYTES: usize = 32;

const API_TOKEN_SECRET_HEX_CHARS: usize = API_TOKEN_SECRET_BYTES * 2;

#[derive(Clone)]
pub struct ApiTokenSecret {
    bytes: [u8; API_TOKEN_SECRET_BYTES],
}

impl ApiTokenSecret {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; API_TOKEN_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; API_TOKEN_SECRET_BYTES] {
        &self.bytes
    }
}

impl fmt::Debug for ApiTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiTokenSecret(**redacted**)")
    }
}

impl Drop for ApiTokenSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[must_use]
pub fn generate_api_token_secret() -> ApiTokenSecret {
    let mut secret = [0_u8; API_TOKEN_SECRET_BYTES];

    OsRng.fill_bytes(&mut secret);

    ApiTokenSecret::from_bytes(secret)
}

/// Format a raw bearer token, e.g. `mt_3f9a...`.
#[must_use]
pub fn format_api_token(secret: &ApiTokenSecret) -> String {
    format!("{API_TOKEN_PREFIX}_{}", encode_secret_hex(secret.as_bytes()))
}

/// Generate a fresh raw bearer token.
#[must_use]
pub fn generate_api_token() -> String {
    format_api_token(&generate_api_token_secret())
}

/// Hash a raw bearer token for storage and lookup.
#[must_use]
pub fn hash_api_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

fn encode_secret_hex(secret: &[u8; API_TOKEN_SECRET_BYTES]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    let mut encoded = String::with_capacity(API_TOKEN_SECRET_HEX_CHARS);

    for byte in secret {
        encoded.push(HEX[usize::from(byte >> 4)] as char);
        encoded.push(HEX[usize::from(byte & 0x0f)] as char);
    }

    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_encodes_secret_as_prefixed_hex() {
        let secret = ApiTokenSecret::from_bytes([0xAB; API_TOKEN_SECRET_BYTES]);
        let token = format_api_token(&secret);

        assert_eq!(token, format!("mt_{}", "ab".repeat(API_TOKEN_SECRET_BYTES)));
    }

    #[test]
    fn generated_tokens_differ() {
        assert_ne!(generate_api_token(), generate_api_token());
    }

    #[test]
    fn hash_is_sha256_hex() {
        assert_eq!(
            hash_api_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = ApiTokenSecret::from_bytes([0x01; API_TOKEN_SECRET_BYTES]);

        assert_eq!(format!("{secret:?}"), "ApiTokenSecret(**redacted**)");
    }
}
