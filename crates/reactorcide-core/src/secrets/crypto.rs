//! AEAD envelope primitives shared by the master-key and secret-value
//! sealing layers. AES-256-GCM, fresh random nonce per operation, as
//! recommended by the secret-store design.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;

pub const DEK_LEN: usize = 32;
const NONCE_LEN: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("seal failed")]
    SealFailed,
    #[error("open failed: ciphertext or key is invalid")]
    OpenFailed,
    #[error("malformed sealed blob")]
    MalformedBlob,
}

/// AEAD-seal `plaintext` under `key` with a fresh random nonce, returning
/// base64(nonce || ciphertext).
pub fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<String, CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::SealFailed)?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(blob))
}

/// Inverse of [`seal`]: decode, split nonce from ciphertext, and decrypt.
pub fn open(key: &[u8; 32], sealed_blob: &str) -> Result<Vec<u8>, CryptoError> {
    let blob = STANDARD
        .decode(sealed_blob)
        .map_err(|_| CryptoError::MalformedBlob)?;

    if blob.len() < NONCE_LEN {
        return Err(CryptoError::MalformedBlob);
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::OpenFailed)
}

/// Generate a fresh random 256-bit data-encryption key.
pub fn generate_dek() -> [u8; DEK_LEN] {
    let mut dek = [0u8; DEK_LEN];
    rand::thread_rng().fill_bytes(&mut dek);
    dek
}

#[cfg(test)]
#[path = "crypto_tests.rs"]
mod tests;
