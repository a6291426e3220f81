use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::errors::CoreError;

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

/// Argon2id cost parameters. Written into every backup header so a backup
/// can be opened even after the defaults change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// KiB
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 19_456,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Reject parameters a crafted backup could use to exhaust memory or CPU.
    pub fn check_bounds(&self) -> Result<(), CoreError> {
        let ok = (8..=1_048_576).contains(&self.memory_cost)
            && (1..=20).contains(&self.time_cost)
            && (1..=16).contains(&self.parallelism);
        if ok {
            Ok(())
        } else {
            Err(CoreError::InvalidFileFormat(format!(
                "KDF parameters out of range (memory {} KiB, time {}, lanes {})",
                self.memory_cost, self.time_cost, self.parallelism
            )))
        }
    }
}

/// Stretch a backup password into an AES-256 key.
pub fn derive_key(
    password: &str,
    salt: &[u8; SALT_LEN],
    params: &KdfParams,
) -> Result<[u8; KEY_LEN], CoreError> {
    let params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| CoreError::Encryption(format!("Invalid Argon2 params: {e}")))?;

    let mut key = [0u8; KEY_LEN];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| CoreError::Encryption(format!("Key derivation failed: {e}")))?;
    Ok(key)
}

/// Encrypt under a fresh random nonce. Returns `(nonce, ciphertext || tag)`.
pub fn seal(
    plaintext: &[u8],
    key: &[u8; KEY_LEN],
) -> Result<([u8; NONCE_LEN], Vec<u8>), CoreError> {
    let nonce = random_bytes::<NONCE_LEN>()?;
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Encryption(format!("Bad key: {e}")))?;
    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CoreError::Encryption(e.to_string()))?;
    Ok((nonce, sealed))
}

/// Decrypt and authenticate. Any mismatch is reported as
/// [`CoreError::Decryption`].
pub fn open(
    sealed: &[u8],
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>, CoreError> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Encryption(format!("Bad key: {e}")))?;
    Ok(cipher.decrypt(Nonce::from_slice(nonce), sealed)?)
}

/// OS randomness for salts and nonces.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], CoreError> {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf)
        .map_err(|e| CoreError::Encryption(format!("No randomness available: {e}")))?;
    Ok(buf)
}
