//! AES-256-GCM encryption for secrets at rest.
//!
//! Payload format: `base64(iv).base64(ciphertext).base64(tag)` with a
//! 12-byte random IV and a 16-byte authentication tag, matching what
//! existing stored secrets already look like.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use admiral_core::{AppError, AppResult};

const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

pub fn encrypt(key: &[u8; 32], plaintext: &str) -> AppResult<String> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let sealed = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
        .map_err(|e| AppError::Crypto(format!("AES-GCM encrypt: {e}")))?;
    // The aead API appends the tag to the ciphertext.
    let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);

    Ok(format!(
        "{}.{}.{}",
        STANDARD.encode(iv),
        STANDARD.encode(ciphertext),
        STANDARD.encode(tag)
    ))
}

pub fn decrypt(key: &[u8; 32], payload: &str) -> AppResult<String> {
    let segments: Vec<&str> = payload.split('.').collect();
    let [iv, ciphertext, tag] = segments.as_slice() else {
        return Err(AppError::Crypto("Invalid encrypted payload format.".into()));
    };

    let iv = decode_segment(iv)?;
    let mut sealed = decode_segment(ciphertext)?;
    sealed.extend(decode_segment(tag)?);

    if iv.len() != IV_LEN {
        return Err(AppError::Crypto("Invalid encrypted payload format.".into()));
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&iv), sealed.as_slice())
        .map_err(|e| AppError::Crypto(format!("AES-GCM decrypt: {e}")))?;

    String::from_utf8(plaintext).map_err(|e| AppError::Crypto(format!("utf-8 decode: {e}")))
}

fn decode_segment(segment: &str) -> AppResult<Vec<u8>> {
    STANDARD
        .decode(segment)
        .map_err(|e| AppError::Crypto(format!("base64 decode: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [42u8; 32];

    #[test]
    fn round_trips_arbitrary_strings() {
        for plaintext in ["", "secret", "emoji ✨ and unicode ñ", "{\"json\":true}"] {
            let sealed = encrypt(&KEY, plaintext).unwrap();
            assert_eq!(decrypt(&KEY, &sealed).unwrap(), plaintext);
        }
    }

    #[test]
    fn payload_has_three_segments() {
        let sealed = encrypt(&KEY, "secret").unwrap();
        assert_eq!(sealed.split('.').count(), 3);
    }

    #[test]
    fn encryption_is_randomized() {
        let a = encrypt(&KEY, "secret").unwrap();
        let b = encrypt(&KEY, "secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_segment_count_is_a_format_error() {
        for payload in ["", "abc", "abc.def", "a.b.c.d"] {
            match decrypt(&KEY, payload) {
                Err(AppError::Crypto(message)) => {
                    assert_eq!(message, "Invalid encrypted payload format.");
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let sealed = encrypt(&KEY, "secret").unwrap();
        let other_key = [7u8; 32];
        assert!(decrypt(&other_key, &sealed).is_err());
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let sealed = encrypt(&KEY, "secret").unwrap();
        let mut segments: Vec<String> = sealed.split('.').map(str::to_owned).collect();
        segments[1] = STANDARD.encode(b"tampered");
        assert!(decrypt(&KEY, &segments.join(".")).is_err());
    }
}
