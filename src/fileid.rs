//! Public file identifier generation.
//!
//! Identifiers are a fixed `file-` prefix plus a 24-character URL-safe
//! base64 suffix from 18 bytes of system randomness (144 bits). At 10^8
//! generated identifiers the birthday-bound collision probability is far
//! below 1e-12, so an observed duplicate on create is treated as a generator
//! collision and retried once by the caller rather than surfaced.

use base64::Engine;
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;

/// Prefix tagging identifiers as file records.
pub const FILE_ID_PREFIX: &str = "file-";

const SUFFIX_BYTES: usize = 18;

#[derive(Debug, Error)]
pub enum FileIdError {
    #[error("Randomness source unavailable")]
    Rng,
}

/// Generate a new globally unique file identifier.
///
/// Fails only when the underlying randomness source does, which is fatal to
/// the request; silent retry could mask entropy starvation.
pub fn generate() -> Result<String, FileIdError> {
    let mut suffix = [0u8; SUFFIX_BYTES];
    SystemRandom::new()
        .fill(&mut suffix)
        .map_err(|_| FileIdError::Rng)?;

    let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(suffix);
    Ok(format!("{FILE_ID_PREFIX}{encoded}"))
}
