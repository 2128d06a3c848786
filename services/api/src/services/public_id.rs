//! services/api/src/services/public_id.rs
//!
//! Unguessable identifiers for published events.

use rand::{rngs::OsRng, Rng};
use std::sync::Arc;

/// URL-safe, 64 symbols: every character carries 6 bits.
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// 12 symbols, 72 bits of entropy.
pub const PUBLIC_ID_LEN: usize = 12;

/// Something that hands out fresh public identifiers.
pub type PublicIdSource = Arc<dyn Fn() -> String + Send + Sync>;

/// Draws an identifier from the operating system's CSPRNG.
pub fn generate_public_id() -> String {
    let mut rng = OsRng;
    (0..PUBLIC_ID_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

pub fn random_source() -> PublicIdSource {
    Arc::new(generate_public_id)
}
