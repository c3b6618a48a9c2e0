//! Random license key generation.

use gatekeep_core::LicenseKey;
use rand::Rng;
use rand::distributions::Alphanumeric;

/// Characters per key.
pub const KEY_LENGTH: usize = 11;

/// Symbols a key is drawn from: ASCII letters and digits.
pub const KEY_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Draws a key of [`KEY_LENGTH`] symbols uniformly from [`KEY_ALPHABET`].
pub fn generate_key<R: Rng + ?Sized>(rng: &mut R) -> LicenseKey {
    let key: String = (0..KEY_LENGTH)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect();
    LicenseKey::new(key)
}
