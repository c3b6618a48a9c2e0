//! License key issuance and redemption for Gatekeep.

pub mod keygen;
pub mod snapshot;
pub mod store;
pub mod types;

pub use keygen::{KEY_ALPHABET, KEY_LENGTH, generate_key};
pub use snapshot::{JsonFileStore, MemoryStore};
pub use store::{LicenseStore, StoreOptions};
pub use types::{DurationUnit, IssuedKey};
