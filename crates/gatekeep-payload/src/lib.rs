//! Payload encoding engine for Gatekeep.
//!
//! Every encoder is a pure function of its input bytes and an injected
//! random number generator, so output is reproducible under a seeded RNG.

pub mod chunk;
pub mod escape;
pub mod file;
pub mod input;
pub mod sized;

pub use chunk::chunk;
pub use escape::{c_array, escape_bytes};
pub use file::{Upload, from_upload};
pub use input::{PayloadInput, decode_hex, from_input};
pub use sized::{c_array_payload, quoted_escape_payload};

/// Bytes per kilobyte of requested payload size.
pub const KILOBYTE: usize = 1024;
