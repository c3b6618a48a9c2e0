//! Randomized payloads of a requested size (formats A and B).

use crate::KILOBYTE;
use crate::escape::{c_array, escape_bytes};
use gatekeep_core::{Error, Result};
use rand::Rng;
use tracing::debug;

/// Number of quoted lines a quoted-escape payload is split into.
pub const QUOTED_LINES: usize = 8;

const QUOTE: u8 = b'"';

fn byte_count(size_kb: usize) -> Result<usize> {
    if size_kb == 0 {
        return Err(Error::InvalidArgument(
            "payload size must be a positive number of KB".to_string(),
        ));
    }
    size_kb
        .checked_mul(KILOBYTE)
        .ok_or(Error::PayloadTooLarge {
            size: size_kb,
            limit: usize::MAX / KILOBYTE,
        })
}

/// Bytes that are, with equal probability, a random byte or a double quote.
pub fn quote_mixed_bytes<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<u8> {
    (0..len)
        .map(|_| if rng.gen_bool(0.5) { rng.r#gen() } else { QUOTE })
        .collect()
}

/// Format A: quote-mixed bytes rendered as `\xHH`, split into eight
/// double-quoted lines.
///
/// Each line is `len / 8` characters wide; a remainder past the eighth line
/// is dropped.
pub fn quoted_escape_payload<R: Rng + ?Sized>(size_kb: usize, rng: &mut R) -> Result<String> {
    let bytes = quote_mixed_bytes(byte_count(size_kb)?, rng);
    let escaped = escape_bytes(&bytes);
    let width = escaped.len() / QUOTED_LINES;

    let lines: Vec<String> = (0..QUOTED_LINES)
        .map(|i| format!("\"{}\"", &escaped[i * width..(i + 1) * width]))
        .collect();

    debug!(size_kb, width, "Generated quoted-escape payload");
    Ok(lines.join("\n"))
}

/// Format B: uniformly random bytes as a C array initializer.
pub fn c_array_payload<R: Rng + ?Sized>(size_kb: usize, rng: &mut R) -> Result<String> {
    let mut bytes = vec![0u8; byte_count(size_kb)?];
    rng.fill(bytes.as_mut_slice());

    debug!(size_kb, "Generated c-array payload");
    Ok(c_array(&bytes))
}
