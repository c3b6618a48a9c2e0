//! Byte renderings shared by all payload formats.

use std::fmt::Write;

/// Renders every byte as `\xHH` (lowercase, zero-padded) with no separators.
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4);
    for byte in bytes {
        push_escape(&mut out, *byte);
    }
    out
}

pub(crate) fn push_escape(out: &mut String, byte: u8) {
    // Writing to a String cannot fail.
    let _ = write!(out, "\\x{:02x}", byte);
}

/// Renders bytes as a C array initializer: `{0x00, 0x01, ...}`.
pub fn c_array(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 6 + 2);
    out.push('{');
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "0x{:02x}", byte);
    }
    out.push('}');
    out
}
