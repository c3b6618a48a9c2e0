//! Error types for Gatekeep.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Command errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // License errors
    #[error("Invalid unit: {0}. Use 'day(s)' or 'month(s)'")]
    InvalidUnit(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(i64),

    /// Unknown, already redeemed and expired keys all map here.
    #[error("Invalid or expired key")]
    KeyNotFound,

    // Access errors
    #[error("Administrator rights required")]
    NotAdmin,

    #[error("Membership in all required channels is required")]
    MembershipRequired,

    #[error("A redeemed key is required")]
    EntitlementRequired,

    #[error("Membership lookup failed: {0}")]
    Membership(String),

    // Payload errors
    #[error("Hex input has an odd number of digits ({0})")]
    OddLengthHex(usize),

    #[error("Invalid hex digit {digit:?} at position {index}")]
    InvalidHexDigit { digit: char, index: usize },

    #[error("Payload too large: {size} exceeds limit of {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Unsupported upload: {0}")]
    UnsupportedUpload(String),

    // Infrastructure errors
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::PersistenceFailure(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::PersistenceFailure(err.to_string())
    }
}

impl Error {
    /// Whether the error is caused by the caller's input and can be fixed by
    /// resending a corrected command.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_)
                | Error::InvalidUnit(_)
                | Error::InvalidDuration(_)
                | Error::KeyNotFound
                | Error::OddLengthHex(_)
                | Error::InvalidHexDigit { .. }
                | Error::PayloadTooLarge { .. }
                | Error::UnsupportedUpload(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_maps_to_persistence_failure() {
        let err: Error = std::io::Error::other("disk full").into();
        assert!(matches!(err, Error::PersistenceFailure(ref m) if m.contains("disk full")));
        assert!(!err.is_user_correctable());
    }

    #[test]
    fn test_key_not_found_message_is_uniform() {
        assert_eq!(Error::KeyNotFound.to_string(), "Invalid or expired key");
        assert!(Error::KeyNotFound.is_user_correctable());
    }
}
