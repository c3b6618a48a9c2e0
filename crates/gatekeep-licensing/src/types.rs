//! License types and structures.

use gatekeep_core::{Error, Expiry, LicenseKey, Result};
use std::fmt;
use std::str::FromStr;

/// Days per month when computing expiries.
pub const DAYS_PER_MONTH: i64 = 30;

/// Unit of a key's validity period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Days,
    Months,
}

impl DurationUnit {
    /// Length of `duration` units in days, or `None` on overflow.
    pub fn to_days(self, duration: i64) -> Option<i64> {
        match self {
            DurationUnit::Days => Some(duration),
            DurationUnit::Months => duration.checked_mul(DAYS_PER_MONTH),
        }
    }
}

impl FromStr for DurationUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "days" => Ok(DurationUnit::Days),
            "month" | "months" => Ok(DurationUnit::Months),
            _ => Err(Error::InvalidUnit(s.to_string())),
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationUnit::Days => write!(f, "days"),
            DurationUnit::Months => write!(f, "months"),
        }
    }
}

/// A freshly issued, unredeemed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedKey {
    pub key: LicenseKey,
    pub expires_at: Expiry,
}
