//! Expiry timestamps as stored in the snapshot.

use chrono::{Local, NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Textual form used in the persisted snapshot.
pub const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local wall-clock timestamp with second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expiry(NaiveDateTime);

impl Expiry {
    /// Truncates to whole seconds so the value survives a snapshot round trip.
    pub fn new(at: NaiveDateTime) -> Self {
        Self(at.with_nanosecond(0).unwrap_or(at))
    }

    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(s.trim(), EXPIRY_FORMAT).map(Self)
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Returns `None` when the result leaves chrono's representable range.
    pub fn checked_add_days(&self, days: i64) -> Option<Self> {
        let delta = TimeDelta::try_days(days)?;
        self.0.checked_add_signed(delta).map(Self)
    }

    pub fn has_passed(&self, now: Expiry) -> bool {
        self.0 < now.0
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(EXPIRY_FORMAT))
    }
}

impl Serialize for Expiry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Expiry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Expiry::parse(&raw).map_err(serde::de::Error::custom)
    }
}
