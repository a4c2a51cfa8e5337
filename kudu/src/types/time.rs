//! `time_point` (microseconds, u64 wire), `time_point_sec` (seconds, u32
//! wire) and `block_timestamp` (slot count since Y2K, u32 wire).

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::{OptionExt, Snafu};

use kudu_macros::with_location;

use crate::config::{BLOCK_INTERVAL_MS, BLOCK_TIMESTAMP_EPOCH_MS};

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_FORMAT_NO_SECS: &str = "%Y-%m-%dT%H:%M";

#[with_location]
#[derive(Debug, Snafu)]
pub enum InvalidTime {
    #[snafu(display(r#"could not parse "{repr}" as a date"#))]
    DateTimeParse { repr: String },
}

fn parse_date(s: &str) -> Result<NaiveDateTime, InvalidTime> {
    let s = s.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(s, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, DATE_FORMAT_NO_SECS))
        .ok()
        .context(DateTimeParseSnafu { repr: s })
}

macro_rules! impl_serde_via_display {
    ($t:ty) => {
        impl Serialize for $t {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                if serializer.is_human_readable() {
                    self.to_string().serialize(serializer)
                }
                else {
                    self.0.serialize(serializer)
                }
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<$t, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_str(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Microseconds since the Unix epoch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct TimePoint(pub u64);

impl TimePoint {
    pub fn from_str(s: &str) -> Result<Self, InvalidTime> {
        let dt = parse_date(s)?;
        Ok(Self(dt.and_utc().timestamp_micros() as u64))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = chrono::DateTime::from_timestamp_micros(self.0 as i64).unwrap_or_default();
        write!(f, "{}", dt.format(DATE_FORMAT))
    }
}

impl_serde_via_display!(TimePoint);

/// Seconds since the Unix epoch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct TimePointSec(pub u32);

impl TimePointSec {
    pub fn from_str(s: &str) -> Result<Self, InvalidTime> {
        let dt = parse_date(s)?;
        Ok(Self(dt.and_utc().timestamp() as u32))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TimePointSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = chrono::DateTime::from_timestamp(self.0 as i64, 0).unwrap_or_default();
        write!(f, "{}", dt.format(DATE_FORMAT))
    }
}

impl_serde_via_display!(TimePointSec);

/// Slot count since [`BLOCK_TIMESTAMP_EPOCH_MS`], in units of
/// [`BLOCK_INTERVAL_MS`] (spec.md §4.2).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BlockTimestamp(pub u32);

impl BlockTimestamp {
    pub fn from_str(s: &str) -> Result<Self, InvalidTime> {
        let dt = parse_date(s)?;
        let ms = dt.and_utc().timestamp_millis();
        let slot = (ms - BLOCK_TIMESTAMP_EPOCH_MS) / BLOCK_INTERVAL_MS;
        Ok(Self(slot as u32))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn to_millis(&self) -> i64 {
        self.0 as i64 * BLOCK_INTERVAL_MS + BLOCK_TIMESTAMP_EPOCH_MS
    }
}

impl fmt::Display for BlockTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = chrono::DateTime::from_timestamp_millis(self.to_millis()).unwrap_or_default();
        write!(f, "{}", dt.format(DATE_FORMAT))
    }
}

impl_serde_via_display!(BlockTimestamp);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_point_roundtrip() {
        let t = TimePoint::from_str("2020-01-01T00:00:00.500").unwrap();
        assert_eq!(t.to_string(), "2020-01-01T00:00:00.500");
    }

    #[test]
    fn time_point_sec_roundtrip() {
        let t = TimePointSec::from_str("2020-01-01T00:00:00").unwrap();
        assert_eq!(t.as_u32(), 1577836800);
    }

    #[test]
    fn block_timestamp_at_epoch() {
        let t = BlockTimestamp::from_str("2000-01-01T00:00:00").unwrap();
        assert_eq!(t.as_u32(), 0);
    }

    #[test]
    fn block_timestamp_one_slot_later() {
        let t = BlockTimestamp::from_str("2000-01-01T00:00:00.500").unwrap();
        assert_eq!(t.as_u32(), 1);
    }
}
