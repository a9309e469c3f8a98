use std::str::FromStr;

use chrono::{NaiveDateTime, SecondsFormat};
use serde::Serializer;

// db <-> json util functions.

/// Format a stored (UTC) timestamp the way clients expect it:
/// `2020-07-09T20:11:00.000Z`.
pub fn timestamp_to_string(ts: &NaiveDateTime) -> String {
  ts.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn serialize_timestamp<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
  S: Serializer,
{
  serializer.serialize_str(&timestamp_to_string(ts))
}

/// Parse a strictly positive integer from a path or query value.
pub fn parse_positive<T>(val: &str) -> Option<T>
where
  T: FromStr + PartialOrd + Default,
{
  match T::from_str(val.trim()) {
    Ok(num) if num > T::default() => Some(num),
    Ok(_) => None,
    Err(_) => {
      log::debug!("Failed to parse positive integer: {:?}", val);
      None
    },
  }
}
