use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

use super::config::{MAX_SIZE, MIN_SIZE};

/// Serialize timestamps the way browsers print `Date#toISOString`: millisecond precision, `Z`
pub fn serialize_timestamp<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Accepts both RFC3339 strings and integer epoch milliseconds
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(n) => {
            let ms = n.as_i64().ok_or_else(|| Error::custom("invalid timestamp"))?;
            DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| Error::custom("timestamp out of range"))
        }
        Value::String(s) => s
            .parse::<DateTime<Utc>>()
            .map_err(|e| Error::custom(format!("invalid RFC3339 timestamp: {}", e))),
        _ => Err(Error::custom("timestamp must be a number or string")),
    }
}

/// Record ids are opaque, but an empty one would make `remove` ambiguous
pub fn deserialize_record_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.trim().is_empty() {
        return Err(Error::custom("record id cannot be empty"));
    }
    Ok(s)
}

/// Rendered sizes outside the generator's slider range mark a corrupted record
pub fn deserialize_record_size<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let size = u32::deserialize(deserializer)?;
    if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
        return Err(Error::custom(format!("size {} outside {}..={}", size, MIN_SIZE, MAX_SIZE)));
    }
    Ok(size)
}
