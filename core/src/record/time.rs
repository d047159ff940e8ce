use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const NANOS_PER_SECOND: f64 = 1e9;

/// Absolute UTC instant stored as integer nanoseconds since the Unix epoch.
///
/// Integer storage keeps start/end comparisons exact, so two records either
/// share a start time or they do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp(0);

    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub fn from_seconds(seconds: f64) -> Self {
        Self((seconds * NANOS_PER_SECOND).round() as i64)
    }

    pub fn as_nanos(self) -> i64 {
        self.0
    }

    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / NANOS_PER_SECOND
    }

    /// Shift by a (possibly fractional) number of seconds, rounded to the nanosecond.
    pub fn offset_by(self, seconds: f64) -> Self {
        Self(self.0 + (seconds * NANOS_PER_SECOND).round() as i64)
    }

    /// Signed number of seconds from `earlier` to `self`.
    pub fn seconds_since(self, earlier: Timestamp) -> f64 {
        (self.0 - earlier.0) as f64 / NANOS_PER_SECOND
    }

    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }

    pub fn from_datetime(datetime: DateTime<Utc>) -> Option<Self> {
        datetime.timestamp_nanos_opt().map(Self)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.to_datetime().to_rfc3339_opts(SecondsFormat::Micros, true)
        )
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_datetime().to_rfc3339_opts(SecondsFormat::Nanos, true))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let parsed = DateTime::parse_from_rfc3339(&text).map_err(de::Error::custom)?;
        Timestamp::from_datetime(parsed.with_timezone(&Utc))
            .ok_or_else(|| de::Error::custom(format!("timestamp {} out of range", text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_convert_to_whole_nanoseconds() {
        let ts = Timestamp::from_seconds(1.5);
        assert_eq!(ts.as_nanos(), 1_500_000_000);
        assert_eq!(ts.offset_by(0.02).as_nanos(), 1_520_000_000);
        assert_eq!(ts.offset_by(0.02).seconds_since(ts), 0.02);
    }

    #[test]
    fn timestamp_serializes_as_rfc3339() {
        let ts = Timestamp::from_seconds(86_400.25);
        let text = serde_json::to_string(&ts).unwrap();
        assert_eq!(text, "\"1970-01-02T00:00:00.250000000Z\"");
        let back: Timestamp = serde_json::from_str(&text).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn display_uses_microsecond_precision() {
        assert_eq!(Timestamp::EPOCH.to_string(), "1970-01-01T00:00:00.000000Z");
    }
}
