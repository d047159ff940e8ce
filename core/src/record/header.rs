use serde::{Deserialize, Serialize};

use super::metadata::Metadata;
use super::time::Timestamp;

/// Geographic position of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

/// Instrument sensitivity at a reference frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSensitivity {
    pub value: f64,
    pub frequency: f64,
    pub input_units: String,
    pub output_units: String,
}

/// Channel response; only the overall sensitivity is carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub instrument_sensitivity: InstrumentSensitivity,
}

/// Header fields describing one channel's time series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordHeader {
    pub network: String,
    pub station: String,
    #[serde(default)]
    pub location: String,
    pub channel: String,
    pub starttime: Timestamp,
    pub sampling_rate: f64,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub standard: Metadata,
    #[serde(default)]
    pub format_specific: Option<Metadata>,
    #[serde(default)]
    pub response: Option<Response>,
}

impl RecordHeader {
    pub fn new(
        network: impl Into<String>,
        station: impl Into<String>,
        location: impl Into<String>,
        channel: impl Into<String>,
        starttime: Timestamp,
        sampling_rate: f64,
    ) -> Self {
        Self {
            network: network.into(),
            station: station.into(),
            location: location.into(),
            channel: channel.into(),
            starttime,
            sampling_rate,
            coordinates: None,
            standard: Metadata::new(),
            format_specific: None,
            response: None,
        }
    }

    /// Seconds per sample.
    pub fn delta(&self) -> f64 {
        1.0 / self.sampling_rate
    }

    /// `network.station.location.channel`
    pub fn seed_id(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.network, self.station, self.location, self.channel
        )
    }

    /// `network.station.channel`, the key used for duplicate detection.
    pub fn channel_code(&self) -> String {
        format!("{}.{}.{}", self.network, self.station, self.channel)
    }

    /// `network.station.` plus the first two characters of the channel code.
    pub fn group_id(&self) -> String {
        let instrument: String = self.channel.chars().take(2).collect();
        format!("{}.{}.{}", self.network, self.station, instrument)
    }
}
