use log::warn;
use serde::{Deserialize, Serialize};

use super::units::units_from_calibration;
use super::{ChannelMetadata, InventoryLookup};
use crate::record::{Coordinates, Metadata, MetadataValue, RecordHeader, Response, Timestamp};

/// Sensor description attached to a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub serial_number: String,
}

/// Channel-level entry of the exported inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub code: String,
    pub location_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub depth: f64,
    /// Absent when the orientation is unknown (vertical components).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azimuth: Option<f64>,
    pub sample_rate: f64,
    pub storage_format: String,
    pub calibration_units: String,
    #[serde(default)]
    pub comments: Vec<String>,
    pub response: Option<Response>,
    pub sensor: Option<Equipment>,
}

/// Station-level entry; `description` holds the JSON side document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub site_name: String,
    pub description: String,
    pub creation_date: Timestamp,
    pub total_number_of_channels: usize,
    pub channels: Vec<Channel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub code: String,
    pub description: String,
    pub stations: Vec<Station>,
}

/// Exportable station/channel metadata document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationInventory {
    pub source: String,
    pub networks: Vec<Network>,
}

/// Side document stored in the station description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationDescription {
    pub standard: Metadata,
    pub format_specific: Metadata,
}

/// Blank and `--` location codes name the same location.
fn same_location(a: &str, b: &str) -> bool {
    fn normalize(code: &str) -> &str {
        if code.is_empty() {
            "--"
        } else {
            code
        }
    }
    normalize(a) == normalize(b)
}

/// Empty strings in the document stand for fields the record never had.
fn insert_text(standard: &mut Metadata, key: &str, value: &str) {
    if !value.is_empty() {
        standard.insert(key.into(), value.into());
    }
}

impl StationInventory {
    fn find(&self, header: &RecordHeader) -> Option<(&Station, &Channel)> {
        let station = self
            .networks
            .iter()
            .filter(|network| network.code == header.network)
            .flat_map(|network| network.stations.iter())
            .find(|station| station.code == header.station)?;
        let channel = station
            .channels
            .iter()
            .find(|channel| {
                channel.code == header.channel
                    && same_location(&channel.location_code, &header.location)
            })?;
        Some((station, channel))
    }
}

impl InventoryLookup for StationInventory {
    fn channel_metadata(&self, header: &RecordHeader) -> Option<ChannelMetadata> {
        let (station, channel) = self.find(header)?;

        let mut standard = Metadata::new();
        if let Some(units) = units_from_calibration(&channel.calibration_units) {
            standard.insert("units".into(), units.into());
        }
        if let Some(sensor) = &channel.sensor {
            insert_text(&mut standard, "instrument", &sensor.equipment_type);
            insert_text(&mut standard, "sensor_serial_number", &sensor.serial_number);
        }
        standard.insert(
            "horizontal_orientation".into(),
            channel.azimuth.unwrap_or(f64::NAN).into(),
        );
        insert_text(&mut standard, "source_format", &channel.storage_format);
        insert_text(&mut standard, "station_name", &station.site_name);
        insert_text(&mut standard, "source", &self.source);
        if let Some(comment) = channel.comments.first() {
            insert_text(&mut standard, "comments", comment);
        }
        if let Some(response) = &channel.response {
            standard.insert(
                "instrument_sensitivity".into(),
                MetadataValue::Number(response.instrument_sensitivity.value),
            );
        }

        let mut format_specific = None;
        match serde_json::from_str::<StationDescription>(&station.description) {
            Ok(description) => {
                standard.extend(description.standard);
                if !description.format_specific.is_empty() {
                    format_specific = Some(description.format_specific);
                }
            }
            Err(err) => warn!(
                "station {} description is not a metadata document: {}",
                station.code, err
            ),
        }

        Some(ChannelMetadata {
            coordinates: Some(Coordinates {
                latitude: channel.latitude,
                longitude: channel.longitude,
                elevation: channel.elevation,
            }),
            standard,
            format_specific,
            response: channel.response.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory(azimuth: Option<f64>) -> StationInventory {
        StationInventory {
            source: String::new(),
            networks: vec![Network {
                code: "TE".into(),
                description: String::new(),
                stations: vec![Station {
                    code: "STA".into(),
                    latitude: 34.0,
                    longitude: -118.0,
                    elevation: 100.0,
                    site_name: String::new(),
                    description: "{\"standard\":{},\"format_specific\":{}}".into(),
                    creation_date: Timestamp::EPOCH,
                    total_number_of_channels: 1,
                    channels: vec![Channel {
                        code: "HN1".into(),
                        location_code: "--".into(),
                        latitude: 34.0,
                        longitude: -118.0,
                        elevation: 100.0,
                        depth: 0.0,
                        azimuth,
                        sample_rate: 100.0,
                        storage_format: String::new(),
                        calibration_units: "cm/s/s".into(),
                        comments: Vec::new(),
                        response: None,
                        sensor: None,
                    }],
                }],
            }],
        }
    }

    #[test]
    fn blank_location_finds_dashed_channel() {
        let header = RecordHeader::new("TE", "STA", "", "HN1", Timestamp::EPOCH, 100.0);
        assert!(inventory(Some(30.0)).channel_metadata(&header).is_some());
        let other = RecordHeader::new("TE", "STA", "10", "HN1", Timestamp::EPOCH, 100.0);
        assert!(inventory(Some(30.0)).channel_metadata(&other).is_none());
    }

    #[test]
    fn empty_document_fields_are_not_invented() {
        let header = RecordHeader::new("TE", "STA", "--", "HN1", Timestamp::EPOCH, 100.0);
        let found = inventory(None).channel_metadata(&header).unwrap();
        let keys: Vec<&str> = found.standard.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["horizontal_orientation", "units"]);
        assert!(found.standard["horizontal_orientation"].as_f64().unwrap().is_nan());

        let oriented = inventory(Some(30.0)).channel_metadata(&header).unwrap();
        assert_eq!(oriented.standard["horizontal_orientation"].as_f64(), Some(30.0));
    }

    #[test]
    fn unknown_azimuth_is_left_out_of_the_document() {
        let text = serde_json::to_string(&inventory(None)).unwrap();
        assert!(!text.contains("azimuth"));
        let parsed: StationInventory = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.networks[0].stations[0].channels[0].azimuth, None);
    }
}
