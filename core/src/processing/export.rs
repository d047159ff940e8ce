use log::debug;
use std::collections::BTreeSet;

use crate::inventory::document::StationDescription;
use crate::inventory::units::calibration_units;
use crate::inventory::{Channel, Equipment, Network, Station, StationInventory};
use crate::prelude::{StreamError, StreamResult};
use crate::record::metadata::{finite_number, text_or_empty};
use crate::record::{InstrumentSensitivity, Response, StationRecord, Timestamp};

/// Standard fields with no slot in the station/channel document; they travel
/// in the station description instead.
pub const DESCRIPTION_STANDARD_KEYS: &[&str] = &[
    "instrument_period",
    "instrument_damping",
    "process_time",
    "process_level",
    "structure_type",
    "corner_frequency",
    "source_file",
];

fn channel_from_record(record: &StationRecord) -> StreamResult<Channel> {
    let header = record.header();
    let standard = &header.standard;
    debug!("channel: {}", header.channel);

    let coordinates = header
        .coordinates
        .ok_or_else(|| StreamError::MissingMetadata(format!("{} has no coordinates", record.id())))?;

    let instrument = text_or_empty(standard, "instrument");
    let serial_number = text_or_empty(standard, "sensor_serial_number");
    let sensor = if !instrument.is_empty() || !serial_number.is_empty() {
        Some(Equipment {
            equipment_type: instrument.to_string(),
            serial_number: serial_number.to_string(),
        })
    } else {
        None
    };

    let mut response = header.response.clone();
    if let Some(sensitivity) = finite_number(standard, "instrument_sensitivity") {
        let period = finite_number(standard, "instrument_period")
            .filter(|period| *period > 0.0)
            .ok_or_else(|| {
                StreamError::MissingMetadata(format!(
                    "{} has an instrument sensitivity but no instrument period",
                    record.id()
                ))
            })?;
        response = Some(Response {
            instrument_sensitivity: InstrumentSensitivity {
                value: sensitivity,
                frequency: 1.0 / period,
                input_units: "M/S".into(),
                output_units: "COUNTS".into(),
            },
        });
    }

    Ok(Channel {
        code: header.channel.clone(),
        location_code: header.location.clone(),
        latitude: coordinates.latitude,
        longitude: coordinates.longitude,
        elevation: coordinates.elevation,
        depth: 0.0,
        azimuth: finite_number(standard, "horizontal_orientation"),
        sample_rate: header.sampling_rate,
        storage_format: text_or_empty(standard, "source_format").to_string(),
        calibration_units: calibration_units(text_or_empty(standard, "units"))
            .unwrap_or("")
            .to_string(),
        comments: Some(text_or_empty(standard, "comments"))
            .filter(|comment| !comment.is_empty())
            .map(String::from)
            .into_iter()
            .collect(),
        response,
        sensor,
    })
}

/// Build the station/channel document for a group's members.
pub fn export_metadata(records: &[StationRecord]) -> StreamResult<StationInventory> {
    let first = records.first().ok_or(StreamError::NoIdentity)?;

    let networks: BTreeSet<&str> = records.iter().map(|r| r.header().network.as_str()).collect();
    if networks.len() > 1 {
        return Err(StreamError::MultiNetworkGroup(
            networks.into_iter().map(String::from).collect(),
        ));
    }

    let channels = records
        .iter()
        .map(channel_from_record)
        .collect::<StreamResult<Vec<_>>>()?;

    let header = first.header();
    let mut description = StationDescription::default();
    for key in DESCRIPTION_STANDARD_KEYS {
        if let Some(value) = header.standard.get(*key) {
            description.standard.insert(key.to_string(), value.clone());
        }
    }
    if let Some(format_specific) = &header.format_specific {
        description.format_specific = format_specific.clone();
    }
    let description = serde_json::to_string(&description)?;

    let coordinates = header
        .coordinates
        .ok_or_else(|| StreamError::MissingMetadata(format!("{} has no coordinates", first.id())))?;
    let source = text_or_empty(&header.standard, "source").to_string();

    let station = Station {
        code: header.station.clone(),
        latitude: coordinates.latitude,
        longitude: coordinates.longitude,
        elevation: coordinates.elevation,
        site_name: text_or_empty(&header.standard, "station_name").to_string(),
        description,
        creation_date: Timestamp::EPOCH,
        total_number_of_channels: records.len(),
        channels,
    };

    Ok(StationInventory {
        source: source.clone(),
        networks: vec![Network {
            code: header.network.clone(),
            description: source,
            stations: vec![station],
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Coordinates, MetadataValue, RecordHeader};

    fn record(network: &str, channel: &str) -> StationRecord {
        let mut header = RecordHeader::new(network, "STA", "--", channel, Timestamp::EPOCH, 100.0);
        header.coordinates = Some(Coordinates {
            latitude: 35.0,
            longitude: -117.5,
            elevation: 700.0,
        });
        header.standard.insert("units".into(), "acc".into());
        header.standard.insert("instrument".into(), "FBA-23".into());
        header.standard.insert("sensor_serial_number".into(), "".into());
        header.standard.insert("station_name".into(), "Test Station".into());
        header.standard.insert("source".into(), "Test Agency".into());
        header.standard.insert("process_level".into(), "V1".into());
        header.standard.insert("horizontal_orientation".into(), f64::NAN.into());
        StationRecord::new(vec![0.0; 10], header)
    }

    #[test]
    fn channel_fields_are_synthesized() {
        let mut rec = record("TE", "HN1");
        rec.header_mut()
            .standard
            .insert("instrument_sensitivity".into(), 2.5.into());
        rec.header_mut()
            .standard
            .insert("instrument_period".into(), 0.04.into());
        let channel = channel_from_record(&rec).unwrap();
        assert_eq!(channel.calibration_units, "cm/s/s");
        assert_eq!(channel.azimuth, None);
        assert!(channel.comments.is_empty());
        assert_eq!(channel.sensor.unwrap().equipment_type, "FBA-23");
        let sensitivity = channel.response.unwrap().instrument_sensitivity;
        assert_eq!(sensitivity.value, 2.5);
        assert!((sensitivity.frequency - 25.0).abs() < 1e-9);
    }

    #[test]
    fn sensor_is_omitted_without_instrument_or_serial() {
        let mut rec = record("TE", "HN1");
        rec.header_mut().standard.remove("instrument");
        assert!(channel_from_record(&rec).unwrap().sensor.is_none());
    }

    #[test]
    fn description_combines_whitelist_and_format_specific() {
        let mut rec = record("TE", "HN1");
        let mut extra = crate::record::Metadata::new();
        extra.insert("vertical_orientation".into(), 90.0.into());
        rec.header_mut().format_specific = Some(extra);
        let inventory = export_metadata(&[rec]).unwrap();
        let station = &inventory.networks[0].stations[0];
        let parsed: StationDescription = serde_json::from_str(&station.description).unwrap();
        assert_eq!(parsed.standard["process_level"], MetadataValue::from("V1"));
        assert!(!parsed.standard.contains_key("instrument"));
        assert_eq!(parsed.format_specific["vertical_orientation"].as_f64(), Some(90.0));
        assert_eq!(station.site_name, "Test Station");
        assert_eq!(inventory.source, "Test Agency");
    }

    #[test]
    fn multiple_networks_are_rejected() {
        let err = export_metadata(&[record("TE", "HN1"), record("XX", "HN2")]).unwrap_err();
        assert!(matches!(err, StreamError::MultiNetworkGroup(nets) if nets == vec!["TE", "XX"]));
    }

    #[test]
    fn non_finite_format_specific_value_fails_serialization() {
        let mut rec = record("TE", "HN1");
        let mut extra = crate::record::Metadata::new();
        extra.insert("gain".into(), f64::INFINITY.into());
        rec.header_mut().format_specific = Some(extra);
        let err = export_metadata(&[rec]).unwrap_err();
        assert!(matches!(err, StreamError::MetadataSerialization(_)));
    }

    #[test]
    fn sensitivity_without_period_is_missing_metadata() {
        let mut rec = record("TE", "HN1");
        rec.header_mut()
            .standard
            .insert("instrument_sensitivity".into(), 2.5.into());
        assert!(matches!(
            export_metadata(&[rec]),
            Err(StreamError::MissingMetadata(_))
        ));
    }
}
