use anyhow::{ensure, Context};
use gmstream::record::{Coordinates, MetadataValue, RecordHeader, StationRecord, Timestamp};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::template::sine_wave;

/// Configuration for generating one synthetic multi-component station.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub network: String,
    pub station: String,
    pub instrument: String,
    pub components: Vec<String>,
    pub sampling_rate: f64,
    pub npts: usize,
    /// Start offset of each component, in (possibly fractional) samples.
    pub start_offsets: Vec<f64>,
    pub start_seconds: f64,
    pub frequency: f64,
    pub noise: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            network: "TE".into(),
            station: "STA".into(),
            instrument: "HN".into(),
            components: vec!["1".into(), "2".into(), "Z".into()],
            sampling_rate: 100.0,
            npts: 2000,
            start_offsets: Vec::new(),
            start_seconds: 1_577_836_800.0,
            frequency: 1.5,
            noise: 0.01,
            seed: 0,
        }
    }
}

fn standard_metadata(header: &mut RecordHeader, station: &str) {
    header.coordinates = Some(Coordinates {
        latitude: 34.05,
        longitude: -118.25,
        elevation: 90.0,
    });
    let standard = &mut header.standard;
    standard.insert("units".into(), MetadataValue::from("acc"));
    standard.insert("instrument".into(), MetadataValue::from("synthetic accelerometer"));
    standard.insert("sensor_serial_number".into(), MetadataValue::from(""));
    standard.insert("station_name".into(), MetadataValue::from(station));
    standard.insert("source".into(), MetadataValue::from("simulator"));
    standard.insert("source_format".into(), MetadataValue::from("synthetic"));
    standard.insert("process_level".into(), MetadataValue::from("V0"));
    standard.insert("comments".into(), MetadataValue::from(""));
}

/// Build one record per component, each a noisy sine wave.
pub fn build_records(config: &GeneratorConfig) -> anyhow::Result<Vec<StationRecord>> {
    ensure!(config.sampling_rate > 0.0, "sampling rate must be positive");
    let delta = 1.0 / config.sampling_rate;
    let mut rng = StdRng::seed_from_u64(config.seed);

    config
        .components
        .iter()
        .enumerate()
        .map(|(index, component)| {
            let offset = config.start_offsets.get(index).copied().unwrap_or(0.0) * delta;
            let mut data = sine_wave(config.npts, config.frequency, delta, offset);
            if config.noise > 0.0 {
                for value in data.iter_mut() {
                    *value += rng.gen_range(-config.noise..config.noise);
                }
            }
            let channel = format!("{}{}", config.instrument, component);
            let mut header = RecordHeader::new(
                config.network.clone(),
                config.station.clone(),
                "--",
                channel,
                Timestamp::from_seconds(config.start_seconds).offset_by(offset),
                config.sampling_rate,
            );
            standard_metadata(&mut header, &config.station);
            ensure!(
                header.channel.chars().count() >= 2,
                "channel code {} is too short",
                header.channel
            );
            Ok(StationRecord::new(data, header))
        })
        .collect::<anyhow::Result<Vec<_>>>()
        .with_context(|| format!("generating records for {}", config.station))
}

/// Synthetic batch covering each reconciliation path: aligned, whole-sample
/// offset, half-sample offset, disjoint windows and a duplicated channel.
pub fn scenario_batch(seed: u64) -> anyhow::Result<Vec<StationRecord>> {
    let base = GeneratorConfig {
        seed,
        ..Default::default()
    };
    let scenarios = vec![
        GeneratorConfig {
            station: "ALGN".into(),
            ..base.clone()
        },
        GeneratorConfig {
            station: "SHFT".into(),
            start_offsets: vec![0.0, 2.0, 0.0],
            ..base.clone()
        },
        GeneratorConfig {
            station: "HALF".into(),
            start_offsets: vec![0.0, 0.5, 0.0],
            ..base.clone()
        },
        GeneratorConfig {
            station: "DISJ".into(),
            components: vec!["1".into(), "2".into()],
            start_offsets: vec![0.0, 5000.0],
            ..base.clone()
        },
        GeneratorConfig {
            station: "DUPL".into(),
            components: vec!["1".into(), "1".into(), "Z".into()],
            ..base
        },
    ];

    let mut records = Vec::new();
    for config in &scenarios {
        records.extend(build_records(config)?);
    }
    Ok(records)
}
