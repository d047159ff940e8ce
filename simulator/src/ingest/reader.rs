use anyhow::Context;
use gmstream::inventory::classification::stamp_structure_type;
use gmstream::inventory::StationInventory;
use gmstream::record::{MetadataValue, RawTrace, StationRecord};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// JSON waveform file: traces plus an optional station inventory.
#[derive(Debug, Deserialize)]
pub struct WaveformFile {
    pub traces: Vec<RawTrace>,
    #[serde(default)]
    pub inventory: Option<StationInventory>,
}

/// Match one dot-separated code against a pattern where `?` stands for any
/// single character.
fn component_matches(pattern: &str, code: &str) -> bool {
    pattern.chars().count() == code.chars().count()
        && pattern
            .chars()
            .zip(code.chars())
            .all(|(p, c)| p == '?' || p == c)
}

/// True when `net.sta.chan.loc` matches an exclude pattern component-wise.
pub fn is_excluded(seismometer: &str, patterns: &[String]) -> bool {
    let parts: Vec<&str> = seismometer.split('.').collect();
    patterns.iter().any(|pattern| {
        let pattern_parts: Vec<&str> = pattern.split('.').collect();
        pattern_parts.len() == parts.len()
            && pattern_parts
                .iter()
                .zip(parts.iter())
                .all(|(p, c)| component_matches(p, c))
    })
}

/// Read a waveform file into station records, dropping excluded channels.
pub fn read_waveform_file<P: AsRef<Path>>(
    path: P,
    exclude: &[String],
) -> anyhow::Result<Vec<StationRecord>> {
    let path_ref = path.as_ref();
    debug!("reading waveform file {}", path_ref.display());
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading waveform file {}", path_ref.display()))?;
    let file: WaveformFile = serde_json::from_str(&contents)
        .with_context(|| format!("parsing waveform file {}", path_ref.display()))?;
    let source_file = path_ref
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path_ref.display().to_string());

    let mut records = Vec::with_capacity(file.traces.len());
    for mut raw in file.traces {
        if raw.header.location.is_empty() {
            raw.header.location = "--".into();
        }
        let header = &raw.header;
        let seismometer = format!(
            "{}.{}.{}.{}",
            header.network, header.station, header.channel, header.location
        );
        if is_excluded(&seismometer, exclude) {
            info!(
                "{}.{}.{} has a band which should be excluded; not adding it to a group",
                header.network, header.station, header.channel
            );
            continue;
        }

        let mut record = match &file.inventory {
            Some(inventory) => StationRecord::from_raw(raw, inventory),
            None => StationRecord::new(raw.data, raw.header),
        };
        stamp_structure_type(&mut record);
        record
            .header_mut()
            .standard
            .insert("source_file".into(), MetadataValue::from(source_file.as_str()));
        records.push(record);
    }
    Ok(records)
}
