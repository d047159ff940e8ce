use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::header::RecordHeader;
use super::provenance::ProvenanceNote;
use super::time::Timestamp;
use crate::inventory::InventoryLookup;
use crate::prelude::{StreamError, StreamResult};

/// Pipeline step during which a failure was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStep {
    Reconcile,
    Validate,
    Downstream(String),
}

impl fmt::Display for ProcessingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingStep::Reconcile => write!(f, "reconcile"),
            ProcessingStep::Validate => write!(f, "validate"),
            ProcessingStep::Downstream(name) => write!(f, "{}", name),
        }
    }
}

/// One entry of a record's append-only failure log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub reason: String,
    pub step: ProcessingStep,
}

/// Per-record verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordStatus<'a> {
    Ok,
    Failed(&'a [FailureEntry]),
}

/// Samples and header as handed over by a format adapter, before any
/// inventory metadata has been merged in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTrace {
    pub data: Vec<f64>,
    pub header: RecordHeader,
}

/// Input accepted by group construction.
#[derive(Debug, Clone)]
pub enum TraceInput {
    Raw(RawTrace),
    Station(StationRecord),
}

impl From<RawTrace> for TraceInput {
    fn from(raw: RawTrace) -> Self {
        TraceInput::Raw(raw)
    }
}

impl From<StationRecord> for TraceInput {
    fn from(record: StationRecord) -> Self {
        TraceInput::Station(record)
    }
}

/// One channel's time series with its metadata, provenance and failure log.
#[derive(Debug, Clone)]
pub struct StationRecord {
    data: Vec<f64>,
    header: RecordHeader,
    provenance: Vec<ProvenanceNote>,
    failures: Vec<FailureEntry>,
    cache: HashMap<String, Vec<f64>>,
}

impl StationRecord {
    pub fn new(data: Vec<f64>, header: RecordHeader) -> Self {
        Self {
            data,
            header,
            provenance: Vec::new(),
            failures: Vec::new(),
            cache: HashMap::new(),
        }
    }

    /// Build a station record from a raw trace, filling missing coordinates,
    /// standard keys, format-specific metadata and response from `inventory`.
    /// Values already present on the raw header win.
    pub fn from_raw(raw: RawTrace, inventory: &dyn InventoryLookup) -> Self {
        let RawTrace { data, mut header } = raw;
        match inventory.channel_metadata(&header) {
            Some(found) => {
                if header.coordinates.is_none() {
                    header.coordinates = found.coordinates;
                }
                for (key, value) in found.standard {
                    header.standard.entry(key).or_insert(value);
                }
                if header.format_specific.is_none() {
                    header.format_specific = found.format_specific;
                }
                if header.response.is_none() {
                    header.response = found.response;
                }
            }
            None => debug!("no inventory entry for {}", header.seed_id()),
        }
        Self::new(data, header)
    }

    pub fn from_input(
        input: TraceInput,
        inventory: Option<&dyn InventoryLookup>,
    ) -> StreamResult<Self> {
        match (input, inventory) {
            (TraceInput::Station(record), _) => Ok(record),
            (TraceInput::Raw(raw), Some(inventory)) => Ok(Self::from_raw(raw, inventory)),
            (TraceInput::Raw(raw), None) => {
                Err(StreamError::InvalidRecordType(raw.header.seed_id()))
            }
        }
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn header(&self) -> &RecordHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }

    pub fn id(&self) -> String {
        self.header.seed_id()
    }

    pub fn npts(&self) -> usize {
        self.data.len()
    }

    pub fn starttime(&self) -> Timestamp {
        self.header.starttime
    }

    /// Time of the last sample; equals the start time for an empty record.
    pub fn endtime(&self) -> Timestamp {
        match self.data.len() {
            0 => self.header.starttime,
            n => self
                .header
                .starttime
                .offset_by((n - 1) as f64 * self.header.delta()),
        }
    }

    pub fn delta(&self) -> f64 {
        self.header.delta()
    }

    pub fn sampling_rate(&self) -> f64 {
        self.header.sampling_rate
    }

    pub fn fail(&mut self, step: ProcessingStep, reason: impl Into<String>) {
        let reason = reason.into();
        debug!("{} failed during {}: {}", self.id(), step, reason);
        self.failures.push(FailureEntry { reason, step });
    }

    pub fn has_failed(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failures(&self) -> &[FailureEntry] {
        &self.failures
    }

    pub fn status(&self) -> RecordStatus<'_> {
        if self.failures.is_empty() {
            RecordStatus::Ok
        } else {
            RecordStatus::Failed(&self.failures)
        }
    }

    pub fn set_provenance(&mut self, note: ProvenanceNote) {
        self.provenance.push(note);
    }

    pub fn provenance(&self) -> &[ProvenanceNote] {
        &self.provenance
    }

    pub fn has_cached(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    pub fn get_cached(&self, key: &str) -> StreamResult<&[f64]> {
        self.cache
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| StreamError::CacheEntryNotFound(key.to_string()))
    }

    pub fn set_cached(&mut self, key: impl Into<String>, value: Vec<f64>) {
        self.cache.insert(key.into(), value);
    }

    pub fn remove_cached(&mut self, key: &str) -> Option<Vec<f64>> {
        self.cache.remove(key)
    }

    /// Nearest-sample trim to `[start, end]` without resampling.
    /// Sample range `first..last` that nearest-sample trimming to
    /// `start`/`end` would keep.
    fn trim_range(&self, start: Timestamp, end: Timestamp) -> (usize, usize) {
        let delta = self.delta();
        let len = self.data.len();
        let first = if start > self.header.starttime {
            ((start.seconds_since(self.header.starttime) / delta).round() as usize).min(len)
        } else {
            0
        };
        let kept_start = self.header.starttime.offset_by(first as f64 * delta);
        let current_end = match len - first {
            0 => kept_start,
            n => kept_start.offset_by((n - 1) as f64 * delta),
        };
        let last = if end < current_end {
            let drop = (current_end.seconds_since(end) / delta).round() as usize;
            len.saturating_sub(drop).max(first)
        } else {
            len
        };
        (first, last)
    }

    /// First and last sample times after trimming to `start`/`end`, without
    /// touching the record. `None` when no sample would survive.
    pub(crate) fn trimmed_bounds(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Option<(Timestamp, Timestamp)> {
        let (first, last) = self.trim_range(start, end);
        if first >= last {
            return None;
        }
        let delta = self.delta();
        let kept_start = self.header.starttime.offset_by(first as f64 * delta);
        Some((kept_start, kept_start.offset_by((last - first - 1) as f64 * delta)))
    }

    pub(crate) fn trim(&mut self, start: Timestamp, end: Timestamp) {
        let (first, last) = self.trim_range(start, end);
        self.data.truncate(last);
        self.data.drain(..first);
        self.header.starttime = self.header.starttime.offset_by(first as f64 * self.delta());
    }

    /// Swap in a resampled series on a new time base.
    pub(crate) fn replace_samples(
        &mut self,
        data: Vec<f64>,
        starttime: Timestamp,
        sampling_rate: f64,
    ) {
        self.data = data;
        self.header.starttime = starttime;
        self.header.sampling_rate = sampling_rate;
    }
}

impl fmt::Display for StationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} - {} | {:.1} Hz, {} samples",
            self.id(),
            self.starttime(),
            self.endtime(),
            self.sampling_rate(),
            self.npts()
        )?;
        if self.has_failed() {
            write!(f, " (failed)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::ChannelMetadata;
    use crate::record::header::Coordinates;

    fn record(npts: usize, start: f64) -> StationRecord {
        let header = RecordHeader::new("TE", "STA", "--", "HNZ", Timestamp::from_seconds(start), 100.0);
        StationRecord::new((0..npts).map(|i| i as f64).collect(), header)
    }

    struct FixedInventory;

    impl InventoryLookup for FixedInventory {
        fn channel_metadata(&self, _header: &RecordHeader) -> Option<ChannelMetadata> {
            let mut metadata = ChannelMetadata::default();
            metadata.coordinates = Some(Coordinates {
                latitude: 34.0,
                longitude: -118.0,
                elevation: 10.0,
            });
            metadata.standard.insert("units".into(), "acc".into());
            metadata.standard.insert("instrument".into(), "from inventory".into());
            Some(metadata)
        }
    }

    #[test]
    fn end_time_is_derived_from_sample_count() {
        let rec = record(100, 0.0);
        assert_eq!(rec.endtime(), Timestamp::from_seconds(0.99));
        assert_eq!(record(0, 5.0).endtime(), Timestamp::from_seconds(5.0));
    }

    #[test]
    fn failure_log_is_append_only() {
        let mut rec = record(4, 0.0);
        assert_eq!(rec.status(), RecordStatus::Ok);
        rec.fail(ProcessingStep::Validate, "first");
        rec.fail(ProcessingStep::Downstream("snr".into()), "second");
        assert!(rec.has_failed());
        let reasons: Vec<_> = rec.failures().iter().map(|f| f.reason.as_str()).collect();
        assert_eq!(reasons, vec!["first", "second"]);
        assert!(matches!(rec.status(), RecordStatus::Failed(entries) if entries.len() == 2));
    }

    #[test]
    fn cache_entries_persist_until_removed() {
        let mut rec = record(4, 0.0);
        assert!(!rec.has_cached("fas_spectrum"));
        assert!(matches!(
            rec.get_cached("fas_spectrum"),
            Err(StreamError::CacheEntryNotFound(_))
        ));
        rec.set_cached("fas_spectrum", vec![1.0, 2.0]);
        rec.trim(Timestamp::from_seconds(0.01), Timestamp::from_seconds(0.02));
        assert_eq!(rec.get_cached("fas_spectrum").unwrap(), &[1.0, 2.0]);
        assert_eq!(rec.remove_cached("fas_spectrum"), Some(vec![1.0, 2.0]));
        assert!(!rec.has_cached("fas_spectrum"));
    }

    #[test]
    fn trim_snaps_to_nearest_sample() {
        let mut rec = record(100, 0.0);
        rec.trim(Timestamp::from_seconds(0.021), Timestamp::from_seconds(0.5));
        assert_eq!(rec.starttime(), Timestamp::from_seconds(0.02));
        assert_eq!(rec.endtime(), Timestamp::from_seconds(0.5));
        assert_eq!(rec.data()[0], 2.0);
        assert_eq!(rec.npts(), 49);
    }

    #[test]
    fn trimmed_bounds_leave_the_record_alone() {
        let rec = record(100, 0.0);
        let bounds =
            rec.trimmed_bounds(Timestamp::from_seconds(0.021), Timestamp::from_seconds(0.5));
        assert_eq!(
            bounds,
            Some((Timestamp::from_seconds(0.02), Timestamp::from_seconds(0.5)))
        );
        assert_eq!(rec.npts(), 100);
        assert_eq!(
            rec.trimmed_bounds(Timestamp::from_seconds(5.0), Timestamp::from_seconds(6.0)),
            None
        );
    }

    #[test]
    fn raw_trace_requires_inventory() {
        let raw = RawTrace {
            data: vec![0.0; 3],
            header: RecordHeader::new("TE", "STA", "--", "HN1", Timestamp::EPOCH, 50.0),
        };
        let err = StationRecord::from_input(TraceInput::Raw(raw), None).unwrap_err();
        assert!(matches!(err, StreamError::InvalidRecordType(id) if id == "TE.STA.--.HN1"));
    }

    #[test]
    fn inventory_fills_missing_metadata_only() {
        let mut header = RecordHeader::new("TE", "STA", "--", "HN1", Timestamp::EPOCH, 50.0);
        header.standard.insert("instrument".into(), "from header".into());
        let raw = RawTrace {
            data: vec![0.0; 3],
            header,
        };
        let rec = StationRecord::from_input(raw.into(), Some(&FixedInventory)).unwrap();
        let standard = &rec.header().standard;
        assert_eq!(standard["instrument"].as_str(), Some("from header"));
        assert_eq!(standard["units"].as_str(), Some("acc"));
        assert_eq!(rec.header().coordinates.unwrap().latitude, 34.0);
    }
}
