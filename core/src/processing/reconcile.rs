use std::collections::BTreeSet;

use crate::math::interpolate::lanczos_resample;
use crate::prelude::ReconcileConfig;
use crate::record::{ProcessingStep, ProvenanceNote, StationRecord, Timestamp};
use crate::telemetry::log::LogManager;

/// Failure reason stamped on every record when no common window exists.
pub const INCOMPATIBLE_TIME_RANGES: &str = "incompatible time ranges: no overlapping window";

/// How a group's time bases were brought into agreement.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    AlreadyConsistent,
    TrimmedSuccessfully,
    ResampledAfterTrimFailure,
    TrimInfeasible(String),
}

/// Trim-then-resample stage that forces a group onto one time base.
pub struct Reconciler {
    config: ReconcileConfig,
    logger: LogManager,
}

/// True only when every record has the same start AND the same end time.
fn time_bases_agree(records: &[StationRecord]) -> bool {
    let starts: BTreeSet<Timestamp> = records.iter().map(StationRecord::starttime).collect();
    let ends: BTreeSet<Timestamp> = records.iter().map(StationRecord::endtime).collect();
    starts.len() == 1 && ends.len() == 1
}

/// Latest start and earliest end across the group.
fn overlap_window(records: &[StationRecord]) -> Option<(Timestamp, Timestamp)> {
    let start = records.iter().map(StationRecord::starttime).max()?;
    let end = records.iter().map(StationRecord::endtime).min()?;
    Some((start, end))
}

/// Whether nearest-sample trimming to `start`/`end` still leaves every
/// record overlapping the others.
fn trim_keeps_overlap(records: &[StationRecord], start: Timestamp, end: Timestamp) -> bool {
    let bounds: Option<Vec<(Timestamp, Timestamp)>> = records
        .iter()
        .map(|record| record.trimmed_bounds(start, end))
        .collect();
    match bounds {
        Some(bounds) => {
            let latest_start = bounds.iter().map(|(first, _)| *first).max();
            let earliest_end = bounds.iter().map(|(_, last)| *last).min();
            latest_start <= earliest_end
        }
        None => false,
    }
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("reconcile"),
        }
    }

    /// Take ownership of `records` and hand back the reconciled sequence.
    pub fn reconcile(&self, mut records: Vec<StationRecord>) -> (Vec<StationRecord>, ReconcileOutcome) {
        let (newstart, newend) = match overlap_window(&records) {
            Some(window) if !time_bases_agree(&records) => window,
            _ => return (records, ReconcileOutcome::AlreadyConsistent),
        };

        if newstart >= newend || !trim_keeps_overlap(&records, newstart, newend) {
            return self.infeasible(records);
        }

        for record in records.iter_mut() {
            record.trim(newstart, newend);
            record.set_provenance(ProvenanceNote::Cut {
                new_start_time: newstart,
                new_end_time: newend,
            });
        }

        if time_bases_agree(&records) {
            self.logger.record(&format!(
                "trimmed {} records to {} - {}",
                records.len(),
                newstart,
                newend
            ));
            return (records, ReconcileOutcome::TrimmedSuccessfully);
        }

        let new_rate = records
            .iter()
            .map(StationRecord::sampling_rate)
            .fold(f64::NEG_INFINITY, f64::max);
        let new_delta = 1.0 / new_rate;
        let (newstart, newend) = match overlap_window(&records) {
            Some((start, end)) if start <= end => (start, end),
            _ => return self.infeasible(records),
        };
        let intervals = newend.seconds_since(newstart) / new_delta;
        // absorb floating-point error when the window is a whole number of intervals
        let intervals = if (intervals - intervals.round()).abs() < 1e-6 {
            intervals.round()
        } else {
            intervals.floor()
        };
        let new_npts = intervals as usize + 1;
        let window = self.config.interpolation_window;

        for record in records.iter_mut() {
            let offset = newstart.seconds_since(record.starttime());
            let resampled =
                lanczos_resample(record.data(), record.delta(), offset, new_delta, new_npts, window);
            record.replace_samples(resampled, newstart, new_rate);
            record.set_provenance(ProvenanceNote::Interpolate {
                method: "lanczos".into(),
                new_number_of_samples: new_npts,
                new_start_time: newstart,
                window_half_width: window,
            });
        }
        self.logger.record(&format!(
            "trim left time bases misaligned; resampled {} records to {} samples at {} Hz",
            records.len(),
            new_npts,
            new_rate
        ));
        (records, ReconcileOutcome::ResampledAfterTrimFailure)
    }

    fn infeasible(&self, mut records: Vec<StationRecord>) -> (Vec<StationRecord>, ReconcileOutcome) {
        for record in records.iter_mut() {
            record.fail(ProcessingStep::Reconcile, INCOMPATIBLE_TIME_RANGES);
        }
        self.logger.warn(&format!(
            "{} records have no overlapping window",
            records.len()
        ));
        (
            records,
            ReconcileOutcome::TrimInfeasible(INCOMPATIBLE_TIME_RANGES.to_string()),
        )
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcileConfig::default())
    }
}
