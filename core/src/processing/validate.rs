use std::collections::{BTreeSet, HashSet};

use crate::prelude::{ConsistencyCheck, StreamError, StreamResult};
use crate::record::{ProcessingStep, StationRecord, Timestamp};
use crate::telemetry::log::LogManager;

pub struct SamplingRateCheck;

impl ConsistencyCheck for SamplingRateCheck {
    fn name(&self) -> &'static str {
        "sampling_rate"
    }

    fn inspect(&self, records: &[StationRecord]) -> Option<String> {
        let rates: BTreeSet<u64> = records.iter().map(|r| r.sampling_rate().to_bits()).collect();
        (rates.len() > 1).then(|| "inconsistent sampling rates".to_string())
    }
}

pub struct SampleCountCheck;

impl ConsistencyCheck for SampleCountCheck {
    fn name(&self) -> &'static str {
        "npts"
    }

    fn inspect(&self, records: &[StationRecord]) -> Option<String> {
        let counts: BTreeSet<usize> = records.iter().map(StationRecord::npts).collect();
        (counts.len() > 1).then(|| "inconsistent sample counts".to_string())
    }
}

pub struct StartTimeCheck;

impl ConsistencyCheck for StartTimeCheck {
    fn name(&self) -> &'static str {
        "starttime"
    }

    fn inspect(&self, records: &[StationRecord]) -> Option<String> {
        let starts: BTreeSet<Timestamp> = records.iter().map(StationRecord::starttime).collect();
        (starts.len() > 1).then(|| "inconsistent start times".to_string())
    }
}

pub struct UniqueChannelCheck;

impl ConsistencyCheck for UniqueChannelCheck {
    fn name(&self) -> &'static str {
        "unique_channels"
    }

    fn inspect(&self, records: &[StationRecord]) -> Option<String> {
        let codes: HashSet<String> = records.iter().map(|r| r.header().channel_code()).collect();
        (codes.len() != records.len()).then(|| "duplicate channel code".to_string())
    }
}

/// Derive the group identifier from the first record and require every
/// other record to agree. Returns `None` for an empty group.
pub fn check_identity(records: &[StationRecord]) -> StreamResult<Option<String>> {
    let Some(first) = records.first() else {
        return Ok(None);
    };
    let expected = first.header().group_id();
    for record in &records[1..] {
        let found = record.header().group_id();
        if found != expected {
            return Err(StreamError::InconsistentStreamIdentity { expected, found });
        }
    }
    Ok(Some(expected))
}

/// Fixed battery of group invariant checks.
pub struct Validator {
    checks: Vec<Box<dyn ConsistencyCheck + Send + Sync>>,
    logger: LogManager,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            checks: vec![
                Box::new(UniqueChannelCheck),
                Box::new(SamplingRateCheck),
                Box::new(SampleCountCheck),
                Box::new(StartTimeCheck),
            ],
            logger: LogManager::new("validate"),
        }
    }

    /// Run the identity precondition, then every flagging check.
    ///
    /// Only an identity mismatch is raised. Other failures are appended to
    /// each member's failure log and later checks still run.
    pub fn validate(&self, records: &mut [StationRecord]) -> StreamResult<Option<String>> {
        let id = check_identity(records)?;
        for check in &self.checks {
            if let Some(reason) = check.inspect(records) {
                self.logger.warn(&format!(
                    "{} check failed for {}: {}",
                    check.name(),
                    id.as_deref().unwrap_or("<empty>"),
                    reason
                ));
                for record in records.iter_mut() {
                    record.fail(ProcessingStep::Validate, reason.clone());
                }
            }
        }
        Ok(id)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
