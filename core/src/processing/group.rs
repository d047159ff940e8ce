use log::debug;
use ndarray::Array2;
use serde::Serialize;
use std::fmt;

use super::export::export_metadata;
use super::reconcile::{ReconcileOutcome, Reconciler};
use super::validate::Validator;
use crate::inventory::{InventoryLookup, StationInventory};
use crate::prelude::{ReconcileConfig, StreamError, StreamResult};
use crate::record::{ProvenanceNote, StationRecord, TraceInput};

/// Provenance notes of one member, as exposed to downstream consumers.
#[derive(Debug, Clone, Serialize)]
pub struct ProvenanceDocument {
    pub record_id: String,
    pub notes: Vec<ProvenanceNote>,
}

/// A reconciled and validated set of records from one instrument.
#[derive(Debug)]
pub struct ChannelGroup {
    records: Vec<StationRecord>,
    id: Option<String>,
    outcome: ReconcileOutcome,
    parameters: Vec<(String, serde_json::Value)>,
}

impl ChannelGroup {
    /// Build a group with the default reconciliation settings.
    pub fn new(
        inputs: Vec<TraceInput>,
        inventory: Option<&dyn InventoryLookup>,
    ) -> StreamResult<Self> {
        Self::with_config(inputs, inventory, &ReconcileConfig::default())
    }

    /// Coerce inputs into station records, reconcile their time bases, then
    /// validate. Fails on an invalid record type or inconsistent identity.
    pub fn with_config(
        inputs: Vec<TraceInput>,
        inventory: Option<&dyn InventoryLookup>,
        config: &ReconcileConfig,
    ) -> StreamResult<Self> {
        let records = inputs
            .into_iter()
            .map(|input| StationRecord::from_input(input, inventory))
            .collect::<StreamResult<Vec<_>>>()?;

        let (mut records, outcome) = Reconciler::new(config.clone()).reconcile(records);
        let id = Validator::new().validate(&mut records)?;
        debug!("built group {:?} ({:?})", id, outcome);

        Ok(Self {
            records,
            id,
            outcome,
            parameters: Vec::new(),
        })
    }

    pub fn from_records(records: Vec<StationRecord>) -> StreamResult<Self> {
        Self::new(records.into_iter().map(TraceInput::Station).collect(), None)
    }

    /// `network.station.instrument`
    pub fn id(&self) -> StreamResult<&str> {
        self.id.as_deref().ok_or(StreamError::NoIdentity)
    }

    /// `network.station`
    pub fn network_station(&self) -> StreamResult<String> {
        let id = self.id()?;
        Ok(id.split('.').take(2).collect::<Vec<_>>().join("."))
    }

    /// Two-character instrument code.
    pub fn instrument(&self) -> StreamResult<&str> {
        self.id()?.split('.').nth(2).ok_or(StreamError::NoIdentity)
    }

    /// True when no member has a failure-log entry.
    pub fn passed(&self) -> bool {
        self.records.iter().all(|record| !record.has_failed())
    }

    pub fn outcome(&self) -> &ReconcileOutcome {
        &self.outcome
    }

    pub fn records(&self) -> &[StationRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StationRecord> {
        self.records.iter()
    }

    /// Members stay mutable for failure logging and derived-value caching.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, StationRecord> {
        self.records.iter_mut()
    }

    pub fn into_records(self) -> Vec<StationRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct failure reasons across all members, in first-seen order.
    pub fn failure_reasons(&self) -> Vec<String> {
        let mut reasons: Vec<String> = Vec::new();
        for entry in self.records.iter().flat_map(StationRecord::failures) {
            if !reasons.contains(&entry.reason) {
                reasons.push(entry.reason.clone());
            }
        }
        reasons
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: serde_json::Value) {
        let key = key.into();
        match self.parameters.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.parameters.push((key, value)),
        }
    }

    pub fn get_param(&self, key: &str) -> StreamResult<&serde_json::Value> {
        self.parameters
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
            .ok_or_else(|| StreamError::ParamNotFound(key.to_string()))
    }

    /// Parameter keys in insertion order.
    pub fn param_keys(&self) -> Vec<&str> {
        self.parameters.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn provenance_documents(&self) -> Vec<ProvenanceDocument> {
        self.records
            .iter()
            .map(|record| ProvenanceDocument {
                record_id: record.id(),
                notes: record.provenance().to_vec(),
            })
            .collect()
    }

    /// Samples as a components x samples matrix. Only passing groups are
    /// guaranteed to share a time base.
    pub fn to_matrix(&self) -> StreamResult<Array2<f64>> {
        if !self.passed() {
            return Err(StreamError::InvalidInput(format!(
                "group {} did not pass validation",
                self.id.as_deref().unwrap_or("<empty>")
            )));
        }
        let npts = self.records.first().map(StationRecord::npts).unwrap_or(0);
        let flat: Vec<f64> = self
            .records
            .iter()
            .flat_map(|record| record.data().iter().copied())
            .collect();
        Array2::from_shape_vec((self.records.len(), npts), flat)
            .map_err(|err| StreamError::InvalidInput(err.to_string()))
    }

    /// Exportable station/channel metadata for the group. Construction already
    /// rejects mixed identities; this is the network guard for members that
    /// were grouped without going through `with_config`.
    pub fn export_metadata(&self) -> StreamResult<StationInventory> {
        export_metadata(&self.records)
    }
}

impl fmt::Display for ChannelGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.passed() { "passed" } else { "failed" };
        write!(
            f,
            "{} StationRecord(s) in ChannelGroup ({}):",
            self.records.len(),
            verdict
        )?;
        for record in &self.records {
            write!(f, "\n{}", record)?;
        }
        Ok(())
    }
}
