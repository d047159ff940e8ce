//! Reconciliation and validation core for multi-channel ground-motion records.
//!
//! Records from one instrument flow through three stages: the reconciler
//! brings their time bases into agreement (trim first, resample if trimming is
//! not enough), the validator flags any remaining inconsistency on every
//! member, and the group exports station/channel metadata for archival.

pub mod inventory;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod record;
pub mod telemetry;

pub use prelude::{ReconcileConfig, StreamError, StreamResult};
pub use processing::{ChannelGroup, ReconcileOutcome};
pub use record::{RawTrace, RecordHeader, StationRecord, Timestamp, TraceInput};
