pub mod header;
pub mod metadata;
pub mod provenance;
pub mod station;
pub mod time;

pub use header::{Coordinates, InstrumentSensitivity, RecordHeader, Response};
pub use metadata::{Metadata, MetadataValue};
pub use provenance::ProvenanceNote;
pub use station::{
    FailureEntry, ProcessingStep, RawTrace, RecordStatus, StationRecord, TraceInput,
};
pub use time::Timestamp;
