//! Station/channel metadata: the lookup capability consumed when building
//! records, the static lookup tables, and the exportable inventory document.

pub mod classification;
pub mod document;
pub mod units;

use crate::record::{Coordinates, Metadata, RecordHeader, Response};

pub use classification::{classify, StructureType};
pub use document::{Channel, Equipment, Network, Station, StationInventory};

/// Metadata an inventory knows about one channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelMetadata {
    pub coordinates: Option<Coordinates>,
    pub standard: Metadata,
    pub format_specific: Option<Metadata>,
    pub response: Option<Response>,
}

/// Resolves per-channel response and sensor metadata by network and station.
pub trait InventoryLookup {
    fn channel_metadata(&self, header: &RecordHeader) -> Option<ChannelMetadata>;
}
