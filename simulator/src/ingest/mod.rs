pub mod reader;

use gmstream::record::StationRecord;
use std::collections::BTreeMap;

/// Group records by `network.station.instrument`, keeping file order within
/// each group.
pub fn group_records(records: Vec<StationRecord>) -> Vec<(String, Vec<StationRecord>)> {
    let mut groups: BTreeMap<String, Vec<StationRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.header().group_id())
            .or_default()
            .push(record);
    }
    groups.into_iter().collect()
}
