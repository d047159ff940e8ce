use gmstream::inventory::StationInventory;
use gmstream::telemetry::MetricsSnapshot;
use serde::Serialize;

/// Per-group verdict following the batch policy: flagged groups are
/// warnings, rejected groups are hard failures; the batch continues either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Flagged,
    Rejected,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub group_id: String,
    pub verdict: Verdict,
    pub outcome: Option<String>,
    pub failures: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<StationInventory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub groups: Vec<GroupReport>,
    pub metrics: MetricsSnapshot,
}
