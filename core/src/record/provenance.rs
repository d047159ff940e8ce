use serde::{Deserialize, Serialize};

use super::time::Timestamp;

/// Audit-trail entry describing a transformation applied to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum ProvenanceNote {
    Cut {
        new_start_time: Timestamp,
        new_end_time: Timestamp,
    },
    Interpolate {
        method: String,
        new_number_of_samples: usize,
        new_start_time: Timestamp,
        window_half_width: usize,
    },
}

impl ProvenanceNote {
    pub fn operation(&self) -> &'static str {
        match self {
            ProvenanceNote::Cut { .. } => "cut",
            ProvenanceNote::Interpolate { .. } => "interpolate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_carry_operation_tag() {
        let note = ProvenanceNote::Interpolate {
            method: "lanczos".into(),
            new_number_of_samples: 10,
            new_start_time: Timestamp::EPOCH,
            window_half_width: 20,
        };
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["operation"], "interpolate");
        assert_eq!(value["method"], "lanczos");
        assert_eq!(note.operation(), "interpolate");
    }
}
