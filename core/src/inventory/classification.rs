use crate::record::{MetadataValue, StationRecord};

/// Structure-type classification of a sensor location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureType {
    FreeField,
    Structure(&'static str),
}

impl StructureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureType::FreeField => "free_field",
            StructureType::Structure(description) => description,
        }
    }
}

struct LocationCode {
    code: &'static str,
    description: &'static str,
    free_field: bool,
}

const fn loc(code: &'static str, description: &'static str, free_field: bool) -> LocationCode {
    LocationCode {
        code,
        description,
        free_field,
    }
}

// Bureau of Reclamation dam instrumentation. Borehole free-field sensors are
// deliberately not free field.
const RE_NETWORK: &[LocationCode] = &[
    loc("10", "Free field (rock) in vicinity of crest/toe area", true),
    loc("11", "Free field (Left Abutment) either crest or toe", true),
    loc("12", "Free field (Right Abutment) either crest or toe", true),
    loc("13", "Free field (water) (Towards Left Abutment)", false),
    loc("14", "Free field (water) (Towards Right Abutment)", false),
    loc("20", "Toe (center)", false),
    loc("21", "Toe (Left Abutment)", false),
    loc("22", "Toe (Right Abutment)", false),
    loc("23", "Toe (Towards Left Abutment)", false),
    loc("24", "Toe (Towards Right Abutment)", false),
    loc("30", "Crest (center)", false),
    loc("31", "Crest (Left Abutment)", false),
    loc("32", "Crest (Right Abutment)", false),
    loc("33", "Crest (Towards Left Abutment)", false),
    loc("34", "Crest (Towards Right Abutment)", false),
    loc("40", "Foundation (center)", false),
    loc("41", "Foundation (Left Abutment)", false),
    loc("42", "Foundation (Right Abutment)", false),
    loc("43", "Foundation (Towards Left Abutment)", false),
    loc("44", "Foundation (Towards Right Abutment)", false),
    loc("50", "Body (center)", false),
    loc("51", "Body (Left Abutment)", false),
    loc("52", "Body (Right Abutment)", false),
    loc("53", "Body (Towards Left Abutment)", false),
    loc("54", "Body (Towards Right Abutment)", false),
    loc("60", "Down Hole Upper Body", false),
    loc("61", "Down Hole Mid Body", false),
    loc("62", "Down Hole Foundation", false),
    loc("63", "Down Hole Free Field", false),
];

const LOCATION_CODES: &[(&str, &[LocationCode])] = &[("RE", RE_NETWORK)];

/// Look up the structure type of a `(network, location)` pair. Unknown
/// networks and locations have no classification.
pub fn classify(network: &str, location: &str) -> Option<StructureType> {
    let (_, codes) = LOCATION_CODES.iter().find(|(net, _)| *net == network)?;
    codes.iter().find(|entry| entry.code == location).map(|entry| {
        if entry.free_field {
            StructureType::FreeField
        } else {
            StructureType::Structure(entry.description)
        }
    })
}

/// Stamp `structure_type` on the record's standard metadata when its location
/// is classified. Returns whether anything was stamped.
pub fn stamp_structure_type(record: &mut StationRecord) -> bool {
    let header = record.header();
    match classify(&header.network, &header.location) {
        Some(kind) => {
            record.header_mut().standard.insert(
                "structure_type".into(),
                MetadataValue::from(kind.as_str()),
            );
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordHeader, Timestamp};

    #[test]
    fn free_field_codes_are_flagged() {
        assert_eq!(classify("RE", "11"), Some(StructureType::FreeField));
        assert_eq!(
            classify("RE", "63"),
            Some(StructureType::Structure("Down Hole Free Field"))
        );
        assert_eq!(classify("RE", "99"), None);
        assert_eq!(classify("CI", "10"), None);
    }

    #[test]
    fn stamping_writes_standard_field() {
        let header = RecordHeader::new("RE", "DAM", "30", "HNZ", Timestamp::EPOCH, 200.0);
        let mut record = StationRecord::new(vec![0.0], header);
        assert!(stamp_structure_type(&mut record));
        assert_eq!(
            record.header().standard["structure_type"].as_str(),
            Some("Crest (center)")
        );

        let header = RecordHeader::new("CI", "PAS", "10", "HNZ", Timestamp::EPOCH, 200.0);
        let mut record = StationRecord::new(vec![0.0], header);
        assert!(!stamp_structure_type(&mut record));
        assert!(record.header().standard.get("structure_type").is_none());
    }
}
