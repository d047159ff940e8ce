/// Unit abbreviation to calibration-unit string.
const UNITS: &[(&str, &str)] = &[("acc", "cm/s/s"), ("vel", "cm/s")];

pub fn calibration_units(units: &str) -> Option<&'static str> {
    UNITS
        .iter()
        .find(|(abbrev, _)| *abbrev == units)
        .map(|(_, calibration)| *calibration)
}

pub fn units_from_calibration(calibration: &str) -> Option<&'static str> {
    UNITS
        .iter()
        .find(|(_, cal)| *cal == calibration)
        .map(|(abbrev, _)| *abbrev)
}
