//! Servant grades and their display names.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Rank class of a servant. Declaration order is the reporting order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "Of")]
    Officers,
    #[serde(rename = "Höh Uof")]
    SeniorNcos,
    #[serde(rename = "Uof")]
    Ncos,
    #[serde(rename = "Mannschaft")]
    Enlisted,
}

impl Grade {
    pub const ALL: [Grade; 4] = [
        Grade::Officers,
        Grade::SeniorNcos,
        Grade::Ncos,
        Grade::Enlisted,
    ];

    /// Display name as used in spreadsheets and reports.
    pub fn description(self) -> &'static str {
        match self {
            Grade::Officers => "Of",
            Grade::SeniorNcos => "Höh Uof",
            Grade::Ncos => "Uof",
            Grade::Enlisted => "Mannschaft",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_description(text: &str) -> Option<Grade> {
        let wanted = text.trim().to_lowercase();
        Grade::ALL
            .into_iter()
            .find(|g| g.description().to_lowercase() == wanted)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_table_matches_descriptions() {
        let names: Vec<_> = Grade::ALL.iter().map(|g| g.to_string()).collect();
        assert_eq!(names, ["Of", "Höh Uof", "Uof", "Mannschaft"]);
    }

    #[test]
    fn lookup_ignores_case_and_padding() {
        assert_eq!(Grade::from_description("HÖH UOF"), Some(Grade::SeniorNcos));
        assert_eq!(Grade::from_description(" mannschaft "), Some(Grade::Enlisted));
        assert_eq!(Grade::from_description("General"), None);
    }

    #[test]
    fn serializes_as_display_name() {
        let json = serde_json::to_string(&Grade::SeniorNcos).unwrap();
        assert_eq!(json, "\"Höh Uof\"");
        let back: Grade = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Grade::SeniorNcos);
    }
}
