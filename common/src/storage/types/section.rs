use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The closed set of label categories we index. Source records use the
/// e-drug API field names; anything outside this mapping is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Efficacy,
    Dosage,
    Warnings,
    Precautions,
    Interactions,
    SideEffects,
    Storage,
}

/// Source field name -> canonical section, in source-document order.
pub const SECTION_SOURCE_FIELDS: [(&str, Section); 7] = [
    ("efcyQesitm", Section::Efficacy),
    ("useMethodQesitm", Section::Dosage),
    ("atpnWarnQesitm", Section::Warnings),
    ("atpnQesitm", Section::Precautions),
    ("intrcQesitm", Section::Interactions),
    ("seQesitm", Section::SideEffects),
    ("depositMethodQesitm", Section::Storage),
];

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Efficacy,
        Section::Dosage,
        Section::Warnings,
        Section::Precautions,
        Section::Interactions,
        Section::SideEffects,
        Section::Storage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Efficacy => "efficacy",
            Section::Dosage => "dosage",
            Section::Warnings => "warnings",
            Section::Precautions => "precautions",
            Section::Interactions => "interactions",
            Section::SideEffects => "side_effects",
            Section::Storage => "storage",
        }
    }

    /// Maps an external label field name to its section. Unknown fields map
    /// to `None` and are ignored by ingestion, never defaulted.
    pub fn from_source_field(field: &str) -> Option<Section> {
        SECTION_SOURCE_FIELDS
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, section)| *section)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("unknown section '{s}'")))
    }
}
