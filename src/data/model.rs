use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Emotion – the label registry
// ---------------------------------------------------------------------------

/// The six emotion classes of the corpus, one variant per label id.
///
/// The discriminants are the label ids stored in the source files, so the
/// name/id mapping is bijective by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Sadness = 0,
    Joy = 1,
    Love = 2,
    Anger = 3,
    Fear = 4,
    Surprise = 5,
}

impl Emotion {
    pub const COUNT: usize = 6;

    /// All emotions in ascending label-id order.
    pub const ALL: [Emotion; Self::COUNT] = [
        Emotion::Sadness,
        Emotion::Joy,
        Emotion::Love,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Surprise,
    ];

    pub fn from_label_id(id: i64) -> Option<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    pub fn label_id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Emotion::Sadness => "sadness",
            Emotion::Joy => "joy",
            Emotion::Love => "love",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Surprise => "surprise",
        }
    }

    /// Comma-separated list of valid names, for error messages.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|e| e.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name lookup ignores surrounding whitespace and ASCII case.
impl FromStr for Emotion {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                EngineError::invalid(format!(
                    "unknown emotion '{wanted}'; expected one of: {}",
                    Self::valid_names()
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// RawRecord – one row as a source delivers it
// ---------------------------------------------------------------------------

/// An unvalidated row. Null cells stay `None` so validation can report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub text: Option<String>,
    pub label: Option<i64>,
}

impl RawRecord {
    pub fn new(text: impl Into<String>, label: i64) -> Self {
        Self {
            text: Some(text.into()),
            label: Some(label),
        }
    }
}

// ---------------------------------------------------------------------------
// Record / Dataset – the validated, immutable corpus
// ---------------------------------------------------------------------------

/// A single labeled text. The emotion name and label id both derive from
/// `label`, so they cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub text: String,
    pub label: Emotion,
}

/// The ordered, fixed-length collection of records.
///
/// Only the loader (or `from_records`) constructs one, and there is no way
/// to mutate it afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset from already-validated records. Fails when empty.
    pub fn from_records(records: Vec<Record>) -> Result<Self, EngineError> {
        if records.is_empty() {
            return Err(EngineError::DataUnavailable {
                message: "dataset contains no valid records".to_string(),
            });
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a constructed dataset; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
