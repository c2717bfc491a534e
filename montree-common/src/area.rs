//! Curriculum area taxonomy
//!
//! The catalog uses the five long-form area keys. Weekly assignment rows
//! keep the short vocabulary inherited from the planning documents
//! (`math` instead of `mathematics`), so a separate synonym table
//! normalizes free-text areas before assignment storage.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// The five curriculum areas, in canonical reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    PracticalLife,
    Sensorial,
    Mathematics,
    Language,
    Cultural,
}

impl Area {
    /// Canonical reporting order: practical life first, cultural last
    pub const CANONICAL: [Area; 5] = [
        Area::PracticalLife,
        Area::Sensorial,
        Area::Mathematics,
        Area::Language,
        Area::Cultural,
    ];

    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Area::PracticalLife => "practical_life",
            Area::Sensorial => "sensorial",
            Area::Mathematics => "mathematics",
            Area::Language => "language",
            Area::Cultural => "cultural",
        }
    }

    /// Parse a catalog area key
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "practical_life" => Ok(Area::PracticalLife),
            "sensorial" => Ok(Area::Sensorial),
            "mathematics" => Ok(Area::Mathematics),
            "language" => Ok(Area::Language),
            "cultural" => Ok(Area::Cultural),
            other => Err(Error::Validation(format!(
                "invalid area '{}'; allowed: practical_life, sensorial, mathematics, language, cultural",
                other
            ))),
        }
    }

    /// Sort rank for reporting: canonical areas in order, anything
    /// unrecognized after them.
    pub fn canonical_rank(raw: &str) -> usize {
        Area::CANONICAL
            .iter()
            .position(|a| a.as_str() == raw)
            .unwrap_or(Area::CANONICAL.len())
    }
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a free-text area from an uploaded plan into the assignment
/// vocabulary.
///
/// Lowercases, trims, folds whitespace to underscores, then applies the
/// synonym table (`mathematics` → `math`, `culture` → `cultural`,
/// `english` → `language`). Unknown values pass through normalized so
/// nothing upstream is silently dropped.
pub fn normalize_assignment_area(raw: &str) -> String {
    let folded = raw
        .trim()
        .to_ascii_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    match folded.as_str() {
        "mathematics" | "maths" | "math" => "math".to_string(),
        "culture" | "cultural" => "cultural".to_string(),
        "practical_life" => "practical_life".to_string(),
        "english" | "language" => "language".to_string(),
        "sensorial" => "sensorial".to_string(),
        _ => folded,
    }
}
