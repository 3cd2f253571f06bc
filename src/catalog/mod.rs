//! Curriculum catalog: ordered letter units and their training words

mod builtin;

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the unit that precedes every letter unit
pub const INITIAL_ASSESSMENT: &str = "initial assessment";

/// Errors raised while building or loading a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog has no letter units
    #[error("catalog contains no units")]
    Empty,

    /// A unit has no training words
    #[error("unit {0:?} has no words")]
    UnitWithoutWords(String),

    /// The same unit name appears twice
    #[error("unit {0:?} is defined more than once")]
    DuplicateUnit(String),

    /// Catalog file could not be read
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// Catalog file path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Catalog file is not valid catalog JSON
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        /// Catalog file path
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
}

/// One curriculum item with its own training words
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurriculumUnit {
    /// Unit name, usually an uppercase letter
    pub name: String,
    /// Training words in presentation order
    pub words: Vec<String>,
}

#[derive(Deserialize)]
struct CatalogFile {
    initial_assessment: Vec<String>,
    units: Vec<CurriculumUnit>,
}

/// Read-only curriculum: the assessment words plus letter units in order
#[derive(Debug, Clone)]
pub struct Catalog {
    assessment: Vec<String>,
    units: Vec<CurriculumUnit>,
}

impl Catalog {
    /// Built-in Russian curriculum
    pub fn builtin() -> Self {
        Self {
            assessment: builtin::ASSESSMENT_WORDS
                .iter()
                .map(|&w| w.to_owned())
                .collect(),
            units: builtin::UNITS
                .iter()
                .map(|&(name, words)| CurriculumUnit {
                    name: name.to_owned(),
                    words: words.iter().map(|&w| w.to_owned()).collect(),
                })
                .collect(),
        }
    }

    /// Builds a validated catalog
    ///
    /// Words are trimmed and lowercased so they compare against normalized
    /// submissions.
    ///
    /// # Errors
    /// Returns error if there are no units, a unit (or the assessment) has no
    /// words, or a unit name repeats
    pub fn new(assessment: Vec<String>, units: Vec<CurriculumUnit>) -> Result<Self, CatalogError> {
        if units.is_empty() {
            return Err(CatalogError::Empty);
        }

        let assessment = normalize_words(assessment);
        if assessment.is_empty() {
            return Err(CatalogError::UnitWithoutWords(INITIAL_ASSESSMENT.to_owned()));
        }

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(units.len());
        for unit in units {
            let name = unit.name.trim().to_owned();
            if name == INITIAL_ASSESSMENT || !seen.insert(name.clone()) {
                return Err(CatalogError::DuplicateUnit(name));
            }
            let words = normalize_words(unit.words);
            if words.is_empty() {
                return Err(CatalogError::UnitWithoutWords(name));
            }
            normalized.push(CurriculumUnit { name, words });
        }

        Ok(Self {
            assessment,
            units: normalized,
        })
    }

    /// Loads a catalog from a JSON file
    ///
    /// Expected shape: `{"initial_assessment": [..], "units": [{"name": "А", "words": [..]}]}`
    ///
    /// # Errors
    /// Returns error if the file can't be read, parsed or validated
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CatalogFile =
            serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::new(file.initial_assessment, file.units)?;
        tracing::info!(
            path = %path.display(),
            units = catalog.units.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Training words for a unit, `None` if the unit is not in the catalog
    pub fn words_for(&self, unit: &str) -> Option<&[String]> {
        if unit == INITIAL_ASSESSMENT {
            return Some(&self.assessment);
        }
        self.units
            .iter()
            .find(|u| u.name == unit)
            .map(|u| u.words.as_slice())
    }

    /// Unit names in curriculum order, optionally led by the assessment unit
    pub fn ordered_units(&self, with_assessment: bool) -> Vec<&str> {
        with_assessment
            .then_some(INITIAL_ASSESSMENT)
            .into_iter()
            .chain(self.units.iter().map(|u| u.name.as_str()))
            .collect()
    }

    /// Letter units that come before `unit`, nearest first
    ///
    /// The assessment unit has no predecessors.
    pub fn units_before(&self, unit: &str) -> impl Iterator<Item = &CurriculumUnit> {
        let end = self
            .units
            .iter()
            .position(|u| u.name == unit)
            .unwrap_or(0);
        self.units[..end].iter().rev()
    }

    /// Number of letter units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the catalog has no letter units
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize_words(words: Vec<String>) -> Vec<String> {
    words
        .into_iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
