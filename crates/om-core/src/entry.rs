//! Recorded readings: urine output and dressing changes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed dressing tare subtracted from a weighed dressing, in grams.
pub const DRESSING_TARE_GRAMS: f64 = 36.0;

/// Location stored with every dressing change.
pub const DRESSING_LOCATION: &str = "wound";

/// A timestamped volume observation.
///
/// The allocator works over anything implementing this trait, so both
/// stored entry kinds and test fixtures can be fed to it directly.
pub trait Reading {
    /// When the reading was taken.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Volume accrued since the previous reading, in mL.
    fn amount_ml(&self) -> f64;
}

/// A stored urine output reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    /// Store-assigned identifier.
    pub id: String,
    /// Who recorded the reading.
    pub entered_by: String,
    /// Measured output in mL.
    pub amount_ml: u32,
    /// When the output was measured.
    pub timestamp: DateTime<Utc>,
}

/// A stored dressing change reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DressingEntry {
    /// Store-assigned identifier.
    pub id: String,
    /// Who recorded the reading.
    pub entered_by: String,
    /// Drainage observed on the removed dressing.
    pub drainage_types: Vec<DrainageType>,
    /// Where the dressing was applied.
    pub location: String,
    /// Dressing weight minus tare, in mL.
    pub amount_ml: u32,
    /// When the dressing was changed.
    pub timestamp: DateTime<Utc>,
}

impl DressingEntry {
    /// Returns true if urine was among the observed drainage.
    pub fn has_urine_leak(&self) -> bool {
        self.drainage_types.contains(&DrainageType::Urine)
    }
}

impl Reading for OutputEntry {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn amount_ml(&self) -> f64 {
        f64::from(self.amount_ml)
    }
}

impl Reading for DressingEntry {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn amount_ml(&self) -> f64 {
        f64::from(self.amount_ml)
    }
}

/// Insert payload for an output reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOutputEntry {
    pub entered_by: String,
    pub amount_ml: u32,
    pub timestamp: DateTime<Utc>,
}

/// Insert payload for a dressing change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDressingEntry {
    pub entered_by: String,
    pub drainage_types: Vec<DrainageType>,
    pub amount_ml: u32,
    pub timestamp: DateTime<Utc>,
}

impl NewDressingEntry {
    /// Location the entry will be stored with.
    pub const fn location(&self) -> &'static str {
        DRESSING_LOCATION
    }
}

/// Kinds of drainage recorded on a dressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DrainageType {
    SerousDrainage,
    SerosanguinousFluid,
    PurulentDrainage,
    Urine,
}

impl DrainageType {
    /// All variants in display order.
    pub const ALL: [Self; 4] = [
        Self::SerousDrainage,
        Self::SerosanguinousFluid,
        Self::PurulentDrainage,
        Self::Urine,
    ];

    /// Name as stored and displayed.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SerousDrainage => "Serous Drainage",
            Self::SerosanguinousFluid => "Serosanguinous Fluid",
            Self::PurulentDrainage => "Purulent Drainage",
            Self::Urine => "Urine",
        }
    }
}

impl fmt::Display for DrainageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DrainageType {
    type Err = UnknownDrainageType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "serous drainage" | "serous" => Ok(Self::SerousDrainage),
            "serosanguinous fluid" | "serosanguinous" => Ok(Self::SerosanguinousFluid),
            "purulent drainage" | "purulent" => Ok(Self::PurulentDrainage),
            "urine" => Ok(Self::Urine),
            _ => Err(UnknownDrainageType(s.trim().to_string())),
        }
    }
}

impl Serialize for DrainageType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DrainageType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown drainage type strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDrainageType(String);

impl fmt::Display for UnknownDrainageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown drainage type: {}", self.0)
    }
}

impl std::error::Error for UnknownDrainageType {}

/// Joins drainage types into the comma-separated form used by the stores.
pub fn join_drainage_types(types: &[DrainageType]) -> String {
    types
        .iter()
        .map(DrainageType::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Splits a stored comma-separated drainage list, ignoring blank pieces.
pub fn split_drainage_types(s: &str) -> Result<Vec<DrainageType>, UnknownDrainageType> {
    s.split(',')
        .filter(|piece| !piece.trim().is_empty())
        .map(str::parse)
        .collect()
}
