//! Input validation performed before anything reaches a store.

use thiserror::Error;

use crate::entry::{DRESSING_TARE_GRAMS, DrainageType};

/// Validation errors for user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Output amount was not a positive whole number.
    #[error("please enter a valid positive number for amount, got {value:?}")]
    InvalidAmount { value: String },

    /// Dressing weight was not a positive number.
    #[error("please enter a valid positive number for weight, got {value:?}")]
    InvalidWeight { value: String },

    /// Date and time did not combine into a valid instant.
    #[error("invalid date or time: {date} {time}")]
    InvalidTimestamp { date: String, time: String },

    /// Recorder is not on the configured roster.
    #[error("unknown caregiver {name:?}, expected one of: {roster}")]
    UnknownCaregiver { name: String, roster: String },

    /// Drainage type not recognized.
    #[error("unknown drainage type: {value}")]
    UnknownDrainage { value: String },
}

/// Parses an output amount in mL.
pub fn parse_amount(input: &str) -> Result<u32, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field: "amount" });
    }
    match trimmed.parse::<u32>() {
        Ok(amount) if amount > 0 => Ok(amount),
        _ => Err(ValidationError::InvalidAmount {
            value: trimmed.to_string(),
        }),
    }
}

/// Parses a weighed dressing in grams.
pub fn parse_weight(input: &str) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field: "weight" });
    }
    match trimmed.parse::<f64>() {
        Ok(weight) if weight.is_finite() && weight > 0.0 => Ok(weight),
        _ => Err(ValidationError::InvalidWeight {
            value: trimmed.to_string(),
        }),
    }
}

/// Converts a weighed dressing to absorbed volume in mL (1 g = 1 mL).
///
/// The tare is subtracted and the result floored at zero, then rounded.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn dressing_volume_ml(weight_grams: f64) -> u32 {
    let adjusted = (weight_grams - DRESSING_TARE_GRAMS).max(0.0).round();
    if adjusted.is_finite() {
        adjusted.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Validates who recorded an entry.
///
/// An empty roster accepts any non-blank name. Matching is case-insensitive and
/// returns the roster's spelling.
pub fn validate_caregiver(name: &str, roster: &[String]) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty {
            field: "entered by",
        });
    }
    if roster.is_empty() {
        return Ok(trimmed.to_string());
    }
    roster
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(trimmed))
        .cloned()
        .ok_or_else(|| ValidationError::UnknownCaregiver {
            name: trimmed.to_string(),
            roster: roster.join(", "),
        })
}

/// Parses drainage types from user input, deduplicated in canonical order.
pub fn parse_drainage_list<S: AsRef<str>>(
    values: &[S],
) -> Result<Vec<DrainageType>, ValidationError> {
    let mut types = Vec::new();
    for value in values {
        for piece in value.as_ref().split(',') {
            if piece.trim().is_empty() {
                continue;
            }
            let parsed: DrainageType =
                piece
                    .parse()
                    .map_err(|_| ValidationError::UnknownDrainage {
                        value: piece.trim().to_string(),
                    })?;
            types.push(parsed);
        }
    }
    types.sort();
    types.dedup();
    Ok(types)
}
