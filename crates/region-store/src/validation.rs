//! Validation of operator-supplied region lists.

use std::fmt;

use meteo_client::RegionId;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A token is not made of ASCII digits.
    NotNumeric(String),
    /// No region was given.
    Empty,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NotNumeric(token) => write!(f, "region '{}' is not numeric", token),
            ValidationError::Empty => write!(f, "no region given"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Parse whitespace-separated numeric region ids.
///
/// The whole list is rejected if any token is not numeric. The result is
/// sorted and deduplicated.
pub fn parse_region_list(input: &str) -> Result<Vec<RegionId>, ValidationError> {
    let mut regions = Vec::new();

    for token in input.split_whitespace() {
        if !token.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::NotNumeric(token.to_string()));
        }
        regions.push(RegionId::from(token));
    }

    if regions.is_empty() {
        return Err(ValidationError::Empty);
    }

    regions.sort();
    regions.dedup();
    Ok(regions)
}
