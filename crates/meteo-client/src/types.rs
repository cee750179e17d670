//! Domain and document types for the vigilance API.

use std::borrow::Borrow;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Code of an administrative subdivision (a French département, e.g. "75").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RegionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for RegionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Ordinal alert severity, as published in `max_color_id`.
///
/// 1 is green (no alert) and 4 is red. 0 is the level stored for a region
/// that has just been added to the watch list and never observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertLevel(pub u8);

impl AlertLevel {
    pub const UNOBSERVED: AlertLevel = AlertLevel(0);
    pub const GREEN: AlertLevel = AlertLevel(1);
    pub const YELLOW: AlertLevel = AlertLevel(2);
    pub const ORANGE: AlertLevel = AlertLevel(3);
    pub const RED: AlertLevel = AlertLevel(4);

    /// Colour word used in notifications. Only orange and red have one.
    pub fn qualifier(self) -> Option<&'static str> {
        match self {
            AlertLevel::ORANGE => Some("orange"),
            AlertLevel::RED => Some("rouge"),
            _ => None,
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bearer token used for every API read.
#[derive(Debug)]
pub struct Credential {
    token: SecretString,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }

    /// Expose the raw token for the `Authorization` header or persistence.
    pub fn bearer(&self) -> &str {
        self.token.expose_secret()
    }
}

// ============================================================================
// cartevigilance/encours
// ============================================================================

/// Alert-level map document.
#[derive(Debug, Clone, Deserialize)]
pub struct CarteDocument {
    pub product: CarteProduct,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CarteProduct {
    pub periods: Vec<CartePeriod>,
}

/// One forecast horizon ("J" for today, "J1" for tomorrow).
#[derive(Debug, Clone, Deserialize)]
pub struct CartePeriod {
    pub echeance: String,
    #[serde(default)]
    pub text_items: Option<PeriodTextItems>,
    pub timelaps: Timelaps,
}

/// Free-text national summary attached to a period.
#[derive(Debug, Clone, Deserialize)]
pub struct PeriodTextItems {
    #[serde(default)]
    pub text: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Timelaps {
    pub domain_ids: Vec<DomainLevel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DomainLevel {
    pub domain_id: RegionId,
    pub max_color_id: AlertLevel,
}

// ============================================================================
// textesvigilance/encours
// ============================================================================

/// Alert text bulletins document.
#[derive(Debug, Clone, Deserialize)]
pub struct TextDocument {
    pub product: TextProduct,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextProduct {
    pub text_bloc_items: Vec<TextBlocItem>,
}

/// A block of text. Only departmental blocks carry a domain.
#[derive(Debug, Clone, Deserialize)]
pub struct TextBlocItem {
    pub bloc_id: String,
    #[serde(default)]
    pub domain_id: Option<RegionId>,
    #[serde(default)]
    pub domain_name: Option<String>,
    #[serde(default)]
    pub bloc_items: Vec<BlocItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlocItem {
    #[serde(default)]
    pub text_items: Vec<TextItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextItem {
    #[serde(default)]
    pub term_items: Vec<TermItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TermItem {
    #[serde(default)]
    pub subdivision_text: Vec<SubdivisionText>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubdivisionText {
    pub text: Vec<String>,
}
