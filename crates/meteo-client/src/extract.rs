//! Pure extraction of alert data from upstream documents.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::ApiError;
use crate::types::{AlertLevel, CarteDocument, RegionId, TextDocument};

/// Block kind of a departmental bulletin.
pub const DEPARTMENTAL_BULLETIN: &str = "BULLETIN_DEPARTEMENTAL";

/// Horizon tag of today's period.
pub const TODAY: &str = "J";

/// A departmental bulletin ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletinText {
    /// Short display name of the département.
    pub name: String,
    /// All text fragments of one subdivision, joined by spaces.
    pub text: String,
}

/// Maximum alert level of every watched region.
///
/// Periods are walked in document order and the first level seen for a
/// region wins; later periods never overwrite it.
pub fn extract_levels(
    doc: &CarteDocument,
    watched: &BTreeSet<RegionId>,
) -> BTreeMap<RegionId, AlertLevel> {
    let mut levels = BTreeMap::new();

    for period in &doc.product.periods {
        for domain in &period.timelaps.domain_ids {
            if watched.contains(&domain.domain_id) {
                levels
                    .entry(domain.domain_id.clone())
                    .or_insert(domain.max_color_id);
            }
        }
    }

    levels
}

/// Departmental bulletin texts for the target regions.
///
/// Produces one entry per subdivision text of every matching block.
pub fn extract_bulletin_texts(
    doc: &TextDocument,
    targets: &BTreeSet<RegionId>,
) -> Result<Vec<BulletinText>, ApiError> {
    let mut texts = Vec::new();

    for item in &doc.product.text_bloc_items {
        if item.bloc_id != DEPARTMENTAL_BULLETIN {
            continue;
        }
        let domain_id = item.domain_id.as_ref().ok_or_else(|| {
            ApiError::Malformed("departmental bulletin without domain_id".to_string())
        })?;
        if !targets.contains(domain_id) {
            continue;
        }
        let domain_name = item.domain_name.as_deref().ok_or_else(|| {
            ApiError::Malformed(format!("bulletin for {} without domain_name", domain_id))
        })?;
        let name = short_name(domain_name);

        for bloc in &item.bloc_items {
            for text_item in &bloc.text_items {
                for term in &text_item.term_items {
                    for subdivision in &term.subdivision_text {
                        texts.push(BulletinText {
                            name: name.to_string(),
                            text: subdivision.text.join(" "),
                        });
                    }
                }
            }
        }
    }

    Ok(texts)
}

/// National summary texts of today's period.
pub fn extract_period_summaries(doc: &CarteDocument) -> Vec<String> {
    doc.product
        .periods
        .iter()
        .filter(|period| period.echeance == TODAY)
        .filter_map(|period| period.text_items.as_ref())
        .flat_map(|items| items.text.iter().cloned())
        .collect()
}

/// Second space-separated word of the full name, or the full name.
fn short_name(domain_name: &str) -> &str {
    domain_name.split(' ').nth(1).unwrap_or(domain_name)
}
