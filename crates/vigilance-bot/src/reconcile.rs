//! Diffing fresh alert levels against the last observed ones.

use std::collections::BTreeMap;

use meteo_client::{AlertLevel, RegionId};
use tracing::debug;

/// Levels strictly above this are worth an escalation notice.
pub const NOTABLE_FLOOR: AlertLevel = AlertLevel::YELLOW;

/// Levels strictly below this can be announced as a downgrade.
pub const DOWNGRADE_CEILING: AlertLevel = AlertLevel::RED;

/// What changed in one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Regions that rose to a notable level, with their new level.
    pub escalations: BTreeMap<RegionId, AlertLevel>,
    /// Regions whose level went down, in region order.
    pub downgrades: Vec<RegionId>,
}

impl Reconciliation {
    /// Nothing to notify.
    pub fn is_quiet(&self) -> bool {
        self.escalations.is_empty() && self.downgrades.is_empty()
    }
}

/// Compare `current` with `stored`, then overwrite `stored` with `current`.
///
/// For each region in `current`:
/// - escalation when the level is above [`NOTABLE_FLOOR`] and above the stored one
/// - downgrade when the level is below [`DOWNGRADE_CEILING`] and below the stored one
///
/// The two checks are evaluated independently. Regions missing from `stored`
/// are no longer watched and are left out rather than re-added.
pub fn reconcile(
    current: &BTreeMap<RegionId, AlertLevel>,
    stored: &mut BTreeMap<RegionId, AlertLevel>,
) -> Reconciliation {
    let mut outcome = Reconciliation::default();

    for (region, &level) in current {
        let Some(previous) = stored.get_mut(region) else {
            debug!(region = %region, "Region no longer watched, skipping");
            continue;
        };

        if level > NOTABLE_FLOOR && level > *previous {
            outcome.escalations.insert(region.clone(), level);
        }
        if level < DOWNGRADE_CEILING && level < *previous {
            outcome.downgrades.push(region.clone());
        }

        *previous = level;
    }

    outcome
}
