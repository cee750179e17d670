//! The persisted bot state document.

use std::collections::{BTreeMap, BTreeSet};

use meteo_client::{AlertLevel, RegionId};
use serde::{Deserialize, Serialize};

/// Everything the bot keeps across restarts.
///
/// The keys of `regions` are the watch list: a region is watched exactly
/// when it has an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotState {
    /// Last issued API token. Always treated as possibly stale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Watched region -> last observed alert level.
    #[serde(default, rename = "departements")]
    pub regions: BTreeMap<RegionId, AlertLevel>,
}

impl BotState {
    /// The watched regions.
    pub fn watched(&self) -> BTreeSet<RegionId> {
        self.regions.keys().cloned().collect()
    }

    /// Start watching regions. Each one (re)starts at the unobserved level.
    pub fn watch(&mut self, regions: &[RegionId]) {
        for region in regions {
            self.regions.insert(region.clone(), AlertLevel::UNOBSERVED);
        }
    }

    /// Stop watching regions, dropping their last level.
    pub fn unwatch(&mut self, regions: &[RegionId]) {
        for region in regions {
            self.regions.remove(region);
        }
    }

    /// Watched region ids joined for display ("01, 13, 75").
    pub fn watched_display(&self) -> String {
        self.regions
            .keys()
            .map(RegionId::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
