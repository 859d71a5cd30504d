//! Realm identity and market price quotes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{GameVersion, PriceMode, Region};
use crate::ids::ItemId;
use crate::money::Money;

/// Identifies one auction house: region, game version and realm.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RealmKey {
    /// Hosting region.
    pub region: Region,
    /// Game client flavour.
    pub game_version: GameVersion,
    /// Realm slug, trimmed and lowercase.
    pub realm_slug: String,
}

impl RealmKey {
    /// Build a key, normalizing the slug to trimmed lowercase.
    pub fn new(region: Region, game_version: GameVersion, realm_slug: &str) -> Self {
        Self {
            region,
            game_version,
            realm_slug: realm_slug.trim().to_lowercase(),
        }
    }
}

impl core::fmt::Display for RealmKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.region.slug(),
            self.game_version.slug(),
            self.realm_slug
        )
    }
}

/// Market quote for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PriceSummary {
    /// Quoted item.
    pub item_id: ItemId,
    /// Lowest buyout per unit.
    pub min_buyout: Money,
    /// Median buyout per unit, when the provider reports one.
    #[serde(default)]
    pub median: Option<Money>,
    /// When the provider observed the price.
    pub snapshot_at: DateTime<Utc>,
    /// Provider name.
    pub source: String,
}

impl PriceSummary {
    /// Unit price under `mode`. Median falls back to the minimum buyout.
    pub fn unit_price(&self, mode: PriceMode) -> Money {
        match mode {
            PriceMode::Min => self.min_buyout,
            PriceMode::Median => self.median.unwrap_or(self.min_buyout),
        }
    }
}

/// A batch of market quotes fetched for one planning request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PriceSnapshot {
    /// Realm the quotes belong to.
    pub realm: RealmKey,
    /// Provider that served the quotes.
    pub provider_name: String,
    /// When the snapshot was taken.
    pub snapshot_at: DateTime<Utc>,
    /// Whether the data is older than the provider's freshness window.
    pub is_stale: bool,
    /// Provider error, when the fetch failed or was partial.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Quotes by item. Items without an entry have no market price.
    pub prices: BTreeMap<ItemId, PriceSummary>,
}

impl PriceSnapshot {
    /// An empty, stale snapshot used when no quotes were fetched.
    pub fn unavailable(
        realm: RealmKey,
        at: DateTime<Utc>,
        error_message: Option<String>,
    ) -> Self {
        Self {
            realm,
            provider_name: String::from("n/a"),
            snapshot_at: at,
            is_stale: true,
            error_message,
            prices: BTreeMap::new(),
        }
    }

    /// Quote for `item`, if any.
    pub fn get(&self, item: ItemId) -> Option<&PriceSummary> {
        self.prices.get(&item)
    }
}
