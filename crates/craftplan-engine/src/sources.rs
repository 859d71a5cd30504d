//! Collaborator ports and in-memory implementations.
//!
//! The planner never talks to storage or a price provider directly. It asks
//! four collaborators for data, once per request, before any resolution
//! runs:
//!
//! - [`RecipeSource`] -- professions and their recipes per game version
//! - [`VendorPriceSource`] -- fixed vendor prices in copper
//! - [`MarketPriceSource`] -- realm market quotes for a set of items
//! - [`ProducerSource`] -- alternate producers such as smelting
//!
//! [`InMemoryCatalog`] and [`StaticMarket`] back these ports with plain
//! maps for tests and for embedders that load their data up front.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

use chrono::{DateTime, Utc};
use craftplan_types::{
    CatalogError, GameVersion, ItemId, Money, PriceMode, PriceSnapshot, PriceSummary, Producer,
    Profession, ProfessionId, RealmKey, Recipe,
};
use tracing::debug;

use crate::error::SourceError;

/// Catalog of professions and recipes.
pub trait RecipeSource: Send + Sync {
    /// All professions known for `version`.
    fn professions(
        &self,
        version: GameVersion,
    ) -> impl Future<Output = Result<Vec<Profession>, SourceError>> + Send;

    /// Recipes of `profession` for `version`.
    fn recipes(
        &self,
        version: GameVersion,
        profession: ProfessionId,
    ) -> impl Future<Output = Result<Vec<Recipe>, SourceError>> + Send;
}

/// Fixed prices of items sold by vendors.
pub trait VendorPriceSource: Send + Sync {
    /// Vendor price per item for `version`.
    fn vendor_prices(
        &self,
        version: GameVersion,
    ) -> impl Future<Output = Result<BTreeMap<ItemId, Money>, SourceError>> + Send;
}

/// Realm market quotes.
pub trait MarketPriceSource: Send + Sync {
    /// Quotes for `items` on `realm`.
    ///
    /// A requested item without an entry in the snapshot has no market
    /// price; that is not an error.
    fn prices(
        &self,
        realm: &RealmKey,
        items: &[ItemId],
        mode: PriceMode,
    ) -> impl Future<Output = Result<PriceSnapshot, SourceError>> + Send;
}

/// Producers other than profession recipes.
pub trait ProducerSource: Send + Sync {
    /// Every producer for `version`. Callers keep the kinds they use.
    fn producers(
        &self,
        version: GameVersion,
    ) -> impl Future<Output = Result<Vec<Producer>, SourceError>> + Send;
}

// ---------------------------------------------------------------------------
// In-memory catalog
// ---------------------------------------------------------------------------

/// Catalog data held in memory, identical for every game version.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    professions: BTreeMap<ProfessionId, Profession>,
    recipes: Vec<Recipe>,
    producers: Vec<Producer>,
    vendor_prices: BTreeMap<ItemId, Money>,
}

impl InMemoryCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profession, replacing one with the same id.
    pub fn add_profession(&mut self, profession: Profession) {
        self.professions.insert(profession.profession_id, profession);
    }

    /// Add a recipe after checking its invariants. A recipe with the same
    /// id is replaced.
    pub fn add_recipe(&mut self, recipe: Recipe) -> Result<(), CatalogError> {
        recipe.validate()?;
        if let Some(existing) = self.recipes.iter_mut().find(|r| r.recipe_id == recipe.recipe_id) {
            debug!(recipe = %recipe.recipe_id, "replacing recipe");
            *existing = recipe;
        } else {
            self.recipes.push(recipe);
        }
        Ok(())
    }

    /// Add a producer after checking its invariants.
    pub fn add_producer(&mut self, producer: Producer) -> Result<(), CatalogError> {
        producer.validate()?;
        self.producers.retain(|p| p.producer_id != producer.producer_id);
        self.producers.push(producer);
        Ok(())
    }

    /// Set the vendor price of `item`. A negative price is kept, and the
    /// next vendor fetch reports it as malformed data.
    pub fn set_vendor_price(&mut self, item: ItemId, price: Money) {
        self.vendor_prices.insert(item, price);
    }
}

impl RecipeSource for InMemoryCatalog {
    fn professions(
        &self,
        _version: GameVersion,
    ) -> impl Future<Output = Result<Vec<Profession>, SourceError>> + Send {
        let professions = self.professions.values().cloned().collect();
        async move { Ok(professions) }
    }

    fn recipes(
        &self,
        _version: GameVersion,
        profession: ProfessionId,
    ) -> impl Future<Output = Result<Vec<Recipe>, SourceError>> + Send {
        let recipes = self
            .recipes
            .iter()
            .filter(|r| r.profession_id == profession)
            .cloned()
            .collect();
        async move { Ok(recipes) }
    }
}

impl VendorPriceSource for InMemoryCatalog {
    fn vendor_prices(
        &self,
        _version: GameVersion,
    ) -> impl Future<Output = Result<BTreeMap<ItemId, Money>, SourceError>> + Send {
        let result = match self.vendor_prices.iter().find(|(_, price)| **price < Money::ZERO) {
            Some((item, price)) => Err(SourceError::Malformed {
                source_name: String::from("in-memory catalog"),
                message: format!("vendor price {price} for item {item} is negative"),
            }),
            None => Ok(self.vendor_prices.clone()),
        };
        async move { result }
    }
}

impl ProducerSource for InMemoryCatalog {
    fn producers(
        &self,
        _version: GameVersion,
    ) -> impl Future<Output = Result<Vec<Producer>, SourceError>> + Send {
        let producers = self.producers.clone();
        async move { Ok(producers) }
    }
}

// ---------------------------------------------------------------------------
// Static market
// ---------------------------------------------------------------------------

/// A market that serves a fixed set of quotes, or always fails.
#[derive(Debug, Clone)]
pub struct StaticMarket {
    provider_name: String,
    snapshot_at: DateTime<Utc>,
    is_stale: bool,
    quotes: BTreeMap<ItemId, PriceSummary>,
    failure: Option<String>,
}

impl StaticMarket {
    /// Empty market named `provider_name`, quoted at `snapshot_at`.
    pub fn new(provider_name: &str, snapshot_at: DateTime<Utc>) -> Self {
        Self {
            provider_name: provider_name.to_owned(),
            snapshot_at,
            is_stale: false,
            quotes: BTreeMap::new(),
            failure: None,
        }
    }

    /// A market whose every fetch fails with `message`.
    pub fn failing(provider_name: &str, message: &str) -> Self {
        Self {
            failure: Some(message.to_owned()),
            ..Self::new(provider_name, DateTime::<Utc>::UNIX_EPOCH)
        }
    }

    /// Mark the served snapshots as stale.
    #[must_use]
    pub const fn stale(mut self) -> Self {
        self.is_stale = true;
        self
    }

    /// Quote `item` at a minimum buyout and optional median.
    pub fn quote(&mut self, item: ItemId, min_buyout: Money, median: Option<Money>) {
        self.quotes.insert(
            item,
            PriceSummary {
                item_id: item,
                min_buyout,
                median,
                snapshot_at: self.snapshot_at,
                source: self.provider_name.clone(),
            },
        );
    }
}

impl MarketPriceSource for StaticMarket {
    fn prices(
        &self,
        realm: &RealmKey,
        items: &[ItemId],
        _mode: PriceMode,
    ) -> impl Future<Output = Result<PriceSnapshot, SourceError>> + Send {
        let result = self.failure.as_ref().map_or_else(
            || {
                let wanted: BTreeSet<ItemId> = items.iter().copied().collect();
                let prices = self
                    .quotes
                    .iter()
                    .filter(|(item, _)| wanted.contains(item))
                    .map(|(&item, summary)| (item, summary.clone()))
                    .collect();
                Ok(PriceSnapshot {
                    realm: realm.clone(),
                    provider_name: self.provider_name.clone(),
                    snapshot_at: self.snapshot_at,
                    is_stale: self.is_stale,
                    error_message: None,
                    prices,
                })
            },
            |message| {
                Err(SourceError::Unavailable {
                    source_name: self.provider_name.clone(),
                    message: message.clone(),
                })
            },
        );
        async move { result }
    }
}
