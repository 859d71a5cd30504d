//! Unit cost resolution.
//!
//! [`UnitCostResolver`] answers "what is the cheapest way to obtain one unit
//! of this item at this skill ceiling?" Resolution order:
//!
//! 1. Vendor price, always, when one exists.
//! 2. Craft, when craft intermediates are enabled and at least one eligible
//!    recipe produces the item. The cheapest recipe whose reagent chain
//!    resolves wins. If every eligible recipe fails the item is *blocked*:
//!    it is reported missing with no market fallback.
//! 3. Otherwise the cheaper of the market quote and the best smelt
//!    producer. The market wins a tie.
//! 4. Otherwise the item is missing.
//!
//! Results are memoized per `(item, ceiling)` for the life of the resolver,
//! which is one planning pass. A DFS gray set guards against recipes that
//! reference each other: re-entering an item on the active path counts as
//! missing for that branch, and no result computed beneath such a cycle
//! break is memoized.

use std::collections::{BTreeMap, BTreeSet};

use craftplan_types::{
    ItemId, Money, PlanRequest, PriceMode, PriceSnapshot, Producer, ProfessionId, Reagent, Recipe,
};
use rust_decimal::Decimal;
use tracing::trace;

use crate::index::ProducerIndex;

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

/// Read-only view of vendor prices and market quotes for one request.
#[derive(Debug, Clone, Copy)]
pub struct PriceBook<'a> {
    vendor: &'a BTreeMap<ItemId, Money>,
    market: &'a PriceSnapshot,
    mode: PriceMode,
}

impl<'a> PriceBook<'a> {
    /// Combine vendor prices and a market snapshot under `mode`.
    pub const fn new(
        vendor: &'a BTreeMap<ItemId, Money>,
        market: &'a PriceSnapshot,
        mode: PriceMode,
    ) -> Self {
        Self {
            vendor,
            market,
            mode,
        }
    }

    /// Fixed vendor price of `item`.
    pub fn vendor(&self, item: ItemId) -> Option<Money> {
        self.vendor.get(&item).copied()
    }

    /// Market unit price of `item` under the request's price mode.
    pub fn market(&self, item: ItemId) -> Option<Money> {
        self.market.get(item).map(|q| q.unit_price(self.mode))
    }

    /// Unit price for a shopping line: vendor, else market, else zero.
    pub fn purchase_price(&self, item: ItemId) -> Money {
        self.vendor(item)
            .or_else(|| self.market(item))
            .unwrap_or(Money::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Request flags that shape sourcing decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcingRules {
    /// Profession being leveled.
    pub profession_id: ProfessionId,
    /// Whether recipes may produce intermediate reagents.
    pub use_craft_intermediates: bool,
    /// Whether recipes of other professions count as producers.
    pub allow_cross_profession: bool,
    /// Whether smelt producers compete with market prices.
    pub use_smelt_intermediates: bool,
}

impl SourcingRules {
    /// Rules taken from a planning request.
    pub const fn from_request(request: &PlanRequest) -> Self {
        Self {
            profession_id: request.profession_id,
            use_craft_intermediates: request.use_craft_intermediates,
            allow_cross_profession: request.allow_cross_profession_intermediates,
            use_smelt_intermediates: request.use_smelt_intermediates,
        }
    }

    /// Whether `recipe` may be used as an intermediate producer at `ceiling`.
    pub fn craft_eligible(&self, recipe: &Recipe, ceiling: u16) -> bool {
        recipe.min_skill <= ceiling
            && (self.allow_cross_profession || recipe.profession_id == self.profession_id)
    }
}

// ---------------------------------------------------------------------------
// Sourcing
// ---------------------------------------------------------------------------

/// The cheapest acquisition path chosen for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sourcing<'a> {
    /// Bought from a vendor.
    Vendor(Money),
    /// Bought on the auction house.
    Market(Money),
    /// Crafted with a recipe.
    Craft {
        /// Recipe used.
        recipe: &'a Recipe,
        /// Units created per craft.
        output_quantity: u32,
        /// Cost per created unit.
        unit_cost: Money,
    },
    /// Produced by a smelter.
    Smelt {
        /// Producer used.
        producer: &'a Producer,
        /// Units created per run.
        output_quantity: u32,
        /// Cost per created unit.
        unit_cost: Money,
    },
}

impl Sourcing<'_> {
    /// Cost of one unit through this path.
    pub const fn unit_cost(&self) -> Money {
        match *self {
            Self::Vendor(cost) | Self::Market(cost) => cost,
            Self::Craft { unit_cost, .. } | Self::Smelt { unit_cost, .. } => unit_cost,
        }
    }
}

#[derive(Debug, Clone)]
enum Resolution<'a> {
    Found(Sourcing<'a>),
    Missing(BTreeSet<ItemId>),
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Memoizing, cycle-safe unit cost resolver for one planning pass.
#[derive(Debug)]
pub struct UnitCostResolver<'a> {
    index: &'a ProducerIndex<'a>,
    prices: PriceBook<'a>,
    rules: SourcingRules,
    memo: BTreeMap<(ItemId, u16), Resolution<'a>>,
    visiting: BTreeSet<ItemId>,
    cycle_breaks: u64,
}

impl<'a> UnitCostResolver<'a> {
    /// Create a resolver with an empty memo table.
    pub const fn new(
        index: &'a ProducerIndex<'a>,
        prices: PriceBook<'a>,
        rules: SourcingRules,
    ) -> Self {
        Self {
            index,
            prices,
            rules,
            memo: BTreeMap::new(),
            visiting: BTreeSet::new(),
            cycle_breaks: 0,
        }
    }

    /// Cheapest per-unit cost of `item` at `ceiling`.
    ///
    /// On failure every item that blocked resolution, including `item`
    /// itself, is added to `missing`.
    pub fn unit_cost(
        &mut self,
        item: ItemId,
        ceiling: u16,
        missing: &mut BTreeSet<ItemId>,
    ) -> Option<Money> {
        self.sourcing(item, ceiling, missing).map(|s| s.unit_cost())
    }

    /// Cost of one craft consuming `reagents` at `ceiling`.
    ///
    /// Every reagent is resolved even after one fails, so `missing` collects
    /// all blockers of the recipe rather than just the first.
    pub fn craft_cost(
        &mut self,
        reagents: &[Reagent],
        ceiling: u16,
        missing: &mut BTreeSet<ItemId>,
    ) -> Option<Money> {
        let mut total = Some(Money::ZERO);
        for reagent in reagents {
            let line = self
                .unit_cost(reagent.item_id, ceiling, missing)
                .map(|unit| unit.mul_count(reagent.quantity));
            total = match (total, line) {
                (Some(sum), Some(cost)) => Some(sum + cost),
                _ => None,
            };
        }
        total
    }

    /// Cheapest acquisition path for `item` at `ceiling`.
    pub fn sourcing(
        &mut self,
        item: ItemId,
        ceiling: u16,
        missing: &mut BTreeSet<ItemId>,
    ) -> Option<Sourcing<'a>> {
        let key = (item, ceiling);
        match self.memo.get(&key) {
            Some(Resolution::Found(found)) => return Some(*found),
            Some(Resolution::Missing(items)) => {
                missing.extend(items.iter().copied());
                return None;
            }
            None => {}
        }

        if let Some(price) = self.prices.vendor(item) {
            let found = Sourcing::Vendor(price);
            self.memo.insert(key, Resolution::Found(found));
            return Some(found);
        }

        if !self.visiting.insert(item) {
            self.cycle_breaks = self.cycle_breaks.saturating_add(1);
            trace!(item = %item, ceiling, "cycle break");
            missing.insert(item);
            return None;
        }

        let breaks_before = self.cycle_breaks;
        let mut blockers = BTreeSet::new();
        let resolved = self.resolve_uncached(item, ceiling, &mut blockers);
        self.visiting.remove(&item);
        // A result that depended on the active path is only valid for it.
        let cacheable = self.cycle_breaks == breaks_before;

        if let Some(found) = resolved {
            if cacheable {
                self.memo.insert(key, Resolution::Found(found));
            }
            return Some(found);
        }

        blockers.insert(item);
        missing.extend(blockers.iter().copied());
        if cacheable {
            self.memo.insert(key, Resolution::Missing(blockers));
        }
        None
    }

    fn resolve_uncached(
        &mut self,
        item: ItemId,
        ceiling: u16,
        missing: &mut BTreeSet<ItemId>,
    ) -> Option<Sourcing<'a>> {
        if self.rules.use_craft_intermediates {
            let mut any_eligible = false;
            let mut best: Option<Sourcing<'a>> = None;

            for &recipe in self.index.craft_producers(item) {
                if !self.rules.craft_eligible(recipe, ceiling) {
                    continue;
                }
                let Some(output_quantity) = recipe.output_quantity_of(item) else {
                    continue;
                };
                any_eligible = true;

                let Some(unit_cost) = self
                    .craft_cost(&recipe.reagents, ceiling, missing)
                    .and_then(|cost| cost.div_decimal(Decimal::from(output_quantity)))
                else {
                    continue;
                };
                if best.is_none_or(|b| unit_cost < b.unit_cost()) {
                    best = Some(Sourcing::Craft {
                        recipe,
                        output_quantity,
                        unit_cost,
                    });
                }
            }

            if any_eligible {
                return best;
            }
        }

        let market = self.prices.market(item).map(Sourcing::Market);
        let smelt = if self.rules.use_smelt_intermediates {
            self.best_smelt(item, ceiling, missing)
        } else {
            None
        };

        match (market, smelt) {
            (Some(m), Some(s)) if s.unit_cost() < m.unit_cost() => Some(s),
            (Some(m), _) => Some(m),
            (None, s) => s,
        }
    }

    fn best_smelt(
        &mut self,
        item: ItemId,
        ceiling: u16,
        missing: &mut BTreeSet<ItemId>,
    ) -> Option<Sourcing<'a>> {
        let mut best: Option<Sourcing<'a>> = None;
        for &producer in self.index.smelt_producers(item) {
            if !producer.usable_at(ceiling) {
                continue;
            }
            let output_quantity = producer.output.quantity;
            let Some(unit_cost) = self
                .craft_cost(&producer.reagents, ceiling, missing)
                .and_then(|cost| cost.div_decimal(Decimal::from(output_quantity)))
            else {
                continue;
            };
            if best.is_none_or(|b| unit_cost < b.unit_cost()) {
                best = Some(Sourcing::Smelt {
                    producer,
                    output_quantity,
                    unit_cost,
                });
            }
        }
        best
    }
}
