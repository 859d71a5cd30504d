//! Shopping expansion and intermediate tracking.
//!
//! Walks reagents down the sourcing tree chosen by the resolver. Purchased
//! items accumulate as leaves; crafted and smelted items accumulate in the
//! intermediate ledger, keyed by `(item, kind, producer name)`, and are then
//! expanded into their own reagents. Owned intermediate output is netted as
//! soon as an intermediate is reached, so only the uncovered crafts pull in
//! materials.

use std::collections::{BTreeMap, BTreeSet};

use craftplan_types::{IntermediateLine, ItemId, ProducerKind, Recipe};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::owned::OwnedStock;
use crate::resolver::{Sourcing, UnitCostResolver};

/// Accumulated crafts of one intermediate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateTally<'a> {
    /// Units produced.
    pub quantity: Decimal,
    /// Craft attempts (or smelt runs) performed.
    pub crafts: Decimal,
    /// Recipe used, for craft intermediates.
    pub recipe: Option<&'a Recipe>,
}

/// Leaf purchases and intermediate production for one planning pass.
#[derive(Debug, Clone, Default)]
pub struct ShoppingLedger<'a> {
    leaves: BTreeMap<ItemId, Decimal>,
    intermediates: BTreeMap<(ItemId, ProducerKind, String), IntermediateTally<'a>>,
}

impl<'a> ShoppingLedger<'a> {
    /// Empty ledger.
    pub const fn new() -> Self {
        Self {
            leaves: BTreeMap::new(),
            intermediates: BTreeMap::new(),
        }
    }

    /// Leaf quantities to buy, by item id.
    pub const fn leaves(&self) -> &BTreeMap<ItemId, Decimal> {
        &self.leaves
    }

    /// Intermediate tallies, keyed by item, kind and producer name.
    pub fn intermediates(
        &self,
    ) -> impl Iterator<Item = (&(ItemId, ProducerKind, String), &IntermediateTally<'a>)> {
        self.intermediates.iter()
    }

    /// Intermediate production as result lines, zero quantities dropped.
    pub fn intermediate_lines(&self) -> Vec<IntermediateLine> {
        self.intermediates
            .iter()
            .filter(|(_, tally)| tally.quantity > Decimal::ZERO)
            .map(|((item_id, kind, name), tally)| IntermediateLine {
                item_id: *item_id,
                quantity: tally.quantity.normalize(),
                kind: *kind,
                producer_name: name.clone(),
            })
            .collect()
    }

    /// Add `quantity` units of `item`, resolved at `ceiling`, to the ledger.
    ///
    /// Intermediates are netted against owned output and then expanded
    /// recursively. Items the resolver cannot source are skipped.
    pub fn add_item(
        &mut self,
        resolver: &mut UnitCostResolver<'a>,
        owned: &mut OwnedStock,
        item: ItemId,
        quantity: Decimal,
        ceiling: u16,
    ) {
        let mut visiting = BTreeSet::new();
        self.expand_item(resolver, owned, &mut visiting, item, quantity, ceiling);
    }

    fn expand_item(
        &mut self,
        resolver: &mut UnitCostResolver<'a>,
        owned: &mut OwnedStock,
        visiting: &mut BTreeSet<ItemId>,
        item: ItemId,
        quantity: Decimal,
        ceiling: u16,
    ) {
        if quantity <= Decimal::ZERO {
            return;
        }

        let mut missing = BTreeSet::new();
        let Some(sourcing) = resolver.sourcing(item, ceiling, &mut missing) else {
            debug!(item = %item, ceiling, "skipping unsourced item during expansion");
            return;
        };

        let (kind, name, reagents, recipe, output_quantity) = match sourcing {
            Sourcing::Vendor(_) | Sourcing::Market(_) => {
                let leaf = self.leaves.entry(item).or_insert(Decimal::ZERO);
                *leaf = leaf.saturating_add(quantity);
                return;
            }
            Sourcing::Craft {
                recipe,
                output_quantity,
                ..
            } => (
                ProducerKind::Craft,
                &recipe.name,
                recipe.reagents.as_slice(),
                Some(recipe),
                output_quantity,
            ),
            Sourcing::Smelt {
                producer,
                output_quantity,
                ..
            } => (
                ProducerKind::Smelt,
                &producer.name,
                producer.reagents.as_slice(),
                None,
                output_quantity,
            ),
        };

        if !visiting.insert(item) {
            trace!(item = %item, "cycle break during expansion");
            return;
        }

        let per_craft = Decimal::from(output_quantity);
        let crafts_needed = quantity.checked_div(per_craft).unwrap_or(Decimal::ZERO);
        let covered = owned.cover_crafts(item, crafts_needed, output_quantity);
        let crafts = crafts_needed.saturating_sub(covered);

        if crafts > Decimal::ZERO {
            let tally = self
                .intermediates
                .entry((item, kind, name.clone()))
                .or_insert(IntermediateTally {
                    quantity: Decimal::ZERO,
                    crafts: Decimal::ZERO,
                    recipe,
                });
            tally.quantity = tally.quantity.saturating_add(crafts.saturating_mul(per_craft));
            tally.crafts = tally.crafts.saturating_add(crafts);

            for reagent in reagents {
                let needed = Decimal::from(reagent.quantity).saturating_mul(crafts);
                self.expand_item(resolver, owned, visiting, reagent.item_id, needed, ceiling);
            }
        }

        visiting.remove(&item);
    }
}
