//! Player-owned material allocation.
//!
//! One [`OwnedStock`] lives for one planning pass. Stock is drawn down at
//! three points: direct reagents when a recipe is selected, intermediate
//! outputs as the expander reaches them, and leaf purchases when the
//! shopping list is assembled. Each draw is tallied once, so the usage
//! report never double-counts a unit.

use std::collections::BTreeMap;

use craftplan_types::{ItemId, OwnedMaterialLine};
use rust_decimal::Decimal;

/// Remaining owned quantities and what has been taken from them.
#[derive(Debug, Clone, Default)]
pub struct OwnedStock {
    available: BTreeMap<ItemId, Decimal>,
    used: BTreeMap<ItemId, Decimal>,
}

impl OwnedStock {
    /// Stock holding the positive entries of `owned`.
    pub fn new(owned: &BTreeMap<ItemId, Decimal>) -> Self {
        let available = owned
            .iter()
            .filter(|(_, qty)| **qty > Decimal::ZERO)
            .map(|(&item, &qty)| (item, qty))
            .collect();
        Self {
            available,
            used: BTreeMap::new(),
        }
    }

    /// Quantity of `item` still on hand.
    pub fn available(&self, item: ItemId) -> Decimal {
        self.available.get(&item).copied().unwrap_or(Decimal::ZERO)
    }

    /// Take up to `wanted` units of `item`. Returns the quantity taken.
    pub fn take(&mut self, item: ItemId, wanted: Decimal) -> Decimal {
        if wanted <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let Some(on_hand) = self.available.get_mut(&item) else {
            return Decimal::ZERO;
        };
        let taken = wanted.min(*on_hand);
        *on_hand = on_hand.saturating_sub(taken);
        if on_hand.is_zero() {
            self.available.remove(&item);
        }
        if taken > Decimal::ZERO {
            let tally = self.used.entry(item).or_insert(Decimal::ZERO);
            *tally = tally.saturating_add(taken);
        }
        taken
    }

    /// Cover intermediate crafts of `item` with owned output.
    ///
    /// Only whole batches of `output_quantity` count, so at most
    /// `floor(available / output_quantity)` crafts are covered. Returns the
    /// number of crafts covered, never more than `crafts_needed`.
    pub fn cover_crafts(
        &mut self,
        item: ItemId,
        crafts_needed: Decimal,
        output_quantity: u32,
    ) -> Decimal {
        let per_craft = Decimal::from(output_quantity);
        let whole = self
            .available(item)
            .checked_div(per_craft)
            .map_or(Decimal::ZERO, |batches| batches.floor());
        let covered = crafts_needed.min(whole);
        if covered <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.take(item, covered.saturating_mul(per_craft));
        covered
    }

    /// Everything taken so far, by item id.
    pub fn usage(&self) -> Vec<OwnedMaterialLine> {
        self.used
            .iter()
            .filter(|(_, qty)| **qty > Decimal::ZERO)
            .map(|(&item_id, &quantity)| OwnedMaterialLine {
                item_id,
                quantity: quantity.normalize(),
            })
            .collect()
    }
}
