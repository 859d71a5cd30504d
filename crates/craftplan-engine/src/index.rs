//! Producer indices: which recipes and smelters create a given item.
//!
//! Built once per planning request from request-scoped slices. Candidate
//! lists are sorted by id so every walk over them is deterministic and the
//! lowest id wins ties.

use std::collections::BTreeMap;

use craftplan_types::{ItemId, Producer, ProducerKind, Recipe};

/// Output-item lookup for craft recipes and smelt producers.
#[derive(Debug, Clone, Default)]
pub struct ProducerIndex<'a> {
    crafts: BTreeMap<ItemId, Vec<&'a Recipe>>,
    smelts: BTreeMap<ItemId, Vec<&'a Producer>>,
}

impl<'a> ProducerIndex<'a> {
    /// Index `recipes` by output item and `producers` of kind
    /// [`ProducerKind::Smelt`] by output item.
    ///
    /// Recipes without an output, and outputs of zero quantity, are skipped.
    pub fn build(recipes: &'a [Recipe], producers: &'a [Producer]) -> Self {
        let mut crafts: BTreeMap<ItemId, Vec<&'a Recipe>> = BTreeMap::new();
        for recipe in recipes {
            if let Some(output) = recipe.output.filter(|o| o.quantity > 0) {
                crafts.entry(output.item_id).or_default().push(recipe);
            }
        }
        for list in crafts.values_mut() {
            list.sort_by(|a, b| a.recipe_id.cmp(&b.recipe_id));
        }

        let mut smelts: BTreeMap<ItemId, Vec<&'a Producer>> = BTreeMap::new();
        for producer in producers {
            if producer.kind == ProducerKind::Smelt && producer.output.quantity > 0 {
                smelts
                    .entry(producer.output.item_id)
                    .or_default()
                    .push(producer);
            }
        }
        for list in smelts.values_mut() {
            list.sort_by(|a, b| a.producer_id.cmp(&b.producer_id));
        }

        Self { crafts, smelts }
    }

    /// Recipes that create `item`, sorted by recipe id.
    pub fn craft_producers(&self, item: ItemId) -> &[&'a Recipe] {
        self.crafts.get(&item).map(Vec::as_slice).unwrap_or_default()
    }

    /// Smelt producers that create `item`, sorted by producer id.
    pub fn smelt_producers(&self, item: ItemId) -> &[&'a Producer] {
        self.smelts.get(&item).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of distinct craftable items.
    pub fn craftable_items(&self) -> usize {
        self.crafts.len()
    }
}

#[cfg(test)]
mod tests {
    use craftplan_types::{ProducerId, ProfessionId, Reagent, RecipeId, RecipeOutput};

    use super::*;

    fn recipe(id: &str, output: Option<RecipeOutput>) -> Recipe {
        Recipe {
            recipe_id: RecipeId::from(id),
            profession_id: ProfessionId(197),
            name: id.to_owned(),
            min_skill: 1,
            orange_until: 10,
            yellow_until: 20,
            green_until: 30,
            gray_at: 40,
            reagents: vec![Reagent::new(ItemId(1), 1)],
            output,
            learned_by_trainer: None,
            cooldown_seconds: None,
            output_quality: None,
        }
    }

    fn producer(id: &str, kind: ProducerKind, item: u32) -> Producer {
        Producer {
            producer_id: ProducerId::from(id),
            name: id.to_owned(),
            kind,
            output: RecipeOutput::new(ItemId(item), 1),
            reagents: vec![Reagent::new(ItemId(9), 2)],
            min_skill: None,
        }
    }

    #[test]
    fn crafts_indexed_by_output_and_sorted() {
        let recipes = vec![
            recipe("Zeta", Some(RecipeOutput::new(ItemId(50), 1))),
            recipe("alpha", Some(RecipeOutput::new(ItemId(50), 2))),
            recipe("no-output", None),
            recipe("zero-output", Some(RecipeOutput::new(ItemId(60), 0))),
        ];
        let index = ProducerIndex::build(&recipes, &[]);

        let ids: Vec<&str> = index
            .craft_producers(ItemId(50))
            .iter()
            .map(|r| r.recipe_id.as_str())
            .collect();
        assert_eq!(ids, vec!["alpha", "Zeta"]);
        assert!(index.craft_producers(ItemId(60)).is_empty());
        assert_eq!(index.craftable_items(), 1);
    }

    #[test]
    fn only_smelt_producers_are_indexed() {
        let producers = vec![
            producer("smelt-b", ProducerKind::Smelt, 70),
            producer("smelt-a", ProducerKind::Smelt, 70),
            producer("craft-x", ProducerKind::Craft, 71),
        ];
        let index = ProducerIndex::build(&[], &producers);

        let ids: Vec<&str> = index
            .smelt_producers(ItemId(70))
            .iter()
            .map(|p| p.producer_id.0.as_str())
            .collect();
        assert_eq!(ids, vec!["smelt-a", "smelt-b"]);
        assert!(index.smelt_producers(ItemId(71)).is_empty());
    }
}
