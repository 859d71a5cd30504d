//! Catalog data: professions, recipes, reagents and alternate producers.
//!
//! Catalog values are long-lived and owned by whatever repository loads
//! them. The planner only ever reads them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{DifficultyColor, ProducerKind};
use crate::ids::{ItemId, ProducerId, ProfessionId, RecipeId};

/// Output quality tier at which a recipe stops being a leveling candidate.
pub const DEFAULT_QUALITY_CUTOFF: u8 = 3;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A catalog entry that violates the recipe or producer invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The recipe or producer id is empty.
    #[error("entry has a blank id")]
    BlankId,

    /// The display name is empty.
    #[error("{id}: name is blank")]
    BlankName {
        /// Offending entry.
        id: String,
    },

    /// Difficulty thresholds are not ascending.
    #[error(
        "{id}: thresholds out of order (min {min_skill}, orange {orange_until}, \
         yellow {yellow_until}, green {green_until}, gray {gray_at})"
    )]
    ThresholdsOutOfOrder {
        /// Offending recipe.
        id: String,
        /// Minimum skill to learn the recipe.
        min_skill: u16,
        /// Last orange skill.
        orange_until: u16,
        /// Last yellow skill.
        yellow_until: u16,
        /// Last green skill.
        green_until: u16,
        /// First gray skill.
        gray_at: u16,
    },

    /// No reagents were listed.
    #[error("{id}: no reagents")]
    NoReagents {
        /// Offending entry.
        id: String,
    },

    /// A reagent has a zero quantity.
    #[error("{id}: reagent {item} has zero quantity")]
    ZeroReagentQuantity {
        /// Offending entry.
        id: String,
        /// The reagent item.
        item: ItemId,
    },

    /// The output produces nothing.
    #[error("{id}: output {item} has zero quantity")]
    ZeroOutputQuantity {
        /// Offending entry.
        id: String,
        /// The output item.
        item: ItemId,
    },
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// A profession as listed by the recipe source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Profession {
    /// Game profession id.
    pub profession_id: ProfessionId,
    /// Display name.
    pub name: String,
}

/// An item consumed by every craft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Reagent {
    /// Consumed item.
    pub item_id: ItemId,
    /// Units consumed per craft.
    pub quantity: u32,
}

impl Reagent {
    /// Shorthand constructor.
    pub const fn new(item_id: ItemId, quantity: u32) -> Self {
        Self { item_id, quantity }
    }
}

/// The item a recipe or producer creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RecipeOutput {
    /// Created item.
    pub item_id: ItemId,
    /// Units created per craft.
    pub quantity: u32,
}

impl RecipeOutput {
    /// Shorthand constructor.
    pub const fn new(item_id: ItemId, quantity: u32) -> Self {
        Self { item_id, quantity }
    }
}

fn check_reagents(id: &str, reagents: &[Reagent]) -> Result<(), CatalogError> {
    if reagents.is_empty() {
        return Err(CatalogError::NoReagents { id: id.to_owned() });
    }
    if let Some(bad) = reagents.iter().find(|r| r.quantity == 0) {
        return Err(CatalogError::ZeroReagentQuantity {
            id: id.to_owned(),
            item: bad.item_id,
        });
    }
    Ok(())
}

fn check_output(id: &str, output: Option<&RecipeOutput>) -> Result<(), CatalogError> {
    match output {
        Some(out) if out.quantity == 0 => Err(CatalogError::ZeroOutputQuantity {
            id: id.to_owned(),
            item: out.item_id,
        }),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// A profession recipe.
///
/// The four thresholds partition the skill axis into difficulty bands:
/// orange up to and including `orange_until`, yellow up to `yellow_until`,
/// green up to `green_until` and on until just before `gray_at`, gray from
/// `gray_at` on. Skills below `min_skill` are also gray.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Recipe {
    /// Stable identifier (case-insensitive).
    pub recipe_id: RecipeId,
    /// Owning profession.
    pub profession_id: ProfessionId,
    /// Display name.
    pub name: String,
    /// Skill required to learn the recipe.
    pub min_skill: u16,
    /// Last skill at which the recipe is orange.
    pub orange_until: u16,
    /// Last skill at which the recipe is yellow.
    pub yellow_until: u16,
    /// Last skill at which the recipe is green.
    pub green_until: u16,
    /// First skill at which the recipe is gray.
    pub gray_at: u16,
    /// Items consumed per craft.
    pub reagents: Vec<Reagent>,
    /// Item created per craft, when the recipe is also a material producer.
    #[serde(default)]
    pub output: Option<RecipeOutput>,
    /// Whether a trainer teaches the recipe, when known.
    #[serde(default)]
    pub learned_by_trainer: Option<bool>,
    /// Cooldown between crafts, in seconds.
    #[serde(default)]
    pub cooldown_seconds: Option<u32>,
    /// Quality tier of the created item.
    #[serde(default)]
    pub output_quality: Option<u8>,
}

impl Recipe {
    /// Difficulty band of this recipe at `skill`.
    pub const fn difficulty_at(&self, skill: u16) -> DifficultyColor {
        if skill < self.min_skill {
            DifficultyColor::Gray
        } else if skill <= self.orange_until {
            DifficultyColor::Orange
        } else if skill <= self.yellow_until {
            DifficultyColor::Yellow
        } else if skill <= self.green_until || skill < self.gray_at {
            DifficultyColor::Green
        } else {
            DifficultyColor::Gray
        }
    }

    /// Whether the recipe can be part of a repeatable leveling plan.
    ///
    /// Recipes on a cooldown, or whose output quality reaches
    /// `quality_cutoff`, are one-off crafts and never selected for leveling.
    pub fn is_leveling_candidate(&self, quality_cutoff: u8) -> bool {
        let on_cooldown = self.cooldown_seconds.is_some_and(|s| s > 0);
        let too_rare = self.output_quality.is_some_and(|q| q >= quality_cutoff);
        !on_cooldown && !too_rare
    }

    /// Units produced per craft for `item`, if this recipe makes it.
    pub fn output_quantity_of(&self, item: ItemId) -> Option<u32> {
        self.output
            .filter(|o| o.item_id == item && o.quantity > 0)
            .map(|o| o.quantity)
    }

    /// Check catalog invariants.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.recipe_id.is_blank() {
            return Err(CatalogError::BlankId);
        }
        let id = self.recipe_id.as_str();
        if self.name.trim().is_empty() {
            return Err(CatalogError::BlankName { id: id.to_owned() });
        }

        let ordered = self.orange_until >= self.min_skill
            && self.yellow_until >= self.orange_until
            && self.green_until >= self.yellow_until
            && self.gray_at > self.green_until;
        if !ordered {
            return Err(CatalogError::ThresholdsOutOfOrder {
                id: id.to_owned(),
                min_skill: self.min_skill,
                orange_until: self.orange_until,
                yellow_until: self.yellow_until,
                green_until: self.green_until,
                gray_at: self.gray_at,
            });
        }

        check_reagents(id, &self.reagents)?;
        check_output(id, self.output.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Producer
// ---------------------------------------------------------------------------

/// A non-recipe source of an item, such as smelting ore into bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Producer {
    /// Stable identifier.
    pub producer_id: ProducerId,
    /// Display name.
    pub name: String,
    /// Production method.
    pub kind: ProducerKind,
    /// Item created per run.
    pub output: RecipeOutput,
    /// Items consumed per run.
    pub reagents: Vec<Reagent>,
    /// Skill required, when the producer is gated.
    #[serde(default)]
    pub min_skill: Option<u16>,
}

impl Producer {
    /// Whether the producer is usable at `skill`.
    pub fn usable_at(&self, skill: u16) -> bool {
        self.min_skill.is_none_or(|min| min <= skill)
    }

    /// Check catalog invariants.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let id = self.producer_id.0.as_str();
        if id.trim().is_empty() {
            return Err(CatalogError::BlankId);
        }
        if self.name.trim().is_empty() {
            return Err(CatalogError::BlankName { id: id.to_owned() });
        }
        check_reagents(id, &self.reagents)?;
        check_output(id, Some(&self.output))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn recipe() -> Recipe {
        Recipe {
            recipe_id: RecipeId::from("linen-cloak"),
            profession_id: ProfessionId(197),
            name: String::from("Linen Cloak"),
            min_skill: 10,
            orange_until: 20,
            yellow_until: 30,
            green_until: 40,
            gray_at: 50,
            reagents: vec![Reagent::new(ItemId(2996), 2)],
            output: None,
            learned_by_trainer: Some(true),
            cooldown_seconds: None,
            output_quality: None,
        }
    }

    #[test]
    fn difficulty_bands() {
        let r = recipe();
        assert_eq!(r.difficulty_at(9), DifficultyColor::Gray);
        assert_eq!(r.difficulty_at(10), DifficultyColor::Orange);
        assert_eq!(r.difficulty_at(20), DifficultyColor::Orange);
        assert_eq!(r.difficulty_at(21), DifficultyColor::Yellow);
        assert_eq!(r.difficulty_at(31), DifficultyColor::Green);
        assert_eq!(r.difficulty_at(49), DifficultyColor::Green);
        assert_eq!(r.difficulty_at(50), DifficultyColor::Gray);
    }

    #[test]
    fn cooldown_and_quality_exclude_leveling() {
        let mut r = recipe();
        assert!(r.is_leveling_candidate(DEFAULT_QUALITY_CUTOFF));

        r.cooldown_seconds = Some(0);
        assert!(r.is_leveling_candidate(DEFAULT_QUALITY_CUTOFF));
        r.cooldown_seconds = Some(86_400);
        assert!(!r.is_leveling_candidate(DEFAULT_QUALITY_CUTOFF));

        r.cooldown_seconds = None;
        r.output_quality = Some(2);
        assert!(r.is_leveling_candidate(DEFAULT_QUALITY_CUTOFF));
        r.output_quality = Some(3);
        assert!(!r.is_leveling_candidate(DEFAULT_QUALITY_CUTOFF));
    }

    #[test]
    fn validate_accepts_well_formed_recipe() {
        assert!(recipe().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_thresholds() {
        let mut r = recipe();
        r.gray_at = 40;
        assert!(matches!(
            r.validate(),
            Err(CatalogError::ThresholdsOutOfOrder { .. })
        ));
    }

    #[test]
    fn validate_rejects_zero_quantities() {
        let mut r = recipe();
        r.reagents.push(Reagent::new(ItemId(2589), 0));
        assert_eq!(
            r.validate(),
            Err(CatalogError::ZeroReagentQuantity {
                id: String::from("linen-cloak"),
                item: ItemId(2589),
            })
        );

        let mut r = recipe();
        r.output = Some(RecipeOutput::new(ItemId(2570), 0));
        assert!(matches!(
            r.validate(),
            Err(CatalogError::ZeroOutputQuantity { .. })
        ));
    }

    #[test]
    fn validate_rejects_missing_reagents() {
        let mut r = recipe();
        r.reagents.clear();
        assert!(matches!(r.validate(), Err(CatalogError::NoReagents { .. })));
    }

    #[test]
    fn output_quantity_only_for_matching_item() {
        let mut r = recipe();
        r.output = Some(RecipeOutput::new(ItemId(2570), 1));
        assert_eq!(r.output_quantity_of(ItemId(2570)), Some(1));
        assert_eq!(r.output_quantity_of(ItemId(2996)), None);
    }

    #[test]
    fn producer_gating() {
        let p = Producer {
            producer_id: ProducerId::from("smelt-copper"),
            name: String::from("Smelt Copper"),
            kind: ProducerKind::Smelt,
            output: RecipeOutput::new(ItemId(2840), 1),
            reagents: vec![Reagent::new(ItemId(2770), 1)],
            min_skill: Some(1),
        };
        assert!(!p.usable_at(0));
        assert!(p.usable_at(1));
        assert!(p.validate().is_ok());
    }
}
