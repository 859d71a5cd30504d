//! Skill-up chance model.
//!
//! Maps a recipe's difficulty color at a given skill to the probability
//! that one craft attempt grants a skill point. A probability of zero makes
//! a recipe useless for leveling, though it can still produce materials.

use craftplan_types::{DifficultyColor, Recipe};
use rust_decimal::Decimal;

use crate::config::ChanceTable;

/// Difficulty-to-probability lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkillUpChanceModel {
    table: ChanceTable,
}

impl SkillUpChanceModel {
    /// Build a model from a chance table.
    pub const fn new(table: ChanceTable) -> Self {
        Self { table }
    }

    /// Probability for a difficulty color.
    pub const fn chance(&self, color: DifficultyColor) -> Decimal {
        self.table.get(color)
    }

    /// Probability of a skill-up when crafting `recipe` at `skill`.
    pub const fn chance_at(&self, recipe: &Recipe, skill: u16) -> Decimal {
        self.chance(recipe.difficulty_at(skill))
    }

    /// Expected craft attempts per skill-up (`1 / p`), or `None` when `p`
    /// is zero.
    pub fn attempts_per_skill_up(chance: Decimal) -> Option<Decimal> {
        if chance <= Decimal::ZERO {
            return None;
        }
        Decimal::ONE.checked_div(chance)
    }
}
