//! Recipe selection per skill point and plan step building.

use std::collections::BTreeSet;

use craftplan_types::{ItemId, Money, PlanStep, Recipe, StepKind};
use rust_decimal::Decimal;

use crate::chance::SkillUpChanceModel;
use crate::resolver::UnitCostResolver;

/// The recipe chosen for one skill point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    /// Chosen recipe.
    pub recipe: &'a Recipe,
    /// Skill-up probability at this skill.
    pub chance: Decimal,
    /// Material cost of one craft.
    pub craft_cost: Money,
    /// `craft_cost / chance`, rounded.
    pub expected_cost: Money,
    /// `1 / chance`.
    pub expected_crafts: Decimal,
}

/// Pick the recipe with the lowest expected cost at `skill`.
///
/// `candidates` must be sorted by recipe id and already filtered to the
/// leveling pool. A candidate only replaces the incumbent when strictly
/// cheaper, so the lowest id wins ties. Items blocking any candidate are
/// added to `missing`.
pub fn best_recipe_at<'a>(
    candidates: &[&'a Recipe],
    skill: u16,
    chances: &SkillUpChanceModel,
    resolver: &mut UnitCostResolver<'a>,
    missing: &mut BTreeSet<ItemId>,
) -> Option<Selection<'a>> {
    let mut best: Option<Selection<'a>> = None;

    for &recipe in candidates {
        if skill < recipe.min_skill {
            continue;
        }
        let chance = chances.chance_at(recipe, skill);
        let Some(expected_crafts) = SkillUpChanceModel::attempts_per_skill_up(chance) else {
            continue;
        };
        let Some(craft_cost) = resolver.craft_cost(&recipe.reagents, skill, missing) else {
            continue;
        };
        let Some(expected_cost) = craft_cost.div_decimal(chance) else {
            continue;
        };

        if best.is_none_or(|b| expected_cost < b.expected_cost) {
            best = Some(Selection {
                recipe,
                chance,
                craft_cost,
                expected_cost,
                expected_crafts,
            });
        }
    }

    best
}

/// Append one skill point to `steps`, extending the last step when it used
/// the same recipe at the same chance.
pub fn push_skill_point(
    steps: &mut Vec<PlanStep>,
    skill: u16,
    recipe: &Recipe,
    chance: Decimal,
    expected_crafts: Decimal,
    expected_cost: Money,
    kind: StepKind,
) {
    if let Some(last) = steps.last_mut() {
        let extends = last.recipe_id == recipe.recipe_id
            && last.skill_up_chance == chance
            && last.skill_to == skill
            && last.kind == kind;
        if extends {
            last.skill_to = skill.saturating_add(1);
            last.expected_crafts = last.expected_crafts.saturating_add(expected_crafts);
            last.expected_cost += expected_cost;
            return;
        }
    }

    steps.push(PlanStep {
        skill_from: skill,
        skill_to: skill.saturating_add(1),
        recipe_id: recipe.recipe_id.clone(),
        recipe_name: recipe.name.clone(),
        learned_by_trainer: recipe.learned_by_trainer,
        skill_up_chance: chance,
        expected_crafts,
        expected_cost,
        kind,
    });
}
