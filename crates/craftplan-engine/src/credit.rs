//! Skill credit from intermediate crafts.
//!
//! Intermediates crafted for materials by the profession being leveled can
//! grant skill-ups too, if they are crafted before the main plan starts.
//! [`simulate_credit`] replays those crafts from the starting skill, always
//! spending the batch with the best skill-up chance first, and reports how
//! many whole skill points they are worth.

use craftplan_types::{Money, PlanStep, Recipe, StepKind};
use rust_decimal::Decimal;

use crate::chance::SkillUpChanceModel;
use crate::selector::push_skill_point;

/// Skill gained from a set of intermediate crafts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreditOutcome {
    /// Whole skill points gained.
    pub skill_gained: u16,
    /// Whole points plus the partial expectation of leftover crafts.
    pub expected_skill_ups: Decimal,
    /// Credit steps, merged like main plan steps.
    pub steps: Vec<PlanStep>,
}

/// Replay `crafts` (recipe, expected craft attempts) starting at `start`,
/// gaining at most `limit` points.
///
/// At each skill the batch with the highest chance is used (lowest recipe id
/// on ties). A batch only counts while the skill is at or above its
/// `min_skill` and below its `gray_at`. When a batch has fewer crafts left
/// than one skill-up needs, its leftover expectation is added to
/// `expected_skill_ups` and the batch is exhausted. Credit steps carry no
/// cost because their materials are already on the shopping list.
pub fn simulate_credit(
    crafts: &[(&Recipe, Decimal)],
    start: u16,
    limit: u16,
    chances: &SkillUpChanceModel,
) -> CreditOutcome {
    let mut remaining: Vec<(&Recipe, Decimal)> = crafts
        .iter()
        .filter(|(_, n)| *n > Decimal::ZERO)
        .map(|&(recipe, n)| (recipe, n))
        .collect();
    remaining.sort_by(|a, b| a.0.recipe_id.cmp(&b.0.recipe_id));

    let mut outcome = CreditOutcome::default();
    let mut partial = Decimal::ZERO;
    let mut skill = start;

    while outcome.skill_gained < limit {
        let mut pick: Option<(usize, Decimal)> = None;
        for (i, (recipe, left)) in remaining.iter().enumerate() {
            if *left <= Decimal::ZERO || skill < recipe.min_skill || skill >= recipe.gray_at {
                continue;
            }
            let chance = chances.chance_at(recipe, skill);
            if chance > Decimal::ZERO && pick.is_none_or(|(_, best)| chance > best) {
                pick = Some((i, chance));
            }
        }
        let Some((i, chance)) = pick else {
            break;
        };
        let Some(per_point) = SkillUpChanceModel::attempts_per_skill_up(chance) else {
            break;
        };
        let Some((recipe, left)) = remaining.get_mut(i) else {
            break;
        };

        if *left >= per_point {
            *left = left.saturating_sub(per_point);
            push_skill_point(
                &mut outcome.steps,
                skill,
                *recipe,
                chance,
                per_point,
                Money::ZERO,
                StepKind::IntermediateCredit,
            );
            skill = skill.saturating_add(1);
            outcome.skill_gained = outcome.skill_gained.saturating_add(1);
        } else {
            partial = partial.saturating_add(left.saturating_mul(chance));
            *left = Decimal::ZERO;
        }
    }

    outcome.expected_skill_ups = Decimal::from(outcome.skill_gained)
        .saturating_add(partial)
        .normalize();
    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use craftplan_types::{ItemId, ProfessionId, Reagent, RecipeId};
    use rust_decimal_macros::dec;

    use super::*;

    fn recipe(id: &str, min_skill: u16, orange_until: u16, gray_at: u16) -> Recipe {
        Recipe {
            recipe_id: RecipeId::from(id),
            profession_id: ProfessionId(197),
            name: id.to_owned(),
            min_skill,
            orange_until,
            yellow_until: orange_until,
            green_until: orange_until,
            gray_at,
            reagents: vec![Reagent::new(ItemId(1), 1)],
            output: None,
            learned_by_trainer: None,
            cooldown_seconds: None,
            output_quality: None,
        }
    }

    #[test]
    fn orange_crafts_give_one_point_each() {
        let bolt = recipe("bolt", 1, 50, 75);
        let out = simulate_credit(&[(&bolt, dec!(3))], 1, 10, &SkillUpChanceModel::default());
        assert_eq!(out.skill_gained, 3);
        assert_eq!(out.expected_skill_ups, dec!(3));
        assert_eq!(out.steps.len(), 1);
        let step = out.steps.first().unwrap();
        assert_eq!((step.skill_from, step.skill_to), (1, 4));
        assert_eq!(step.kind, StepKind::IntermediateCredit);
        assert_eq!(step.expected_cost, Money::ZERO);
    }

    #[test]
    fn credit_is_capped_by_limit() {
        let bolt = recipe("bolt", 1, 50, 75);
        let out = simulate_credit(&[(&bolt, dec!(10))], 1, 4, &SkillUpChanceModel::default());
        assert_eq!(out.skill_gained, 4);
        let out = simulate_credit(&[(&bolt, dec!(10))], 1, 0, &SkillUpChanceModel::default());
        assert_eq!(out.skill_gained, 0);
        assert!(out.steps.is_empty());
    }

    #[test]
    fn leftover_crafts_count_as_partial_expectation() {
        // Green (0.25) past orange_until = yellow_until = green_until = 5,
        // gray at 20. Six crafts at skill 10: four buy one point, the last
        // two are worth 0.5 expected.
        let r = recipe("r", 1, 5, 20);
        let out = simulate_credit(&[(&r, dec!(6))], 10, 10, &SkillUpChanceModel::default());
        assert_eq!(out.skill_gained, 1);
        assert_eq!(out.expected_skill_ups, dec!(1.5));
    }

    #[test]
    fn gray_and_unlearned_recipes_give_nothing() {
        let high = recipe("high", 30, 40, 50);
        let gray = recipe("gray", 1, 5, 8);
        let chances = SkillUpChanceModel::default();
        let out = simulate_credit(&[(&high, dec!(5)), (&gray, dec!(5))], 10, 10, &chances);
        assert_eq!(out.skill_gained, 0);
        assert_eq!(out.expected_skill_ups, dec!(0));
    }

    #[test]
    fn best_chance_batch_is_spent_first() {
        let orange = recipe("z-orange", 1, 50, 75);
        let green = recipe("a-green", 1, 5, 75);
        let out = simulate_credit(
            &[(&green, dec!(4)), (&orange, dec!(1))],
            10,
            10,
            &SkillUpChanceModel::default(),
        );
        assert_eq!(out.skill_gained, 2);
        let ids: Vec<&str> = out.steps.iter().map(|s| s.recipe_id.as_str()).collect();
        assert_eq!(ids, vec!["z-orange", "a-green"]);
    }
}
