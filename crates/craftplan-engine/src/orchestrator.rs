//! Plan orchestration: planning passes, the intermediate-credit
//! convergence loop, and result assembly.
//!
//! A pass is a pure function of its starting skill. It builds a fresh
//! resolver, owned stock and ledger, selects a recipe for every skill point
//! up to the target, and expands each selection into materials. Nothing is
//! shared between passes except the read-only inputs.
//!
//! The loop then asks how many skill points the pass's own intermediate
//! crafts would be worth if done first. If that moves the starting skill,
//! a new pass is planned from there and accepted only when its
//! intermediates still cover the jump. Rejected starts bound the search
//! from above, so it narrows toward the highest consistent start it can
//! find within the pass budget. The accepted pass is always
//! self-consistent.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use craftplan_types::{
    ItemId, Money, PlanRequest, PlanResult, PlanStep, ProducerKind, Recipe, ShoppingListLine,
    StepKind,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::chance::SkillUpChanceModel;
use crate::credit::{CreditOutcome, simulate_credit};
use crate::expand::ShoppingLedger;
use crate::index::ProducerIndex;
use crate::owned::OwnedStock;
use crate::resolver::{PriceBook, SourcingRules, UnitCostResolver};
use crate::selector::{best_recipe_at, push_skill_point};

/// Read-only inputs shared by every pass of one request.
#[derive(Debug, Clone, Copy)]
pub struct PlanInputs<'a> {
    /// The request being planned.
    pub request: &'a PlanRequest,
    /// Recipes available after exclusions, sorted by recipe id.
    pub recipes: &'a [Recipe],
    /// Producer lookup over `recipes` and smelters.
    pub index: &'a ProducerIndex<'a>,
    /// Vendor and market prices.
    pub prices: PriceBook<'a>,
    /// Skill-up chance table.
    pub chances: &'a SkillUpChanceModel,
    /// Quality tier that removes recipes from the leveling pool.
    pub quality_cutoff: u8,
    /// Upper bound on passes, including the first.
    pub max_passes: u32,
}

impl<'a> PlanInputs<'a> {
    /// Leveling pool: the request profession's repeatable recipes, in id
    /// order.
    fn leveling_candidates(&self) -> Vec<&'a Recipe> {
        let mut pool: Vec<&'a Recipe> = self
            .recipes
            .iter()
            .filter(|r| {
                r.profession_id == self.request.profession_id
                    && r.is_leveling_candidate(self.quality_cutoff)
            })
            .collect();
        pool.sort_by(|a, b| a.recipe_id.cmp(&b.recipe_id));
        pool
    }
}

/// A skill point with no usable recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassFailure {
    /// The failing skill.
    pub skill: u16,
    /// Items that blocked any candidate from the pass start up to and
    /// including the failing skill, sorted.
    pub missing: Vec<ItemId>,
}

impl core::fmt::Display for PassFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "No usable recipe with prices at skill {}.", self.skill)
    }
}

/// Outcome of one planning pass.
#[derive(Debug, Clone)]
pub struct PassOutcome<'a> {
    /// Skill the main plan starts from.
    pub start_skill: u16,
    /// Main plan steps.
    pub steps: Vec<PlanStep>,
    /// Materials and intermediates.
    pub ledger: ShoppingLedger<'a>,
    /// Owned stock left after the pass.
    pub owned: OwnedStock,
}

/// Plan every skill point from `start` to the target.
pub fn plan_pass<'a>(inputs: &PlanInputs<'a>, start: u16) -> Result<PassOutcome<'a>, PassFailure> {
    let rules = SourcingRules::from_request(inputs.request);
    let mut resolver = UnitCostResolver::new(inputs.index, inputs.prices, rules);
    let mut owned = OwnedStock::new(&inputs.request.owned_materials);
    let mut ledger = ShoppingLedger::new();
    let mut steps = Vec::new();
    let candidates = inputs.leveling_candidates();
    // Blockers of skipped candidates at every skill so far, not just the
    // failing one.
    let mut missing = BTreeSet::new();

    for skill in start..inputs.request.target_skill {
        let picked =
            best_recipe_at(&candidates, skill, inputs.chances, &mut resolver, &mut missing);
        let Some(pick) = picked else {
            return Err(PassFailure {
                skill,
                missing: missing.into_iter().collect(),
            });
        };

        for reagent in &pick.recipe.reagents {
            let needed = Decimal::from(reagent.quantity).saturating_mul(pick.expected_crafts);
            let taken = owned.take(reagent.item_id, needed);
            let rest = needed.saturating_sub(taken);
            ledger.add_item(&mut resolver, &mut owned, reagent.item_id, rest, skill);
        }

        push_skill_point(
            &mut steps,
            skill,
            pick.recipe,
            pick.chance,
            pick.expected_crafts,
            pick.expected_cost,
            StepKind::Leveling,
        );
    }

    Ok(PassOutcome {
        start_skill: start,
        steps,
        ledger,
        owned,
    })
}

/// Skill credit earned by a pass's in-profession intermediate crafts,
/// replayed from the request's current skill and capped at `limit` points.
pub fn credit_for(inputs: &PlanInputs<'_>, pass: &PassOutcome<'_>, limit: u16) -> CreditOutcome {
    let crafts: Vec<(&Recipe, Decimal)> = pass
        .ledger
        .intermediates()
        .filter(|((_, kind, _), _)| *kind == ProducerKind::Craft)
        .filter_map(|(_, tally)| tally.recipe.map(|r| (r, tally.crafts)))
        .filter(|(r, _)| {
            r.profession_id == inputs.request.profession_id
                && r.is_leveling_candidate(inputs.quality_cutoff)
        })
        .collect();
    simulate_credit(&crafts, inputs.request.current_skill, limit, inputs.chances)
}

/// Run the convergence loop and assemble the final plan.
pub fn build_plan_result(
    inputs: &PlanInputs<'_>,
    generated_at: DateTime<Utc>,
) -> Result<PlanResult, PassFailure> {
    let current = inputs.request.current_skill;
    let target = inputs.request.target_skill;
    let gap = target.saturating_sub(current);

    // The main plan must keep at least one skill point.
    let highest_start = target.saturating_sub(1);

    let mut accepted = plan_pass(inputs, current)?;
    let mut proposed = current
        .saturating_add(credit_for(inputs, &accepted, gap).skill_gained)
        .min(highest_start);
    // Lowest start known not to work; the search stays strictly below it.
    let mut rejected_at = target;
    let mut passes: u32 = 1;

    // `accepted` always starts at a skill its own intermediates reach. A
    // candidate that falls short lowers the ceiling and pulls the next
    // proposal down to what it does reach; when that guess leaves the open
    // range, the range is halved instead.
    while passes < inputs.max_passes {
        debug!(
            pass = passes,
            start = accepted.start_skill,
            proposed,
            rejected_at,
            "convergence pass"
        );
        if proposed <= accepted.start_skill || proposed >= rejected_at {
            break;
        }

        passes = passes.saturating_add(1);
        let next = match plan_pass(inputs, proposed) {
            Ok(candidate) => {
                let credit = credit_for(inputs, &candidate, gap);
                let covered = current.saturating_add(credit.skill_gained);
                if covered >= proposed {
                    accepted = candidate;
                } else {
                    debug!(start = proposed, covered, "candidate intermediates fall short");
                    rejected_at = proposed;
                }
                covered.min(highest_start)
            }
            Err(failed) => {
                debug!(start = proposed, skill = failed.skill, "candidate pass failed");
                rejected_at = proposed;
                accepted.start_skill
            }
        };

        proposed = if next > accepted.start_skill && next < rejected_at {
            next
        } else {
            accepted.start_skill.midpoint(rejected_at)
        };
    }

    let credit_limit = accepted.start_skill.saturating_sub(current);
    let credit = credit_for(inputs, &accepted, credit_limit);
    Ok(assemble(inputs, accepted, credit, generated_at))
}

fn assemble(
    inputs: &PlanInputs<'_>,
    pass: PassOutcome<'_>,
    credit: CreditOutcome,
    generated_at: DateTime<Utc>,
) -> PlanResult {
    let PassOutcome {
        steps: main_steps,
        ledger,
        mut owned,
        ..
    } = pass;

    let mut shopping_list = Vec::new();
    for (&item_id, &needed) in ledger.leaves() {
        let taken = owned.take(item_id, needed);
        let quantity = needed.saturating_sub(taken);
        if quantity <= Decimal::ZERO {
            continue;
        }
        let unit_price = inputs.prices.purchase_price(item_id);
        shopping_list.push(ShoppingListLine {
            item_id,
            quantity: quantity.normalize(),
            unit_price,
            line_cost: unit_price.mul_quantity(quantity),
        });
    }
    let total_cost: Money = shopping_list.iter().map(|line| line.line_cost).sum();

    let mut steps = credit.steps;
    steps.extend(main_steps);

    PlanResult {
        steps,
        intermediates: ledger.intermediate_lines(),
        shopping_list,
        owned_materials_used: owned.usage(),
        skill_credit_applied: credit.skill_gained,
        expected_skill_ups_from_intermediates: credit.expected_skill_ups,
        total_cost,
        generated_at,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::TimeZone;
    use craftplan_types::{
        GameVersion, PriceMode, PriceSnapshot, PriceSummary, ProfessionId, Reagent, RealmKey,
        RecipeId, RecipeOutput, Region,
    };
    use rust_decimal_macros::dec;

    use super::*;

    const PROF: ProfessionId = ProfessionId(197);

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    fn recipe(
        id: &str,
        min_skill: u16,
        orange_until: u16,
        gray_at: u16,
        reagents: &[(u32, u32)],
        output: Option<(u32, u32)>,
    ) -> Recipe {
        Recipe {
            recipe_id: RecipeId::from(id),
            profession_id: PROF,
            name: id.to_owned(),
            min_skill,
            orange_until,
            yellow_until: orange_until,
            green_until: orange_until,
            gray_at,
            reagents: reagents
                .iter()
                .map(|&(item, qty)| Reagent::new(ItemId(item), qty))
                .collect(),
            output: output.map(|(item, qty)| RecipeOutput::new(ItemId(item), qty)),
            learned_by_trainer: None,
            cooldown_seconds: None,
            output_quality: None,
        }
    }

    fn snapshot(quotes: &[(u32, i64)]) -> PriceSnapshot {
        let mut snap = PriceSnapshot::unavailable(
            RealmKey::new(Region::Us, GameVersion::Era, "test"),
            at(),
            None,
        );
        for &(item, copper) in quotes {
            snap.prices.insert(
                ItemId(item),
                PriceSummary {
                    item_id: ItemId(item),
                    min_buyout: Money(copper),
                    median: None,
                    snapshot_at: at(),
                    source: String::from("test"),
                },
            );
        }
        snap
    }

    fn request(current: u16, target: u16) -> PlanRequest {
        PlanRequest::new(
            RealmKey::new(Region::Us, GameVersion::Era, "test"),
            PROF,
            current,
            target,
        )
    }

    #[test]
    fn pass_fails_at_first_unresolvable_skill() {
        // "early" covers skills 1..=9 (gray at 10); nothing covers 10.
        // "blocked" is usable at 1..=4 but item 888 has no source.
        let recipes = vec![
            recipe("blocked", 1, 4, 5, &[(888, 1)], None),
            recipe("early", 1, 9, 10, &[(1, 1)], None),
        ];
        let index = ProducerIndex::build(&recipes, &[]);
        let vendor = BTreeMap::new();
        let snap = snapshot(&[(1, 5)]);
        let req = request(1, 15);
        let chances = SkillUpChanceModel::default();
        let inputs = PlanInputs {
            request: &req,
            recipes: &recipes,
            index: &index,
            prices: PriceBook::new(&vendor, &snap, PriceMode::Min),
            chances: &chances,
            quality_cutoff: 3,
            max_passes: 6,
        };

        let err = plan_pass(&inputs, 1).unwrap_err();
        assert_eq!(err.skill, 10);
        assert_eq!(err.missing, vec![ItemId(888)]);
        assert_eq!(err.to_string(), "No usable recipe with prices at skill 10.");
    }

    /// Bolts: 1 cloth -> 2 bolts. Cloaks: 1 bolt each, so a cloak costs
    /// half a bolt craft and is always the cheaper skill-up.
    fn tailoring() -> Vec<Recipe> {
        vec![
            recipe("bolt", 1, 50, 75, &[(2589, 1)], Some((2996, 2))),
            recipe("cloak", 1, 50, 75, &[(2996, 1)], None),
        ]
    }

    #[test]
    fn intermediate_crafts_credit_the_starting_skill() {
        let recipes = tailoring();
        let index = ProducerIndex::build(&recipes, &[]);
        let vendor = BTreeMap::new();
        let snap = snapshot(&[(2589, 10)]);
        let req = request(1, 11);
        let chances = SkillUpChanceModel::default();
        let inputs = PlanInputs {
            request: &req,
            recipes: &recipes,
            index: &index,
            prices: PriceBook::new(&vendor, &snap, PriceMode::Min),
            chances: &chances,
            quality_cutoff: 3,
            max_passes: 6,
        };

        let plan = build_plan_result(&inputs, at()).unwrap();

        // From 4: 7 cloaks need 3.5 bolt crafts, worth 3 points from 1.
        assert_eq!(plan.skill_credit_applied, 3);
        assert_eq!(plan.expected_skill_ups_from_intermediates, dec!(3));

        let mut expected_from = 1;
        for step in &plan.steps {
            assert_eq!(step.skill_from, expected_from);
            assert!(step.skill_from < step.skill_to);
            expected_from = step.skill_to;
        }
        assert_eq!(expected_from, 11);

        let credit = plan.steps.first().unwrap();
        assert_eq!(credit.kind, StepKind::IntermediateCredit);
        assert_eq!(credit.recipe_id.as_str(), "bolt");
        assert_eq!((credit.skill_from, credit.skill_to), (1, 4));
        assert_eq!(credit.expected_cost, Money::ZERO);

        let main = plan.steps.last().unwrap();
        assert_eq!(main.kind, StepKind::Leveling);
        assert_eq!((main.skill_from, main.skill_to), (4, 11));

        let cloth = plan.shopping_list.iter().find(|l| l.item_id == ItemId(2589)).unwrap();
        assert_eq!(cloth.quantity, dec!(3.5));
        assert_eq!(plan.total_cost, Money(35));
    }

    #[test]
    fn credit_covering_the_whole_gap_still_finds_a_start() {
        // One cloth weaves one bolt and a cloak takes one bolt, so the
        // first pass's bolts alone are worth every point up to the target.
        // Equal costs keep "cloak" ahead of "weave-bolt" on id.
        let recipes = vec![
            recipe("cloak", 1, 50, 75, &[(2996, 1)], None),
            recipe("weave-bolt", 1, 50, 75, &[(2589, 1)], Some((2996, 1))),
        ];
        let index = ProducerIndex::build(&recipes, &[]);
        let vendor = BTreeMap::new();
        let snap = snapshot(&[(2589, 10)]);
        let req = request(1, 11);
        let chances = SkillUpChanceModel::default();
        let inputs = PlanInputs {
            request: &req,
            recipes: &recipes,
            index: &index,
            prices: PriceBook::new(&vendor, &snap, PriceMode::Min),
            chances: &chances,
            quality_cutoff: 3,
            max_passes: 6,
        };

        let plan = build_plan_result(&inputs, at()).unwrap();

        // From 6: 5 cloaks need 5 bolt crafts, worth 5 points from 1.
        assert_eq!(plan.skill_credit_applied, 5);
        let credit = plan.steps.first().unwrap();
        assert_eq!(credit.kind, StepKind::IntermediateCredit);
        assert_eq!(credit.recipe_id.as_str(), "weave-bolt");
        assert_eq!((credit.skill_from, credit.skill_to), (1, 6));
        let main = plan.steps.last().unwrap();
        assert_eq!(main.recipe_id.as_str(), "cloak");
        assert_eq!((main.skill_from, main.skill_to), (6, 11));
        assert_eq!(plan.total_cost, Money(50));
    }

    #[test]
    fn single_pass_limit_disables_credit() {
        let recipes = tailoring();
        let index = ProducerIndex::build(&recipes, &[]);
        let vendor = BTreeMap::new();
        let snap = snapshot(&[(2589, 10)]);
        let req = request(1, 11);
        let chances = SkillUpChanceModel::default();
        let inputs = PlanInputs {
            request: &req,
            recipes: &recipes,
            index: &index,
            prices: PriceBook::new(&vendor, &snap, PriceMode::Min),
            chances: &chances,
            quality_cutoff: 3,
            max_passes: 1,
        };

        let plan = build_plan_result(&inputs, at()).unwrap();
        assert_eq!(plan.skill_credit_applied, 0);
        assert!(plan.steps.iter().all(|s| s.kind == StepKind::Leveling));
        // 10 cloaks, 5 bolt crafts, 5 cloth.
        let cloth = plan.shopping_list.iter().find(|l| l.item_id == ItemId(2589)).unwrap();
        assert_eq!(cloth.quantity, dec!(5));
        assert_eq!(plan.total_cost, Money(50));
        let bolts = plan.intermediates.first().unwrap();
        assert_eq!(bolts.quantity, dec!(10));
    }

    #[test]
    fn owned_leaves_are_netted_at_assembly() {
        let recipes = vec![recipe("a", 1, 50, 75, &[(1, 2)], None)];
        let index = ProducerIndex::build(&recipes, &[]);
        let vendor = BTreeMap::new();
        let snap = snapshot(&[(1, 10)]);
        let mut req = request(1, 3);
        req.owned_materials.insert(ItemId(1), dec!(3));
        let chances = SkillUpChanceModel::default();
        let inputs = PlanInputs {
            request: &req,
            recipes: &recipes,
            index: &index,
            prices: PriceBook::new(&vendor, &snap, PriceMode::Min),
            chances: &chances,
            quality_cutoff: 3,
            max_passes: 6,
        };

        let plan = build_plan_result(&inputs, at()).unwrap();
        // 2 crafts * 2 = 4 needed, 3 owned.
        let line = plan.shopping_list.first().unwrap();
        assert_eq!(line.quantity, dec!(1));
        assert_eq!(plan.total_cost, Money(10));
        let used = plan.owned_materials_used.first().unwrap();
        assert_eq!(used.quantity, dec!(3));
    }
}
