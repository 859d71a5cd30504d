//! The planning entry point.
//!
//! [`PlannerService::build_plan`] gathers everything a request needs from
//! the collaborators, then hands the data to the synchronous orchestrator.
//! Fetches are the only suspension points and the only places a
//! [`CancelToken`] is honored.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use craftplan_types::{
    ItemId, Money, PlanComputationResult, PlanRequest, PlanResult, PriceSnapshot, Producer,
    ProducerKind, Recipe,
};
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::chance::SkillUpChanceModel;
use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::index::ProducerIndex;
use crate::orchestrator::{PlanInputs, build_plan_result};
use crate::resolver::PriceBook;
use crate::sources::{MarketPriceSource, ProducerSource, RecipeSource, VendorPriceSource};

/// Builds leveling plans from four collaborators.
///
/// The service holds no per-request state. Concurrent calls share only the
/// collaborators and the read-only configuration.
#[derive(Debug, Clone)]
pub struct PlannerService<R, V, M, P> {
    recipes: R,
    vendors: V,
    market: M,
    producers: P,
    config: PlannerConfig,
    chances: SkillUpChanceModel,
    clock: fn() -> DateTime<Utc>,
}

impl<R, V, M, P> PlannerService<R, V, M, P>
where
    R: RecipeSource,
    V: VendorPriceSource,
    M: MarketPriceSource,
    P: ProducerSource,
{
    /// Create a service. Fails if `config` does not validate.
    pub fn new(
        recipes: R,
        vendors: V,
        market: M,
        producers: P,
        config: PlannerConfig,
    ) -> Result<Self, PlannerError> {
        config.validate()?;
        Ok(Self {
            recipes,
            vendors,
            market,
            producers,
            chances: SkillUpChanceModel::new(config.chances),
            config,
            clock: Utc::now,
        })
    }

    /// Replace the clock that stamps `generated_at`.
    #[must_use]
    pub const fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// The active configuration.
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan `request`.
    ///
    /// Returns `Err` only when `cancel` fires at a fetch boundary. Every
    /// other failure is reported inside the [`PlanComputationResult`].
    #[allow(clippy::too_many_lines)]
    pub async fn build_plan(
        &self,
        request: &PlanRequest,
        cancel: &CancelToken,
    ) -> Result<PlanComputationResult, PlannerError> {
        let now = (self.clock)();
        let version = request.realm.game_version;

        if !request.needs_planning() {
            return Ok(PlanComputationResult {
                plan: Some(PlanResult::empty(now)),
                price_snapshot: PriceSnapshot::unavailable(
                    request.realm.clone(),
                    now,
                    Some(String::from("No planning needed (target <= current).")),
                ),
                missing_item_ids: Vec::new(),
                error_message: None,
            });
        }

        info!(
            realm = %request.realm,
            profession = %request.profession_id,
            current = request.current_skill,
            target = request.target_skill,
            "building plan"
        );

        cancel.check()?;
        let mut recipes = match self.recipes.recipes(version, request.profession_id).await {
            Ok(recipes) => recipes,
            Err(e) => return Ok(failure(request, now, None, Vec::new(), e.to_string())),
        };
        cancel.check()?;

        if recipes.is_empty() {
            return Ok(failure(
                request,
                now,
                None,
                Vec::new(),
                format!(
                    "No recipes found for professionId={} ({version:?}).",
                    request.profession_id
                ),
            ));
        }

        if request.allow_cross_profession_intermediates {
            recipes.extend(self.other_profession_recipes(request).await);
            cancel.check()?;
        }

        recipes.retain(|r| !request.excluded_recipe_ids.contains(&r.recipe_id));
        if !recipes.iter().any(|r| r.profession_id == request.profession_id) {
            return Ok(failure(
                request,
                now,
                None,
                Vec::new(),
                format!(
                    "No recipes remain for professionId={} after exclusions.",
                    request.profession_id
                ),
            ));
        }
        recipes.sort_by(|a, b| a.recipe_id.cmp(&b.recipe_id));

        let (vendor_prices, producers) =
            tokio::join!(self.fetch_vendor_prices(request), self.fetch_producers(request));
        cancel.check()?;

        let market_items = market_items(&recipes, &producers, &vendor_prices);
        let snapshot = match self
            .market
            .prices(&request.realm, &market_items, request.price_mode)
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(realm = %request.realm, error = %e, "market prices unavailable");
                PriceSnapshot::unavailable(request.realm.clone(), now, Some(e.to_string()))
            }
        };
        cancel.check()?;

        let index = ProducerIndex::build(&recipes, &producers);
        debug!(
            recipes = recipes.len(),
            craftable = index.craftable_items(),
            quotes = snapshot.prices.len(),
            "planning inputs ready"
        );
        let inputs = PlanInputs {
            request,
            recipes: &recipes,
            index: &index,
            prices: PriceBook::new(&vendor_prices, &snapshot, request.price_mode),
            chances: &self.chances,
            quality_cutoff: self.config.quality_cutoff,
            max_passes: self.config.max_convergence_passes,
        };

        match build_plan_result(&inputs, now) {
            Ok(plan) => {
                info!(
                    steps = plan.steps.len(),
                    credit = plan.skill_credit_applied,
                    total = %plan.total_cost,
                    total_gold = %plan.total_cost.to_gold(),
                    "plan built"
                );
                Ok(PlanComputationResult {
                    plan: Some(plan),
                    price_snapshot: snapshot,
                    missing_item_ids: Vec::new(),
                    error_message: None,
                })
            }
            Err(failed) => {
                info!(skill = failed.skill, missing = failed.missing.len(), "no plan");
                let message = failed.to_string();
                Ok(failure(request, now, Some(snapshot), failed.missing, message))
            }
        }
    }

    /// Recipes of every other profession, for cross-profession
    /// intermediates. Failures degrade to fewer recipes.
    async fn other_profession_recipes(&self, request: &PlanRequest) -> Vec<Recipe> {
        let version = request.realm.game_version;
        let professions = match self.recipes.professions(version).await {
            Ok(professions) => professions,
            Err(e) => {
                warn!(error = %e, "professions unavailable; cross-profession intermediates skipped");
                return Vec::new();
            }
        };

        let mut recipes = Vec::new();
        for profession in professions
            .iter()
            .filter(|p| p.profession_id != request.profession_id)
        {
            match self.recipes.recipes(version, profession.profession_id).await {
                Ok(found) => recipes.extend(found),
                Err(e) => {
                    warn!(profession = %profession.profession_id, error = %e, "recipes unavailable");
                }
            }
        }
        recipes
    }

    async fn fetch_vendor_prices(&self, request: &PlanRequest) -> BTreeMap<ItemId, Money> {
        match self.vendors.vendor_prices(request.realm.game_version).await {
            Ok(prices) => prices,
            Err(e) => {
                warn!(error = %e, "vendor prices unavailable");
                BTreeMap::new()
            }
        }
    }

    async fn fetch_producers(&self, request: &PlanRequest) -> Vec<Producer> {
        if !request.use_smelt_intermediates {
            return Vec::new();
        }
        match self.producers.producers(request.realm.game_version).await {
            Ok(mut producers) => {
                producers.retain(|p| p.kind == ProducerKind::Smelt);
                producers.sort_by(|a, b| a.producer_id.cmp(&b.producer_id));
                producers
            }
            Err(e) => {
                warn!(error = %e, "producers unavailable");
                Vec::new()
            }
        }
    }
}

/// Every item a plan could price on the market: reagents and outputs of
/// recipes and producers, minus vendor items. Sorted.
fn market_items(
    recipes: &[Recipe],
    producers: &[Producer],
    vendor_prices: &BTreeMap<ItemId, Money>,
) -> Vec<ItemId> {
    let mut items = BTreeSet::new();
    for recipe in recipes {
        items.extend(recipe.reagents.iter().map(|r| r.item_id));
        items.extend(recipe.output.iter().map(|o| o.item_id));
    }
    for producer in producers {
        items.extend(producer.reagents.iter().map(|r| r.item_id));
        items.insert(producer.output.item_id);
    }
    items
        .into_iter()
        .filter(|item| !vendor_prices.contains_key(item))
        .collect()
}

fn failure(
    request: &PlanRequest,
    now: DateTime<Utc>,
    snapshot: Option<PriceSnapshot>,
    missing_item_ids: Vec<ItemId>,
    message: String,
) -> PlanComputationResult {
    PlanComputationResult {
        plan: None,
        price_snapshot: snapshot
            .unwrap_or_else(|| PriceSnapshot::unavailable(request.realm.clone(), now, None)),
        missing_item_ids,
        error_message: Some(message),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use craftplan_types::{Reagent, RecipeId, RecipeOutput};

    use super::*;

    #[test]
    fn market_items_skip_vendor_goods() {
        let recipe = Recipe {
            recipe_id: RecipeId::from("r"),
            profession_id: craftplan_types::ProfessionId(1),
            name: String::from("r"),
            min_skill: 1,
            orange_until: 10,
            yellow_until: 20,
            green_until: 30,
            gray_at: 40,
            reagents: vec![Reagent::new(ItemId(3), 1), Reagent::new(ItemId(1), 2)],
            output: Some(RecipeOutput::new(ItemId(9), 1)),
            learned_by_trainer: None,
            cooldown_seconds: None,
            output_quality: None,
        };
        let vendor = BTreeMap::from([(ItemId(1), Money(5))]);

        let items = market_items(&[recipe], &[], &vendor);
        assert_eq!(items, vec![ItemId(3), ItemId(9)]);
    }
}
