//! Planning request and result types.
//!
//! Everything here is created fresh for one planning request and discarded
//! after the result is returned.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{PriceMode, ProducerKind, StepKind};
use crate::ids::{ItemId, ProfessionId, RecipeId};
use crate::market::{PriceSnapshot, RealmKey};
use crate::money::Money;

const fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A request to level one profession from `current_skill` to `target_skill`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlanRequest {
    /// Auction house whose prices are used.
    pub realm: RealmKey,
    /// Profession to level.
    pub profession_id: ProfessionId,
    /// Skill the character has now.
    pub current_skill: u16,
    /// Skill to reach.
    pub target_skill: u16,
    /// Market statistic used as unit price.
    #[serde(default)]
    pub price_mode: PriceMode,
    /// Craft intermediate reagents instead of buying them when cheaper.
    #[serde(default = "default_true")]
    pub use_craft_intermediates: bool,
    /// Allow intermediates crafted by recipes of other professions.
    #[serde(default)]
    pub allow_cross_profession_intermediates: bool,
    /// Allow smelting as an alternative to buying bars.
    #[serde(default = "default_true")]
    pub use_smelt_intermediates: bool,
    /// Materials the player already has, by item.
    #[serde(default)]
    #[ts(type = "Record<number, string>")]
    pub owned_materials: BTreeMap<ItemId, Decimal>,
    /// Recipes the player does not want to use.
    #[serde(default)]
    pub excluded_recipe_ids: BTreeSet<RecipeId>,
}

impl PlanRequest {
    /// A request with default flags, no owned materials and no exclusions.
    pub const fn new(
        realm: RealmKey,
        profession_id: ProfessionId,
        current_skill: u16,
        target_skill: u16,
    ) -> Self {
        Self {
            realm,
            profession_id,
            current_skill,
            target_skill,
            price_mode: PriceMode::Min,
            use_craft_intermediates: true,
            allow_cross_profession_intermediates: false,
            use_smelt_intermediates: true,
            owned_materials: BTreeMap::new(),
            excluded_recipe_ids: BTreeSet::new(),
        }
    }

    /// Whether there is any skill left to gain.
    pub const fn needs_planning(&self) -> bool {
        self.target_skill > self.current_skill
    }
}

// ---------------------------------------------------------------------------
// Result lines
// ---------------------------------------------------------------------------

/// A contiguous run of skill points leveled with one recipe at one chance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlanStep {
    /// First skill of the run.
    pub skill_from: u16,
    /// Skill reached at the end of the run (exclusive upper bound).
    pub skill_to: u16,
    /// Recipe crafted.
    pub recipe_id: RecipeId,
    /// Recipe display name.
    pub recipe_name: String,
    /// Whether a trainer teaches the recipe, when known.
    pub learned_by_trainer: Option<bool>,
    /// Probability of a skill-up per craft.
    #[ts(as = "String")]
    pub skill_up_chance: Decimal,
    /// Expected craft attempts over the whole run.
    #[ts(as = "String")]
    pub expected_crafts: Decimal,
    /// Expected material cost over the whole run.
    pub expected_cost: Money,
    /// Whether the run is part of the main plan or credited from intermediates.
    pub kind: StepKind,
}

/// An item produced internally rather than purchased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct IntermediateLine {
    /// Produced item.
    pub item_id: ItemId,
    /// Units produced.
    #[ts(as = "String")]
    pub quantity: Decimal,
    /// Production method.
    pub kind: ProducerKind,
    /// Name of the recipe or producer used.
    pub producer_name: String,
}

/// One item to buy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ShoppingListLine {
    /// Item to buy.
    pub item_id: ItemId,
    /// Units to buy.
    #[ts(as = "String")]
    pub quantity: Decimal,
    /// Vendor or market price per unit.
    pub unit_price: Money,
    /// `quantity * unit_price`, rounded to whole copper.
    pub line_cost: Money,
}

/// Quantity of an item taken from the player's own stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OwnedMaterialLine {
    /// Owned item.
    pub item_id: ItemId,
    /// Units used.
    #[ts(as = "String")]
    pub quantity: Decimal,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A complete leveling plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlanResult {
    /// Intermediate-credit steps followed by main steps, ordered by skill.
    pub steps: Vec<PlanStep>,
    /// Items produced along the way.
    pub intermediates: Vec<IntermediateLine>,
    /// Items to buy, by item id.
    pub shopping_list: Vec<ShoppingListLine>,
    /// Items taken from the player's stock, by item id.
    pub owned_materials_used: Vec<OwnedMaterialLine>,
    /// Whole skill points gained from intermediate crafts.
    pub skill_credit_applied: u16,
    /// Expected skill-ups from intermediate crafts, including partial ones.
    #[ts(as = "String")]
    pub expected_skill_ups_from_intermediates: Decimal,
    /// Sum of all shopping line costs.
    pub total_cost: Money,
    /// When the plan was computed.
    pub generated_at: DateTime<Utc>,
}

impl PlanResult {
    /// A plan with no steps and no cost.
    pub const fn empty(generated_at: DateTime<Utc>) -> Self {
        Self {
            steps: Vec::new(),
            intermediates: Vec::new(),
            shopping_list: Vec::new(),
            owned_materials_used: Vec::new(),
            skill_credit_applied: 0,
            expected_skill_ups_from_intermediates: Decimal::ZERO,
            total_cost: Money::ZERO,
            generated_at,
        }
    }
}

/// Outcome of a planning request.
///
/// Failures are data: `plan` is `None`, `error_message` says why and
/// `missing_item_ids` lists every item that could not be sourced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlanComputationResult {
    /// The plan, when one was found.
    pub plan: Option<PlanResult>,
    /// Market quotes the plan was priced with.
    pub price_snapshot: PriceSnapshot,
    /// Items with no vendor, producer or market source, sorted.
    pub missing_item_ids: Vec<ItemId>,
    /// Explanation of a failure or a no-op.
    pub error_message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::enums::{GameVersion, Region};

    #[test]
    fn request_defaults_from_json() {
        let json = r#"{
            "realm": { "region": "Us", "game_version": "Era", "realm_slug": "whitemane" },
            "profession_id": 197,
            "current_skill": 1,
            "target_skill": 75
        }"#;
        let req: PlanRequest = serde_json::from_str(json).unwrap();
        let expected = PlanRequest::new(
            RealmKey::new(Region::Us, GameVersion::Era, "whitemane"),
            ProfessionId(197),
            1,
            75,
        );
        assert_eq!(req, expected);
        assert!(req.use_craft_intermediates);
        assert!(req.use_smelt_intermediates);
        assert!(!req.allow_cross_profession_intermediates);
    }

    #[test]
    fn needs_planning_only_when_target_above_current() {
        let realm = RealmKey::new(Region::Us, GameVersion::Era, "whitemane");
        assert!(PlanRequest::new(realm.clone(), ProfessionId(197), 1, 2).needs_planning());
        assert!(!PlanRequest::new(realm.clone(), ProfessionId(197), 5, 5).needs_planning());
        assert!(!PlanRequest::new(realm, ProfessionId(197), 6, 5).needs_planning());
    }
}
