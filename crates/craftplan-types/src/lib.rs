//! Shared type definitions for the craft leveling planner.
//!
//! This crate holds the data model only: identifiers, money, catalog
//! entries, market quotes and the planning request/result types. It does no
//! I/O and no planning. Types flow downstream to `TypeScript` via `ts-rs`
//! for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Typed item, profession, recipe and producer identifiers
//! - [`money`] -- Exact copper amounts with away-from-zero rounding
//! - [`enums`] -- Difficulty colors, price modes, producer kinds, realms
//! - [`catalog`] -- Recipes, reagents, producers and their invariants
//! - [`market`] -- Realm keys, price quotes and price snapshots
//! - [`plan`] -- Planning request, plan steps, shopping list and results

pub mod catalog;
pub mod enums;
pub mod ids;
pub mod market;
pub mod money;
pub mod plan;

// Re-export all public types at crate root for convenience.
pub use catalog::{
    CatalogError, DEFAULT_QUALITY_CUTOFF, Producer, Profession, Reagent, Recipe, RecipeOutput,
};
pub use enums::{DifficultyColor, GameVersion, PriceMode, ProducerKind, Region, StepKind};
pub use ids::{ItemId, ProducerId, ProfessionId, RecipeId};
pub use market::{PriceSnapshot, PriceSummary, RealmKey};
pub use money::Money;
pub use plan::{
    IntermediateLine, OwnedMaterialLine, PlanComputationResult, PlanRequest, PlanResult, PlanStep,
    ShoppingListLine,
};
