//! Leveling plan optimization for crafting professions.
//!
//! Given a profession, a skill range, realm prices and a catalog, this
//! crate finds the cheapest expected sequence of recipes to level through
//! the range and the shopping list that feeds it. Reagents are priced
//! recursively: an item can be bought from a vendor, bought on the market,
//! crafted, or smelted, whichever is cheapest at the player's skill.
//!
//! # Modules
//!
//! - [`cancel`] -- Cooperative cancellation token checked around fetches.
//! - [`chance`] -- Skill-up probability per difficulty color.
//! - [`config`] -- Configuration loading from `craftplan.yaml`.
//! - [`credit`] -- Skill credit from crafting intermediates.
//! - [`error`] -- [`PlannerError`] and [`SourceError`].
//! - [`expand`] -- Shopping expansion and intermediate tracking.
//! - [`index`] -- Craft and smelt producers by output item.
//! - [`orchestrator`] -- Planning passes and the convergence loop.
//! - [`owned`] -- Player-owned material allocation.
//! - [`resolver`] -- Memoized recursive unit cost resolution.
//! - [`selector`] -- Per-skill recipe selection and step merging.
//! - [`service`] -- [`PlannerService`], the async entry point.
//! - [`sources`] -- Collaborator ports and in-memory implementations.
//!
//! [`PlannerError`]: error::PlannerError
//! [`SourceError`]: error::SourceError
//! [`PlannerService`]: service::PlannerService

pub mod cancel;
pub mod chance;
pub mod config;
pub mod credit;
pub mod error;
pub mod expand;
pub mod index;
pub mod orchestrator;
pub mod owned;
pub mod resolver;
pub mod selector;
pub mod service;
pub mod sources;

pub use cancel::CancelToken;
pub use config::PlannerConfig;
pub use error::{PlannerError, SourceError};
pub use service::PlannerService;
pub use sources::{
    InMemoryCatalog, MarketPriceSource, ProducerSource, RecipeSource, StaticMarket,
    VendorPriceSource,
};
