//! Enumeration types shared by the catalog, market and plan models.
//!
//! All enums derive `Serialize`, `Deserialize`, and `TS` so the dashboard
//! can consume them as TypeScript unions.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Difficulty band of a recipe relative to the crafter's current skill.
///
/// The band determines the chance that one craft attempt grants a skill-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum DifficultyColor {
    /// Guaranteed skill-up.
    Orange,
    /// Likely skill-up.
    Yellow,
    /// Unlikely skill-up.
    Green,
    /// No skill-up; the recipe is trivial (or not yet learnable).
    Gray,
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// Which market statistic is used as the unit price of an item.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum PriceMode {
    /// Lowest current buyout.
    #[default]
    Min,
    /// Median buyout, falling back to the minimum when no median is known.
    Median,
}

// ---------------------------------------------------------------------------
// Producers
// ---------------------------------------------------------------------------

/// How an intermediate item is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ProducerKind {
    /// Crafted from a profession recipe.
    Craft,
    /// Smelted from ore (no recipe, no skill-up in the planned profession).
    Smelt,
}

impl core::fmt::Display for ProducerKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Craft => f.write_str("craft"),
            Self::Smelt => f.write_str("smelt"),
        }
    }
}

// ---------------------------------------------------------------------------
// Realms
// ---------------------------------------------------------------------------

/// Game region hosting a realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Region {
    /// North America and Oceania.
    Us,
    /// Europe.
    Eu,
    /// Korea.
    Kr,
    /// Taiwan.
    Tw,
}

impl Region {
    /// Lowercase slug used in realm keys.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Eu => "eu",
            Self::Kr => "kr",
            Self::Tw => "tw",
        }
    }
}

/// Game client flavour. Each version carries its own catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum GameVersion {
    /// Classic era realms.
    Era,
    /// Classic hardcore realms.
    Hardcore,
    /// Anniversary realms.
    Anniversary,
    /// The Burning Crusade classic.
    Tbc,
    /// Wrath of the Lich King classic.
    Wotlk,
}

impl GameVersion {
    /// Lowercase slug used in realm keys.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Era => "era",
            Self::Hardcore => "hardcore",
            Self::Anniversary => "anniversary",
            Self::Tbc => "tbc",
            Self::Wotlk => "wotlk",
        }
    }
}

// ---------------------------------------------------------------------------
// Plan steps
// ---------------------------------------------------------------------------

/// Origin of a plan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum StepKind {
    /// Skill gained while crafting intermediates needed by later steps.
    IntermediateCredit,
    /// A regular leveling step of the main plan.
    Leveling,
}
