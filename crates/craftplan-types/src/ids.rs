//! Type-safe identifier wrappers for catalog entities.
//!
//! Item and profession ids are the numeric ids used by the game data packs.
//! Recipe ids are stable strings whose identity ignores ASCII case, so a
//! catalog written as `"Bolt-Of-Linen"` and an exclusion list entry written
//! as `"bolt-of-linen"` name the same recipe.

use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around a numeric game id with standard derives.
macro_rules! define_numeric_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u32);

        impl $name {
            /// Return the raw numeric id.
            pub const fn into_inner(self) -> u32 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_numeric_id! {
    /// Game item identifier (reagents, crafted outputs, bars, cloth...).
    ItemId
}

define_numeric_id! {
    /// Game profession identifier (e.g. 197 for Tailoring).
    ProfessionId
}

// ---------------------------------------------------------------------------
// RecipeId
// ---------------------------------------------------------------------------

/// Stable recipe identifier.
///
/// Equality, ordering and hashing ignore ASCII case. The original spelling
/// is preserved for display and serialization.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RecipeId(String);

impl RecipeId {
    /// Create a recipe id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as originally spelled.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return whether the id is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn folded(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.bytes().map(|b| b.to_ascii_lowercase())
    }
}

impl PartialEq for RecipeId {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for RecipeId {}

impl PartialOrd for RecipeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecipeId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(other.folded())
    }
}

impl Hash for RecipeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.folded() {
            state.write_u8(b);
        }
        state.write_u8(0xff);
    }
}

impl core::fmt::Display for RecipeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecipeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecipeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// ProducerId
// ---------------------------------------------------------------------------

/// Identifier of a non-recipe producer such as a smelting entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProducerId(pub String);

impl core::fmt::Display for ProducerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProducerId {
    fn from(id: &str) -> Self {
        Self(String::from(id))
    }
}
