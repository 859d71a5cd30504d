//! Exact currency amounts in copper.
//!
//! All planner economics are carried in whole copper. Any operation that
//! would produce a fractional amount (dividing by a skill-up chance,
//! multiplying by an expected quantity) rounds to the nearest copper with
//! ties away from zero. Arithmetic saturates at the `i64` bounds instead of
//! wrapping.
//!
//! # Display
//!
//! `Money` renders the way players read prices: `35c`, `1s 5c`, `12g 34s`.
//! Amounts of one gold or more are rounded up to the next silver.

use core::iter::Sum;
use core::ops::{Add, AddAssign, Sub};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Copper per silver.
const COPPER_PER_SILVER: u64 = 100;

/// Copper per gold.
const COPPER_PER_GOLD: u64 = 10_000;

/// An exact count of copper, the smallest currency unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct Money(pub i64);

impl Money {
    /// Zero copper.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw copper amount.
    pub const fn from_copper(copper: i64) -> Self {
        Self(copper)
    }

    /// Return the raw copper amount.
    pub const fn copper(self) -> i64 {
        self.0
    }

    /// Round a fractional copper amount to whole copper.
    ///
    /// Ties round away from zero (`2.5 -> 3`, `-2.5 -> -3`). Values beyond
    /// the `i64` range saturate.
    pub fn from_copper_decimal(copper: Decimal) -> Self {
        let rounded = copper.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        rounded.to_i64().map_or_else(
            || {
                if rounded.is_sign_negative() {
                    Self(i64::MIN)
                } else {
                    Self(i64::MAX)
                }
            },
            Self,
        )
    }

    /// Cost of `quantity` units at this unit price, rounded to whole copper.
    pub fn mul_quantity(self, quantity: Decimal) -> Self {
        Self::from_copper_decimal(Decimal::from(self.0).saturating_mul(quantity))
    }

    /// Cost of `count` whole units at this unit price.
    pub fn mul_count(self, count: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(count)))
    }

    /// Divide by a probability or a batch size, rounded to whole copper.
    ///
    /// Returns `None` when `divisor` is zero.
    pub fn div_decimal(self, divisor: Decimal) -> Option<Self> {
        Decimal::from(self.0)
            .checked_div(divisor)
            .map(Self::from_copper_decimal)
    }

    /// Value in gold as an exact decimal (`12345c -> 1.2345`).
    pub fn to_gold(self) -> Decimal {
        Decimal::new(self.0, 4)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let copper = self.0.unsigned_abs();

        if copper == 0 {
            return f.write_str("0c");
        }

        if copper >= COPPER_PER_GOLD {
            let rounded = copper
                .div_ceil(COPPER_PER_SILVER)
                .saturating_mul(COPPER_PER_SILVER);
            let gold = rounded / COPPER_PER_GOLD;
            let silver = (rounded % COPPER_PER_GOLD) / COPPER_PER_SILVER;
            return if silver == 0 {
                write!(f, "{sign}{gold}g")
            } else {
                write!(f, "{sign}{gold}g {silver}s")
            };
        }

        let silver = copper / COPPER_PER_SILVER;
        let rest = copper % COPPER_PER_SILVER;
        match (silver, rest) {
            (0, c) => write!(f, "{sign}{c}c"),
            (s, 0) => write!(f, "{sign}{s}s"),
            (s, c) => write!(f, "{sign}{s}s {c}c"),
        }
    }
}
