//! Token attributes.
//!
//! Every present token is tagged with one of seven attributes. Embedders may
//! restrict play to the first `N` attributes through
//! [`Rules::attribute_count`](crate::rules::Rules::attribute_count).

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Attribute identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Attribute {
    /// Fire
    Fire = 0,
    /// Water
    Water = 1,
    /// Wood
    Wood = 2,
    /// Thunder
    Thunder = 3,
    /// Light
    Light = 4,
    /// Dark
    Dark = 5,
    /// Heart (recovery)
    Heart = 6,
}

impl Attribute {
    /// Total number of attributes.
    pub const COUNT: usize = 7;

    /// All attributes in index order.
    pub const ALL: [Attribute; Self::COUNT] = [
        Attribute::Fire,
        Attribute::Water,
        Attribute::Wood,
        Attribute::Thunder,
        Attribute::Light,
        Attribute::Dark,
        Attribute::Heart,
    ];

    /// Get the index of this attribute.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up an attribute by index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Draw an attribute uniformly from the first `count` attributes.
    ///
    /// `count` is clamped to `1..=COUNT`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Self {
        let count = count.clamp(1, Self::COUNT);
        Self::ALL[rng.gen_range(0..count)]
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fire => write!(f, "Fire"),
            Self::Water => write!(f, "Water"),
            Self::Wood => write!(f, "Wood"),
            Self::Thunder => write!(f, "Thunder"),
            Self::Light => write!(f, "Light"),
            Self::Dark => write!(f, "Dark"),
            Self::Heart => write!(f, "Heart"),
        }
    }
}
