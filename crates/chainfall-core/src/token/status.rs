//! Status effects carried by tokens.
//!
//! Effects are a tagged variant with a timer per variant. [`StatusFlags`] is the
//! cheap query view derived from the active effects.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;

bitflags! {
    /// Set of active status effects on a token.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StatusFlags: u8 {
        /// Token cannot connect to neighbours.
        const FROZEN = 1 << 0;
        /// Token cannot be selected or swapped.
        const PARALYZED = 1 << 1;
        /// Token attribute is hidden from presentation.
        const INVISIBLE = 1 << 2;
    }
}

/// A timed status effect.
///
/// `remaining` counts ticks left; `None` lasts until cured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusEffect {
    /// Blocks connectivity.
    Frozen {
        /// Ticks left.
        remaining: Option<u32>,
    },
    /// Blocks selection and swapping.
    Paralyzed {
        /// Ticks left.
        remaining: Option<u32>,
    },
    /// Hides attribute identity.
    Invisible {
        /// Ticks left.
        remaining: Option<u32>,
        /// Attribute replaced when the effect was applied, if any.
        masked: Option<Attribute>,
    },
}

impl StatusEffect {
    /// A freeze lasting `remaining` ticks.
    #[must_use]
    pub const fn frozen(remaining: Option<u32>) -> Self {
        Self::Frozen { remaining }
    }

    /// A paralysis lasting `remaining` ticks.
    #[must_use]
    pub const fn paralyzed(remaining: Option<u32>) -> Self {
        Self::Paralyzed { remaining }
    }

    /// An invisibility lasting `remaining` ticks.
    #[must_use]
    pub const fn invisible(remaining: Option<u32>) -> Self {
        Self::Invisible {
            remaining,
            masked: None,
        }
    }

    /// The flag identifying this effect's kind.
    #[must_use]
    pub const fn flag(&self) -> StatusFlags {
        match self {
            Self::Frozen { .. } => StatusFlags::FROZEN,
            Self::Paralyzed { .. } => StatusFlags::PARALYZED,
            Self::Invisible { .. } => StatusFlags::INVISIBLE,
        }
    }

    /// Ticks left, or `None` when the effect never expires on its own.
    #[must_use]
    pub const fn remaining(&self) -> Option<u32> {
        match self {
            Self::Frozen { remaining }
            | Self::Paralyzed { remaining }
            | Self::Invisible { remaining, .. } => *remaining,
        }
    }

    fn remaining_mut(&mut self) -> &mut Option<u32> {
        match self {
            Self::Frozen { remaining }
            | Self::Paralyzed { remaining }
            | Self::Invisible { remaining, .. } => remaining,
        }
    }

    /// Ages the effect by one tick. Returns `true` once it has expired.
    pub fn age(&mut self) -> bool {
        match self.remaining_mut() {
            None => false,
            Some(0) => true,
            Some(ticks) => {
                *ticks -= 1;
                *ticks == 0
            }
        }
    }
}

/// What happens to a remapped attribute when invisibility ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemapPolicy {
    /// The replacement attribute stays after the effect ends.
    #[default]
    Permanent,
    /// The original attribute is restored when the effect expires or is cured,
    /// provided the token still holds the replacement.
    RevertOnExpiry,
}

/// Attribute remapping applied when a token turns invisible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvisibleRule {
    /// Attribute that gets remapped.
    pub special: Attribute,
    /// Attribute it becomes.
    pub replacement: Attribute,
    /// Whether the remap survives the effect.
    pub policy: RemapPolicy,
}

impl Default for InvisibleRule {
    fn default() -> Self {
        Self {
            special: Attribute::Heart,
            replacement: Attribute::Dark,
            policy: RemapPolicy::Permanent,
        }
    }
}
