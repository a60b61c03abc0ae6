//! Token module: the logical content of one grid cell.
//!
//! This module provides:
//! - [`TokenId`]: Stable identity that travels with a token when it is swapped or compacted
//! - [`TokenState`]: The per-token lifecycle that gates eligibility
//! - [`Token`]: Attribute, evaluation mark, status effects and pending move order
//!
//! # Lifecycle
//!
//! ```text
//! Usual ──select──▶ Selected ──release/swap──▶ Usual
//!   │                  │
//!   └────vanish────────┴──▶ Vanishing ──finish_vanish──▶ Idle
//!                                                         │
//!   Usual ◀──finish_move── Moving ◀──respawn + move order─┘
//! ```
//!
//! # Example
//!
//! ```
//! use chainfall_core::attribute::Attribute;
//! use chainfall_core::token::{Token, TokenId, TokenState};
//!
//! let token = Token::new(TokenId::new(0), Attribute::Fire);
//! assert_eq!(token.state(), TokenState::Usual);
//! assert!(token.can_select());
//! ```

pub mod status;

use std::fmt;

use glam::{IVec2, UVec2};
use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;

pub use status::{InvisibleRule, RemapPolicy, StatusEffect, StatusFlags};

/// Stable identifier for a token.
///
/// Assigned once at board construction. Swaps and compaction move tokens
/// between slots, so the identifier follows the token rather than the slot.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(u32);

impl TokenId {
    /// Creates a new `TokenId` from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({})", self.0)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Logical state of a token.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenState {
    /// Not present; awaiting refill. The attribute is meaningless.
    Idle,
    /// Resting on the board.
    Usual,
    /// The single token chosen by the player.
    Selected,
    /// Removal in progress.
    Vanishing,
    /// Travelling to its slot after a refill.
    Moving,
}

impl fmt::Display for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Usual => write!(f, "Usual"),
            Self::Selected => write!(f, "Selected"),
            Self::Vanishing => write!(f, "Vanishing"),
            Self::Moving => write!(f, "Moving"),
        }
    }
}

/// A move command issued after compaction.
///
/// `from` is signed because respawned tokens enter from above the board.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveOrder {
    /// Where the token starts, in board coordinates.
    pub from: IVec2,
    /// The slot it settles into.
    pub to: UVec2,
}

impl MoveOrder {
    /// Returns true if the token does not change position.
    #[must_use]
    pub fn is_stationary(&self) -> bool {
        self.from == self.to.as_ivec2()
    }
}

/// A single grid cell's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    id: TokenId,
    attribute: Attribute,
    state: TokenState,
    evaluated: bool,
    effects: Vec<StatusEffect>,
    move_order: Option<MoveOrder>,
}

impl Token {
    /// Creates a resting token with the given attribute.
    #[must_use]
    pub fn new(id: TokenId, attribute: Attribute) -> Self {
        Self {
            id,
            attribute,
            state: TokenState::Usual,
            evaluated: false,
            effects: Vec::new(),
            move_order: None,
        }
    }

    /// Creates an empty slot awaiting refill.
    #[must_use]
    pub fn idle(id: TokenId) -> Self {
        Self {
            state: TokenState::Idle,
            ..Self::new(id, Attribute::Fire)
        }
    }

    /// Returns the token's identity.
    #[must_use]
    pub const fn id(&self) -> TokenId {
        self.id
    }

    /// Returns the attribute. Meaningless while the token is idle.
    #[must_use]
    pub const fn attribute(&self) -> Attribute {
        self.attribute
    }

    /// Returns the attribute as the presentation layer may show it.
    ///
    /// `None` while idle or invisible.
    #[must_use]
    pub fn visible_attribute(&self) -> Option<Attribute> {
        if self.is_idle() || self.is_invisible() {
            None
        } else {
            Some(self.attribute)
        }
    }

    /// Returns the logical state.
    #[must_use]
    pub const fn state(&self) -> TokenState {
        self.state
    }

    /// Returns true if the slot is empty.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == TokenState::Idle
    }

    /// Returns the evaluation mark of the current connectivity scan.
    #[must_use]
    pub const fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    /// Returns the active status effects.
    #[must_use]
    pub fn effects(&self) -> &[StatusEffect] {
        &self.effects
    }

    /// Returns the active status effects as flags.
    #[must_use]
    pub fn status_flags(&self) -> StatusFlags {
        self.effects
            .iter()
            .fold(StatusFlags::empty(), |flags, effect| flags | effect.flag())
    }

    /// Returns true if the token cannot connect.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.status_flags().contains(StatusFlags::FROZEN)
    }

    /// Returns true if the token cannot be selected or swapped.
    #[must_use]
    pub fn is_paralyzed(&self) -> bool {
        self.status_flags().contains(StatusFlags::PARALYZED)
    }

    /// Returns true if the token's attribute is hidden.
    #[must_use]
    pub fn is_invisible(&self) -> bool {
        self.status_flags().contains(StatusFlags::INVISIBLE)
    }

    /// Returns the last move order, if one was issued since the token last vanished.
    #[must_use]
    pub const fn move_order(&self) -> Option<MoveOrder> {
        self.move_order
    }

    // -------------------------------------------------------------------------
    // Eligibility
    // -------------------------------------------------------------------------

    /// True iff not paralyzed and resting.
    #[must_use]
    pub fn can_select(&self) -> bool {
        !self.is_paralyzed() && self.state == TokenState::Usual
    }

    /// True iff present and not paralyzed. Frozen tokens can still be swapped.
    #[must_use]
    pub fn can_swap(&self) -> bool {
        !self.is_idle() && !self.is_paralyzed()
    }

    /// True iff neither token is frozen or idle and both share an attribute.
    ///
    /// Symmetric: `a.can_connect(b) == b.can_connect(a)`.
    #[must_use]
    pub fn can_connect(&self, other: &Token) -> bool {
        !self.is_frozen()
            && !other.is_frozen()
            && !self.is_idle()
            && !other.is_idle()
            && self.attribute == other.attribute
    }

    /// True iff the token is resting or selected.
    #[must_use]
    pub fn can_to_vanish(&self) -> bool {
        matches!(self.state, TokenState::Usual | TokenState::Selected)
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    pub(crate) fn set_evaluated(&mut self, evaluated: bool) {
        self.evaluated = evaluated;
    }

    pub(crate) fn set_attribute(&mut self, attribute: Attribute) {
        self.attribute = attribute;
    }

    pub(crate) fn select(&mut self) {
        debug_assert_eq!(self.state, TokenState::Usual);
        self.state = TokenState::Selected;
    }

    pub(crate) fn deselect(&mut self) {
        if self.state == TokenState::Selected {
            self.state = TokenState::Usual;
        }
    }

    /// Starts removal. Returns false if the token cannot vanish.
    pub(crate) fn begin_vanish(&mut self) -> bool {
        if !self.can_to_vanish() {
            return false;
        }
        self.state = TokenState::Vanishing;
        true
    }

    /// Completes removal, leaving an empty slot.
    ///
    /// Returns false if the token was not vanishing.
    pub fn finish_vanish(&mut self) -> bool {
        if self.state != TokenState::Vanishing {
            return false;
        }
        self.state = TokenState::Idle;
        self.move_order = None;
        true
    }

    /// Issues a move order. Idle tokens must be respawned first.
    pub(crate) fn order_move(&mut self, order: MoveOrder) {
        debug_assert!(!self.is_idle(), "move order issued to an idle token");
        self.state = TokenState::Moving;
        self.move_order = Some(order);
    }

    /// Completes a move, returning the token to rest.
    ///
    /// Returns false if the token was not moving.
    pub fn finish_move(&mut self) -> bool {
        if self.state != TokenState::Moving {
            return false;
        }
        self.state = TokenState::Usual;
        true
    }

    /// Refills an empty slot with a fresh attribute and no effects.
    pub(crate) fn respawn(&mut self, attribute: Attribute) {
        self.attribute = attribute;
        self.state = TokenState::Usual;
        self.evaluated = false;
        self.effects.clear();
        self.move_order = None;
    }

    // -------------------------------------------------------------------------
    // Status effects
    // -------------------------------------------------------------------------

    /// Applies an effect, refreshing the timer if one of the same kind is active.
    pub(crate) fn apply_effect(&mut self, effect: StatusEffect, rule: &InvisibleRule) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.flag() == effect.flag()) {
            *existing = match (*existing, effect) {
                (
                    StatusEffect::Invisible { masked, .. },
                    StatusEffect::Invisible { remaining, .. },
                ) => StatusEffect::Invisible { remaining, masked },
                _ => effect,
            };
            return;
        }

        let effect = match effect {
            StatusEffect::Invisible { remaining, .. } if self.attribute == rule.special => {
                self.attribute = rule.replacement;
                StatusEffect::Invisible {
                    remaining,
                    masked: Some(rule.special),
                }
            }
            other => other,
        };
        self.effects.push(effect);
    }

    /// Ages every effect by one tick and drops the expired ones.
    ///
    /// Returns the number of effects that expired.
    pub(crate) fn age_effects(&mut self, rule: &InvisibleRule) -> usize {
        let mut expired = Vec::new();
        self.effects.retain_mut(|effect| {
            if effect.age() {
                expired.push(*effect);
                false
            } else {
                true
            }
        });
        for effect in &expired {
            self.on_effect_removed(effect, rule);
        }
        expired.len()
    }

    /// Removes all effects. Returns true if any were active.
    pub(crate) fn cure(&mut self, rule: &InvisibleRule) -> bool {
        if self.effects.is_empty() {
            return false;
        }
        let removed = std::mem::take(&mut self.effects);
        for effect in &removed {
            self.on_effect_removed(effect, rule);
        }
        true
    }

    fn on_effect_removed(&mut self, effect: &StatusEffect, rule: &InvisibleRule) {
        if let StatusEffect::Invisible {
            masked: Some(original),
            ..
        } = effect
        {
            if rule.policy == RemapPolicy::RevertOnExpiry && self.attribute == rule.replacement {
                self.attribute = *original;
            }
        }
    }
}
