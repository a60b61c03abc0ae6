//! Chain score bookkeeping and the listener seam to the combat layer.
//!
//! [`ChainScore`] accumulates one cascade run: how many chains fired and how
//! many tokens of each attribute vanished. The cascade pushes it to a
//! [`ChainListener`] at every refill boundary.
//!
//! # Example
//!
//! ```
//! use chainfall_core::attribute::Attribute;
//! use chainfall_core::score::ChainScore;
//!
//! let mut score = ChainScore::new();
//! score.record_vanish(Attribute::Fire, 4);
//! score.record_chain();
//!
//! assert_eq!(score.chain_count(), 1);
//! assert_eq!(score.vanish_count(Attribute::Fire), 4);
//! ```

use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;

/// Accumulated result of one cascade run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainScore {
    chain_count: u32,
    vanish_counts: [u32; Attribute::COUNT],
    group_count: u32,
}

impl ChainScore {
    /// Creates an empty score.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Records one qualifying group.
    #[allow(clippy::cast_possible_truncation)]
    pub fn record_vanish(&mut self, attribute: Attribute, count: usize) {
        self.vanish_counts[attribute.index()] += count as u32;
        self.group_count += 1;
    }

    /// Records one chain (a vanish pass that removed at least one group).
    pub fn record_chain(&mut self) {
        self.chain_count += 1;
    }

    /// Number of chains in this run.
    #[must_use]
    pub const fn chain_count(&self) -> u32 {
        self.chain_count
    }

    /// Tokens of `attribute` vanished in this run.
    #[must_use]
    pub const fn vanish_count(&self, attribute: Attribute) -> u32 {
        self.vanish_counts[attribute.index()]
    }

    /// Per-attribute vanish counts, indexed by [`Attribute::index`].
    #[must_use]
    pub const fn vanish_counts(&self) -> &[u32; Attribute::COUNT] {
        &self.vanish_counts
    }

    /// Number of qualifying groups in this run.
    #[must_use]
    pub const fn group_count(&self) -> u32 {
        self.group_count
    }

    /// Total tokens vanished in this run.
    #[must_use]
    pub fn total_vanished(&self) -> u32 {
        self.vanish_counts.iter().sum()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain_count == 0 && self.group_count == 0
    }
}

/// Receives chain results from a running cascade.
///
/// This is the injection point for the combat layer. The engine owns one
/// boxed listener; embedders swap it with
/// [`PuzzleEngine::set_listener`](crate::engine::PuzzleEngine::set_listener).
///
/// # Example
///
/// ```
/// use chainfall_core::score::{ChainListener, ChainScore};
///
/// #[derive(Default)]
/// struct ManaPool {
///     mana: u32,
/// }
///
/// impl ChainListener for ManaPool {
///     fn on_vanish_batch(&mut self, score: &ChainScore) {
///         self.mana = score.total_vanished() * score.chain_count();
///     }
/// }
/// ```
pub trait ChainListener {
    /// Called once per refill entry with the score so far.
    fn on_vanish_batch(&mut self, score: &ChainScore);

    /// Called when the embedder ends a finished cascade, before the score resets.
    fn on_cascade_finished(&mut self, score: &ChainScore) {
        let _ = score;
    }
}

/// Listener that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullListener;

impl ChainListener for NullListener {
    fn on_vanish_batch(&mut self, _score: &ChainScore) {}
}

impl<F> ChainListener for F
where
    F: FnMut(&ChainScore),
{
    fn on_vanish_batch(&mut self, score: &ChainScore) {
        self(score);
    }
}
