//! Engine facade: the command, query and callback surface for one player.
//!
//! [`PuzzleEngine`] owns a [`Playfield`] and the [`Cascade`] that drives it.
//! The host loop applies commands and then calls [`PuzzleEngine::update`] once
//! per tick; commands and updates never interleave.
//!
//! # Determinism
//!
//! Every random draw (initial fill, refill, randomize) comes from a
//! `ChaCha8Rng` seeded at construction. The same seed and the same command
//! stream produce the same [`state_hash`](PuzzleEngine::state_hash).
//!
//! # Example
//!
//! ```
//! use chainfall_core::cascade::CascadePhase;
//! use chainfall_core::engine::PuzzleEngine;
//! use chainfall_core::rules::Rules;
//!
//! let mut engine = PuzzleEngine::new(Rules::default(), 42).unwrap();
//! engine.start_cascade();
//! while !engine.is_cascade_finished() {
//!     engine.update();
//! }
//! let score = engine.end_chain().unwrap();
//! assert_eq!(engine.phase(), CascadePhase::Idle);
//! assert!(score.chain_count() < 1000);
//! ```

use glam::{IVec2, UVec2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::board::{Board, Direction};
use crate::cascade::{Cascade, CascadePhase, Playfield};
use crate::rules::{Rules, RulesError};
use crate::score::{ChainListener, ChainScore, NullListener};
use crate::token::{StatusEffect, Token};

/// Stream offset separating the initial fill from cascade draws.
const FILL_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

// =============================================================================
// PuzzleEngine
// =============================================================================

/// One player's puzzle board with its cascade sequencer.
#[derive(Debug)]
pub struct PuzzleEngine {
    field: Playfield,
    cascade: Cascade,
    tick: u64,
    seed: u64,
}

impl PuzzleEngine {
    /// Creates an engine with a randomly filled board.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError`] if the rules fail validation.
    pub fn new(rules: Rules, seed: u64) -> Result<Self, RulesError> {
        rules.validate()?;
        let mut fill_rng = ChaCha8Rng::seed_from_u64(seed ^ FILL_STREAM);
        let board = Board::filled(rules.width, rules.height, &mut fill_rng, rules.attribute_count);
        Ok(Self::assemble(rules, board, seed))
    }

    /// Creates an engine around a prebuilt board.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError`] if the rules fail validation or the board's
    /// dimensions differ from the rules.
    pub fn with_board(rules: Rules, board: Board, seed: u64) -> Result<Self, RulesError> {
        rules.validate()?;
        if board.width() != rules.width || board.height() != rules.height {
            return Err(RulesError::BoardMismatch {
                width: rules.width,
                height: rules.height,
                actual_width: board.width(),
                actual_height: board.height(),
            });
        }
        Ok(Self::assemble(rules, board, seed))
    }

    fn assemble(rules: Rules, board: Board, seed: u64) -> Self {
        debug!(
            width = rules.width,
            height = rules.height,
            min_group = rules.min_group,
            seed,
            "engine created"
        );
        Self {
            field: Playfield::new(board, rules, seed, Box::new(NullListener)),
            cascade: Cascade::new(),
            tick: 0,
            seed,
        }
    }

    /// Replaces the chain listener.
    pub fn set_listener(&mut self, listener: Box<dyn ChainListener>) {
        self.field.listener = listener;
    }

    // -------------------------------------------------------------------------
    // Input commands
    // -------------------------------------------------------------------------

    /// Moves the cursor one step, wrapping at the edges.
    pub fn move_cursor(&mut self, direction: Direction) {
        self.field.board.move_cursor(direction);
    }

    /// Places the cursor, wrapping out-of-range coordinates.
    pub fn place_cursor(&mut self, coord: IVec2) {
        self.field.board.place_cursor(coord);
    }

    /// Selects the token under the cursor. No-op during a cascade.
    pub fn select(&mut self) -> bool {
        !self.cascade.is_active() && self.field.board.select()
    }

    /// Releases the selection. No-op during a cascade.
    pub fn release(&mut self) -> bool {
        !self.cascade.is_active() && self.field.board.release()
    }

    /// Swaps the selected token with the token under the cursor.
    /// No-op during a cascade.
    pub fn swap(&mut self) -> bool {
        !self.cascade.is_active() && self.field.board.swap()
    }

    // -------------------------------------------------------------------------
    // Cascade control
    // -------------------------------------------------------------------------

    /// Starts a cascade. No-op unless idle.
    pub fn start_cascade(&mut self) -> bool {
        self.cascade.start(&mut self.field)
    }

    /// Advances one tick: the cascade step, then status timers.
    pub fn update(&mut self) {
        self.cascade.update(&mut self.field);
        let expired = self.field.board.age_status(&self.field.rules.invisible);
        if expired > 0 {
            debug!(expired, tick = self.tick, "status effects expired");
        }
        self.tick += 1;
    }

    /// Ends a finished cascade, returning its final score.
    ///
    /// The listener's `on_cascade_finished` sees the score first; the engine
    /// then resets it and returns to idle. No-op unless finished.
    pub fn end_chain(&mut self) -> Option<ChainScore> {
        self.cascade.end(&mut self.field)
    }

    // -------------------------------------------------------------------------
    // Status mutators
    // -------------------------------------------------------------------------

    /// Freezes every present token matching `predicate`.
    pub fn apply_freeze<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(UVec2, &Token) -> bool,
    {
        let effect = StatusEffect::frozen(self.field.rules.freeze_ticks);
        self.apply_status(effect, predicate)
    }

    /// Paralyzes every present token matching `predicate`.
    pub fn apply_paralysis<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(UVec2, &Token) -> bool,
    {
        let effect = StatusEffect::paralyzed(self.field.rules.paralysis_ticks);
        self.apply_status(effect, predicate)
    }

    /// Makes every present token matching `predicate` invisible.
    pub fn apply_invisible<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(UVec2, &Token) -> bool,
    {
        let effect = StatusEffect::invisible(self.field.rules.invisible_ticks);
        self.apply_status(effect, predicate)
    }

    fn apply_status<F>(&mut self, effect: StatusEffect, predicate: F) -> usize
    where
        F: FnMut(UVec2, &Token) -> bool,
    {
        let affected = self
            .field
            .board
            .apply_status(effect, &self.field.rules.invisible, predicate);
        debug!(flag = ?effect.flag(), affected, "status applied");
        affected
    }

    /// Clears every status effect on the board.
    pub fn cure(&mut self) -> usize {
        let cured = self.field.board.cure(&self.field.rules.invisible);
        debug!(cured, "board cured");
        cured
    }

    /// Reassigns random attributes to resting tokens matching `predicate`.
    /// No-op during a cascade.
    pub fn randomize<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(UVec2, &Token) -> bool,
    {
        if self.cascade.is_active() {
            return 0;
        }
        let attribute_count = self.field.rules.attribute_count;
        self.field
            .board
            .randomize(&mut self.field.rng, attribute_count, predicate)
    }

    // -------------------------------------------------------------------------
    // Animation completion
    // -------------------------------------------------------------------------

    /// Marks the vanish animation at `index` complete.
    pub fn complete_vanish(&mut self, index: usize) -> bool {
        self.field.board.finish_vanish(index)
    }

    /// Marks the move animation at `index` complete.
    pub fn complete_move(&mut self, index: usize) -> bool {
        self.field.board.finish_move(index)
    }

    /// Completes every pending animation. Returns how many finished.
    pub fn settle_animations(&mut self) -> usize {
        self.field.board.finish_all_vanishing() + self.field.board.finish_all_moving()
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Returns true if a token is selected.
    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.field.board.has_selection()
    }

    /// Returns true from cascade start until [`end_chain`](Self::end_chain).
    #[must_use]
    pub fn is_cascade_active(&self) -> bool {
        self.cascade.is_active()
    }

    /// Returns true once the cascade has reached Finish.
    #[must_use]
    pub fn is_cascade_finished(&self) -> bool {
        self.cascade.is_finished()
    }

    /// Returns the cursor coordinate.
    #[must_use]
    pub fn cursor(&self) -> UVec2 {
        self.field.board.cursor()
    }

    /// Returns the cascade phase.
    #[must_use]
    pub fn phase(&self) -> CascadePhase {
        self.cascade.phase()
    }

    /// Returns the board.
    #[must_use]
    pub fn board(&self) -> &Board {
        self.field.board()
    }

    /// Returns the score of the running cascade.
    #[must_use]
    pub fn score(&self) -> &ChainScore {
        self.field.score()
    }

    /// Returns the rules.
    #[must_use]
    pub fn rules(&self) -> &Rules {
        self.field.rules()
    }

    /// Returns the number of `update` calls so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Returns the seed the engine was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Hashes the board and cascade phase.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.field.board.state_hash().hash(&mut hasher);
        self.phase().hash(&mut hasher);
        self.field.score.hash(&mut hasher);
        hasher.finish()
    }
}
