//! Cascade sequencer: the Vanish → Refill loop.
//!
//! The cascade is a [`StateMachine`] over [`CascadePhase`] whose context is a
//! [`Playfield`]. The sequencer does not own the playfield; the engine lends
//! it for every call.
//!
//! # Phases
//!
//! ```text
//! Idle ──start──▶ Vanish ──vanishing done──▶ Refill
//!                  │  ▲                        │
//!                  │  └────moves done──────────┘
//!                  └──no qualifying group──▶ Finish ──end──▶ Idle
//! ```
//!
//! - **Vanish** (enter): once the board is settled, scan cells in row-major
//!   order, vanish every group of at least `min_group` tokens (or only the
//!   first, in [`ChainMode::Single`]) and clear all evaluation marks. No
//!   group means Finish; otherwise the chain count grows.
//! - **Vanish** (update): wait for vanishing tokens, then Refill.
//! - **Refill** (enter): report the score to the listener, compact each
//!   column toward row 0, respawn idle tokens and issue a move order to every
//!   token.
//! - **Refill** (update): wait for moving tokens, then Vanish again.
//! - **Finish**: inert until the engine ends the cascade.
//!
//! If the board is still animating when Vanish is entered, the scan is
//! deferred and retried on each update until the board settles.

use std::fmt;

use glam::UVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::board::Board;
use crate::connectivity::{count_connected, mark_vanish};
use crate::fsm::{StateHooks, StateMachine, Transition};
use crate::rules::{AnimationMode, ChainMode, Rules};
use crate::score::{ChainListener, ChainScore};
use crate::token::TokenState;

// =============================================================================
// Phase
// =============================================================================

/// Cascade sequencer state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CascadePhase {
    /// Not running.
    Idle,
    /// Scanning, marking and waiting for removal.
    Vanish,
    /// Compacting, restocking and waiting for movement.
    Refill,
    /// This run is over; waiting for the embedder to end it.
    Finish,
}

impl fmt::Display for CascadePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Vanish => write!(f, "Vanish"),
            Self::Refill => write!(f, "Refill"),
            Self::Finish => write!(f, "Finish"),
        }
    }
}

// =============================================================================
// Playfield
// =============================================================================

/// Everything the cascade reads and mutates for one player.
pub struct Playfield {
    pub(crate) board: Board,
    pub(crate) score: ChainScore,
    pub(crate) rules: Rules,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) listener: Box<dyn ChainListener>,
    scan_pending: bool,
}

impl fmt::Debug for Playfield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Playfield")
            .field("board", &self.board)
            .field("score", &self.score)
            .field("rules", &self.rules)
            .field("scan_pending", &self.scan_pending)
            .finish_non_exhaustive()
    }
}

impl Playfield {
    /// Bundles a board with its rules, a seeded RNG and a listener.
    #[must_use]
    pub fn new(board: Board, rules: Rules, seed: u64, listener: Box<dyn ChainListener>) -> Self {
        Self {
            board,
            score: ChainScore::new(),
            rules,
            rng: ChaCha8Rng::seed_from_u64(seed),
            listener,
            scan_pending: false,
        }
    }

    /// Returns the board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the score of the current run.
    #[must_use]
    pub fn score(&self) -> &ChainScore {
        &self.score
    }

    /// Returns the rules.
    #[must_use]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Returns true if a vanish scan is waiting for the board to settle.
    #[must_use]
    pub fn is_scan_pending(&self) -> bool {
        self.scan_pending
    }
}

// =============================================================================
// Scan
// =============================================================================

/// Scans the board once, vanishing qualifying groups.
///
/// Cells are visited with `y` ascending, then `x` ascending. Cells already
/// evaluated in this pass, and cells that cannot vanish, are skipped. Every
/// evaluation mark is cleared before returning.
///
/// Returns the number of tokens that began vanishing.
pub fn scan_and_mark(board: &mut Board, score: &mut ChainScore, rules: &Rules) -> usize {
    let mut vanished = 0;
    'scan: for y in 0..board.height() {
        for x in 0..board.width() {
            let coord = UVec2::new(x, y);
            let token = board.token_at(coord);
            if token.is_evaluated() || !token.can_to_vanish() {
                continue;
            }
            let attribute = token.attribute();
            let count = count_connected(board, coord);
            if count < rules.min_group {
                continue;
            }
            debug!(%attribute, count, x, y, "group qualifies");
            score.record_vanish(attribute, count);
            vanished += mark_vanish(board, coord);
            if rules.chain_mode == ChainMode::Single {
                break 'scan;
            }
        }
    }
    board.clear_evaluated();
    vanished
}

// =============================================================================
// Hooks
// =============================================================================

fn enter_vanish(field: &mut Playfield, next: &mut Transition<CascadePhase>) {
    field.scan_pending = true;
    try_scan(field, next);
}

fn update_vanish(field: &mut Playfield, next: &mut Transition<CascadePhase>) {
    if field.scan_pending {
        try_scan(field, next);
        return;
    }
    if field.board.any_in_state(TokenState::Vanishing) {
        return;
    }
    next.set_state(CascadePhase::Refill);
}

fn try_scan(field: &mut Playfield, next: &mut Transition<CascadePhase>) {
    if !field.board.is_settled() {
        trace!("vanish scan deferred until the board settles");
        return;
    }
    field.scan_pending = false;

    let vanished = scan_and_mark(&mut field.board, &mut field.score, &field.rules);
    if vanished == 0 {
        debug!(
            chains = field.score.chain_count(),
            total = field.score.total_vanished(),
            "cascade finished"
        );
        next.set_state(CascadePhase::Finish);
        return;
    }

    field.score.record_chain();
    debug!(chain = field.score.chain_count(), vanished, "chain");
    if field.rules.animation == AnimationMode::Instant {
        field.board.finish_all_vanishing();
    }
}

fn enter_refill(field: &mut Playfield, _next: &mut Transition<CascadePhase>) {
    field.listener.on_vanish_batch(&field.score);

    let mut orders = field.board.compact();
    let attribute_count = field.rules.attribute_count;
    orders.extend(field.board.restock(&mut field.rng, attribute_count));
    for order in &orders {
        field.board.order_move(*order);
    }
    debug!(moves = orders.len(), "refill");

    if field.rules.animation == AnimationMode::Instant {
        field.board.finish_all_moving();
    }
}

fn update_refill(field: &mut Playfield, next: &mut Transition<CascadePhase>) {
    if field.board.any_in_state(TokenState::Moving) {
        return;
    }
    next.set_state(CascadePhase::Vanish);
}

// =============================================================================
// Cascade
// =============================================================================

/// The wired cascade sequencer.
#[derive(Debug)]
pub struct Cascade {
    machine: StateMachine<CascadePhase, Playfield>,
}

impl Default for Cascade {
    fn default() -> Self {
        Self::new()
    }
}

impl Cascade {
    /// Creates an idle cascade.
    #[must_use]
    pub fn new() -> Self {
        let machine = StateMachine::new()
            .with_state(CascadePhase::Idle, StateHooks::new())
            .with_state(
                CascadePhase::Vanish,
                StateHooks::new()
                    .on_enter(enter_vanish)
                    .on_update(update_vanish),
            )
            .with_state(
                CascadePhase::Refill,
                StateHooks::new()
                    .on_enter(enter_refill)
                    .on_update(update_refill),
            )
            .with_state(CascadePhase::Finish, StateHooks::new());
        Self { machine }
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> CascadePhase {
        self.machine.current().unwrap_or(CascadePhase::Idle)
    }

    /// Returns true from start until the run is ended.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase() != CascadePhase::Idle
    }

    /// Returns true once no qualifying group remains.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase() == CascadePhase::Finish
    }

    /// Starts a run. No-op unless idle.
    ///
    /// Resets the score and releases any selection, then enters Vanish.
    pub fn start(&mut self, field: &mut Playfield) -> bool {
        if self.is_active() {
            return false;
        }
        field.score.reset();
        field.board.release();
        debug!("cascade started");
        self.machine.set_state(field, CascadePhase::Vanish);
        true
    }

    /// Advances the run by one tick.
    pub fn update(&mut self, field: &mut Playfield) {
        self.machine.update(field);
    }

    /// Ends a finished run, returning its final score. No-op unless finished.
    ///
    /// The listener sees the final score before it resets.
    pub fn end(&mut self, field: &mut Playfield) -> Option<ChainScore> {
        if !self.is_finished() {
            return None;
        }
        let final_score = field.score.clone();
        field.listener.on_cascade_finished(&final_score);
        field.score.reset();
        self.machine.set_state(field, CascadePhase::Idle);
        Some(final_score)
    }
}
