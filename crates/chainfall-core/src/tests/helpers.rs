//! Test helpers: board builders, engine setup and a recording listener.

use std::cell::RefCell;
use std::rc::Rc;

use crate::attribute::Attribute;
use crate::board::Board;
use crate::engine::PuzzleEngine;
use crate::rules::Rules;
use crate::score::{ChainListener, ChainScore};

// =============================================================================
// Boards
// =============================================================================

/// Attribute at `(x, y)` of a board with no same-attribute neighbours and no
/// Fire.
///
/// Horizontal neighbours differ by one step and vertical neighbours by two, so
/// modulo the six non-Fire attributes no two neighbours ever match.
#[must_use]
pub fn background_attribute(x: u32, y: u32) -> Attribute {
    Attribute::ALL[1 + ((x + 2 * y) % 6) as usize]
}

/// Builds a matchless board, then paints `fire` cells with Fire.
#[must_use]
pub fn board_with_fire(width: u32, height: u32, fire: &[(u32, u32)]) -> Board {
    let mut cells = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            if fire.contains(&(x, y)) {
                cells.push(Attribute::Fire);
            } else {
                cells.push(background_attribute(x, y));
            }
        }
    }
    Board::from_attributes(width, height, &cells)
}

/// Fire coordinates for a vertical run in column `x` from row 0.
#[must_use]
pub fn fire_column(x: u32, len: u32) -> Vec<(u32, u32)> {
    (0..len).map(|y| (x, y)).collect()
}

// =============================================================================
// Engines
// =============================================================================

/// Rules for a 6x12 board with the given threshold.
#[must_use]
pub fn reference_rules(min_group: usize) -> Rules {
    Rules {
        min_group,
        ..Rules::default()
    }
}

/// Wraps a prebuilt board in an engine.
///
/// # Panics
///
/// Panics if the board does not match the rules.
#[must_use]
pub fn engine_with(rules: Rules, board: Board) -> PuzzleEngine {
    PuzzleEngine::with_board(rules, board, 42).expect("board matches rules")
}

/// Updates until the cascade finishes. Returns the number of updates.
///
/// # Panics
///
/// Panics if the cascade has not finished after `max_ticks` updates.
pub fn run_to_finish(engine: &mut PuzzleEngine, max_ticks: u32) -> u32 {
    for ticks in 0..max_ticks {
        if engine.is_cascade_finished() {
            return ticks;
        }
        engine.update();
    }
    assert!(
        engine.is_cascade_finished(),
        "cascade still {} after {max_ticks} ticks",
        engine.phase()
    );
    max_ticks
}

// =============================================================================
// Listener
// =============================================================================

/// Shared log of everything a [`RecordingListener`] saw.
#[derive(Debug, Default)]
pub struct ListenerLog {
    /// Scores delivered at each refill.
    pub batches: Vec<ChainScore>,
    /// Scores delivered when a cascade ended.
    pub finished: Vec<ChainScore>,
}

/// Listener that appends every notification to a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    log: Rc<RefCell<ListenerLog>>,
}

impl RecordingListener {
    /// Returns a handle to the shared log.
    #[must_use]
    pub fn log(&self) -> Rc<RefCell<ListenerLog>> {
        Rc::clone(&self.log)
    }
}

impl ChainListener for RecordingListener {
    fn on_vanish_batch(&mut self, score: &ChainScore) {
        self.log.borrow_mut().batches.push(score.clone());
    }

    fn on_cascade_finished(&mut self, score: &ChainScore) {
        self.log.borrow_mut().finished.push(score.clone());
    }
}

/// Installs a fresh recording listener and returns its log.
pub fn record(engine: &mut PuzzleEngine) -> Rc<RefCell<ListenerLog>> {
    let listener = RecordingListener::default();
    let log = listener.log();
    engine.set_listener(Box::new(listener));
    log
}
