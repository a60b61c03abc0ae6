//! One duel participant: an engine driven by a seeded random input stream.

use std::cell::RefCell;
use std::rc::Rc;

use chainfall_core::{ChainListener, ChainScore, Direction, PuzzleEngine, Rules, RulesError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::debug;

/// Chain notification captured from the engine listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChainEvent {
    /// A refill boundary inside a running cascade.
    Batch {
        /// Score so far.
        score: ChainScore,
    },
    /// A cascade ended.
    Finished {
        /// Final score.
        score: ChainScore,
    },
}

/// Queues every listener notification for the runner to drain.
#[derive(Debug, Clone, Default)]
struct EventQueue {
    events: Rc<RefCell<Vec<ChainEvent>>>,
}

impl ChainListener for EventQueue {
    fn on_vanish_batch(&mut self, score: &ChainScore) {
        self.events.borrow_mut().push(ChainEvent::Batch {
            score: score.clone(),
        });
    }

    fn on_cascade_finished(&mut self, score: &ChainScore) {
        self.events.borrow_mut().push(ChainEvent::Finished {
            score: score.clone(),
        });
    }
}

/// Running totals for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Cascades ended.
    pub cascades: u32,
    /// Chains across all cascades.
    pub chains: u32,
    /// Tokens vanished across all cascades.
    pub vanished: u32,
}

/// An engine plus the input stream that drives it.
#[derive(Debug)]
pub struct Player {
    engine: PuzzleEngine,
    input: ChaCha8Rng,
    events: Rc<RefCell<Vec<ChainEvent>>>,
    totals: Totals,
}

impl Player {
    /// Creates a player. The board and the input stream derive from `seed`.
    pub fn new(rules: Rules, seed: u64) -> Result<Self, RulesError> {
        let mut engine = PuzzleEngine::new(rules, seed)?;
        let queue = EventQueue::default();
        let events = Rc::clone(&queue.events);
        engine.set_listener(Box::new(queue));
        Ok(Self {
            engine,
            input: ChaCha8Rng::seed_from_u64(seed.rotate_left(17)),
            events,
            totals: Totals::default(),
        })
    }

    /// Returns the engine.
    pub fn engine(&self) -> &PuzzleEngine {
        &self.engine
    }

    /// Returns the running totals.
    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Plays one tick. Returns the final score if a cascade ended this tick.
    pub fn step(&mut self) -> Option<ChainScore> {
        let finished = if self.engine.is_cascade_finished() {
            self.engine.end_chain()
        } else {
            if !self.engine.is_cascade_active() {
                self.act();
            }
            None
        };
        self.engine.update();

        if let Some(score) = &finished {
            self.totals.cascades += 1;
            self.totals.chains += score.chain_count();
            self.totals.vanished += score.total_vanished();
        }
        finished
    }

    fn act(&mut self) {
        match self.input.gen_range(0..10) {
            0..=4 => {
                let direction = Direction::ALL[self.input.gen_range(0..Direction::ALL.len())];
                self.engine.move_cursor(direction);
            }
            5 | 6 => {
                if self.engine.has_selection() {
                    self.engine.swap();
                } else {
                    self.engine.select();
                }
            }
            7 => {
                self.engine.release();
            }
            _ => {
                if self.engine.start_cascade() {
                    debug!(tick = self.engine.tick(), "cascade started");
                }
            }
        }
    }

    /// Freezes one column of this player's board.
    pub fn freeze_column(&mut self, column: u32) -> usize {
        self.engine.apply_freeze(|coord, _| coord.x == column)
    }

    /// Takes every queued chain event.
    pub fn drain_events(&mut self) -> Vec<ChainEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}
