//! # Chainfall Core
//!
//! Matching-cascade engine for a two-player attribute puzzle.
//!
//! Each player owns a rectangular board of tokens. Tokens of the same
//! attribute that touch orthogonally form groups; groups at or above a size
//! threshold vanish, the columns compact, new tokens drop in from above and
//! the board is scanned again until nothing qualifies. Every pass is a chain,
//! and the chain score feeds the combat layer through a listener.
//!
//! ## Architecture
//!
//! - **Token** ([`token`]): attribute, lifecycle state, evaluation mark and
//!   status effects
//! - **Board** ([`board`]): the grid, cursor, selection and swap
//! - **Connectivity** ([`connectivity`]): explicit-stack flood fill
//! - **Sequencer** ([`fsm`]): generic trampolined state machine
//! - **Cascade** ([`cascade`]): the Vanish → Refill loop built on the sequencer
//! - **Score** ([`score`]): chain counters and the [`ChainListener`] seam
//! - **Engine** ([`engine`]): the command/query surface the host drives
//!
//! The engine is single-threaded and advances once per
//! [`PuzzleEngine::update`] call.
//!
//! ## Usage
//!
//! ```
//! use chainfall_core::{PuzzleEngine, Rules};
//!
//! let mut engine = PuzzleEngine::new(Rules::default(), 7).unwrap();
//! engine.start_cascade();
//! while !engine.is_cascade_finished() {
//!     engine.update();
//! }
//! let score = engine.end_chain().unwrap();
//! println!("{} chains, {} tokens", score.chain_count(), score.total_vanished());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod attribute;
pub mod board;
pub mod cascade;
pub mod connectivity;
pub mod engine;
pub mod fsm;
pub mod rules;
pub mod score;
pub mod token;

pub use attribute::Attribute;
pub use board::{Board, Direction};
pub use cascade::CascadePhase;
pub use engine::PuzzleEngine;
pub use rules::{AnimationMode, ChainMode, Rules, RulesError};
pub use score::{ChainListener, ChainScore};
pub use token::{StatusEffect, Token, TokenId, TokenState};

#[cfg(test)]
mod tests;
