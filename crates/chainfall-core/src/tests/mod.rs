//! Cross-module tests for the cascade engine.
//!
//! - `helpers.rs`: board builders and a recording listener
//! - `integration.rs`: end-to-end cascade scenarios through [`PuzzleEngine`](crate::engine::PuzzleEngine)
//! - `determinism.rs`: same seed and commands, same state
//! - `properties.rs`: proptest invariants over boards and command streams

mod helpers;
mod integration;
mod properties;
