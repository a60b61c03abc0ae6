//! End-to-end cascade scenarios driven through the engine.

use glam::{IVec2, UVec2};

use crate::attribute::Attribute;
use crate::board::Direction;
use crate::cascade::CascadePhase;
use crate::rules::{AnimationMode, ChainMode, Rules};
use crate::token::TokenState;

use super::helpers::{
    board_with_fire, engine_with, fire_column, record, reference_rules, run_to_finish,
};

// =============================================================================
// Reference board
// =============================================================================

/// Column 0 holds four stacked Fire tokens; every other cell is Water.
#[test]
fn fire_column_on_water_board() {
    let mut cells = vec![Attribute::Water; 72];
    for y in 0..4 {
        cells[y * 6] = Attribute::Fire;
    }
    let board = crate::board::Board::from_attributes(6, 12, &cells);
    let mut engine = engine_with(reference_rules(4), board);
    let log = record(&mut engine);

    assert!(engine.start_cascade());
    // Both groups vanished in the first pass and were removed at once.
    assert_eq!(engine.board().count_in_state(TokenState::Idle), 72);
    assert_eq!(engine.board().count_attribute(Attribute::Fire), 0);
    assert_eq!(engine.score().vanish_count(Attribute::Fire), 4);
    assert_eq!(engine.score().vanish_count(Attribute::Water), 68);

    run_to_finish(&mut engine, 10_000);
    let score = engine.end_chain().unwrap();

    assert!(score.chain_count() >= 1);
    assert!(score.vanish_count(Attribute::Fire) >= 4);
    let log = log.borrow();
    assert_eq!(log.batches[0].vanish_count(Attribute::Fire), 4);
    assert_eq!(log.batches[0].chain_count(), 1);
    assert_eq!(log.finished, vec![score]);
}

// =============================================================================
// Termination and gating
// =============================================================================

#[test]
fn matchless_board_finishes_in_one_pass() {
    let mut engine = engine_with(reference_rules(2), board_with_fire(6, 12, &[]));
    let log = record(&mut engine);
    let before = engine.board().clone();

    assert!(engine.start_cascade());
    assert!(engine.is_cascade_finished());
    assert_eq!(engine.score().chain_count(), 0);
    assert_eq!(engine.board(), &before);

    let score = engine.end_chain().unwrap();
    assert!(score.is_empty());
    assert!(log.borrow().batches.is_empty());
    assert_eq!(log.borrow().finished.len(), 1);
    assert_eq!(engine.phase(), CascadePhase::Idle);
}

#[test]
fn region_below_threshold_stays() {
    let mut engine = engine_with(reference_rules(4), board_with_fire(6, 12, &fire_column(0, 3)));
    engine.start_cascade();
    assert!(engine.is_cascade_finished());
    assert_eq!(engine.board().count_attribute(Attribute::Fire), 3);
    assert_eq!(engine.score().vanish_count(Attribute::Fire), 0);
}

#[test]
fn region_at_threshold_vanishes() {
    let mut engine = engine_with(reference_rules(4), board_with_fire(6, 12, &fire_column(0, 4)));
    engine.start_cascade();
    assert_eq!(engine.phase(), CascadePhase::Vanish);
    assert_eq!(engine.score().vanish_count(Attribute::Fire), 4);
    assert_eq!(engine.score().chain_count(), 1);
}

#[test]
fn frozen_member_breaks_group() {
    let mut engine = engine_with(reference_rules(4), board_with_fire(6, 12, &fire_column(0, 4)));
    engine.apply_freeze(|coord, _| coord == UVec2::new(0, 1));
    engine.start_cascade();
    assert!(engine.is_cascade_finished());
    assert_eq!(engine.board().count_attribute(Attribute::Fire), 4);
}

// =============================================================================
// Chain modes
// =============================================================================

fn two_fire_columns() -> Vec<(u32, u32)> {
    let mut fire = fire_column(0, 4);
    fire.extend(fire_column(5, 4));
    fire
}

#[test]
fn single_mode_takes_one_group_per_pass() {
    let rules = Rules {
        chain_mode: ChainMode::Single,
        animation: AnimationMode::External,
        ..reference_rules(4)
    };
    let mut engine = engine_with(rules, board_with_fire(6, 12, &two_fire_columns()));

    engine.start_cascade();
    assert_eq!(engine.board().count_in_state(TokenState::Vanishing), 4);
    for y in 0..4 {
        let coord = UVec2::new(0, y);
        assert_eq!(engine.board().token_at(coord).state(), TokenState::Vanishing);
        assert_eq!(engine.board().token_at(UVec2::new(5, y)).state(), TokenState::Usual);
    }

    engine.settle_animations();
    engine.update();
    assert_eq!(engine.phase(), CascadePhase::Refill);
    engine.settle_animations();
    engine.update();

    // The second pass reaches the untouched right column.
    assert_eq!(engine.phase(), CascadePhase::Vanish);
    assert_eq!(engine.score().chain_count(), 2);
    assert_eq!(engine.score().vanish_count(Attribute::Fire), 8);
    for y in 0..4 {
        assert_eq!(
            engine.board().token_at(UVec2::new(5, y)).state(),
            TokenState::Vanishing
        );
    }
}

#[test]
fn multiple_mode_takes_both_groups_in_one_pass() {
    let mut engine = engine_with(reference_rules(4), board_with_fire(6, 12, &two_fire_columns()));
    engine.start_cascade();
    assert_eq!(engine.score().chain_count(), 1);
    assert_eq!(engine.score().group_count(), 2);
    assert_eq!(engine.score().vanish_count(Attribute::Fire), 8);
}

// =============================================================================
// Animation
// =============================================================================

#[test]
fn external_animation_gates_each_phase() {
    let rules = Rules {
        animation: AnimationMode::External,
        ..reference_rules(4)
    };
    let mut engine = engine_with(rules, board_with_fire(6, 12, &fire_column(2, 4)));
    engine.start_cascade();

    for _ in 0..10 {
        engine.update();
    }
    assert_eq!(engine.phase(), CascadePhase::Vanish);

    for y in 0..4 {
        let index = engine.board().coord_to_index(UVec2::new(2, y));
        assert!(engine.complete_vanish(index));
    }
    engine.update();
    assert_eq!(engine.phase(), CascadePhase::Refill);

    // Every token got a move order; respawns enter above the board.
    assert_eq!(engine.board().count_in_state(TokenState::Moving), 72);
    let top = engine.board().token_at(UVec2::new(2, 11));
    let order = top.move_order().unwrap();
    assert_eq!(order.to, UVec2::new(2, 11));
    assert_eq!(order.from, IVec2::new(2, 15));
    let untouched = engine.board().token_at(UVec2::new(0, 0)).move_order().unwrap();
    assert!(untouched.is_stationary());

    for _ in 0..10 {
        engine.update();
    }
    assert_eq!(engine.phase(), CascadePhase::Refill);

    let moving = engine.board().len();
    for index in 0..moving {
        assert!(engine.complete_move(index));
    }
    engine.update();
    assert_ne!(engine.phase(), CascadePhase::Refill);
}

#[test]
fn compaction_drops_column_in_order() {
    let rules = Rules {
        animation: AnimationMode::External,
        ..reference_rules(4)
    };
    let mut engine = engine_with(rules, board_with_fire(6, 12, &fire_column(3, 4)));
    let above: Vec<_> = (4..12)
        .map(|y| engine.board().token_at(UVec2::new(3, y)).id())
        .collect();

    engine.start_cascade();
    engine.settle_animations();
    engine.update();

    let landed: Vec<_> = (0..8)
        .map(|y| engine.board().token_at(UVec2::new(3, y)).id())
        .collect();
    assert_eq!(landed, above);
}

// =============================================================================
// Commands and listener
// =============================================================================

#[test]
fn swap_completes_a_group() {
    let mut fire = fire_column(0, 3);
    fire.push((1, 3));
    let mut engine = engine_with(reference_rules(4), board_with_fire(6, 12, &fire));

    engine.place_cursor(IVec2::new(1, 3));
    assert!(engine.select());
    engine.move_cursor(Direction::Left);
    assert!(engine.swap());
    assert!(!engine.has_selection());

    engine.start_cascade();
    assert_eq!(engine.score().vanish_count(Attribute::Fire), 4);
}

#[test]
fn selection_is_released_on_start() {
    let mut engine = engine_with(reference_rules(4), board_with_fire(6, 12, &[]));
    assert!(engine.select());
    engine.start_cascade();
    assert!(!engine.has_selection());
    assert_eq!(engine.board().count_in_state(TokenState::Selected), 0);
}

#[test]
fn listener_sees_one_batch_per_chain() {
    let mut engine = engine_with(reference_rules(4), board_with_fire(6, 12, &fire_column(0, 4)));
    let log = record(&mut engine);
    engine.start_cascade();
    run_to_finish(&mut engine, 10_000);
    let score = engine.end_chain().unwrap();

    let log = log.borrow();
    assert_eq!(log.batches.len() as u32, score.chain_count());
    for (pass, batch) in log.batches.iter().enumerate() {
        assert_eq!(batch.chain_count() as usize, pass + 1);
    }
    assert_eq!(engine.score().chain_count(), 0);
}

#[test]
fn cascade_can_run_again_after_end() {
    let mut engine = engine_with(reference_rules(4), board_with_fire(6, 12, &fire_column(0, 4)));
    engine.start_cascade();
    run_to_finish(&mut engine, 10_000);
    assert!(!engine.start_cascade());
    engine.end_chain().unwrap();
    assert!(engine.start_cascade());
}
