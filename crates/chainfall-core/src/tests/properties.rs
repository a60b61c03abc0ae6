//! Property tests over random boards and command streams.

use glam::{IVec2, UVec2};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::attribute::Attribute;
use crate::board::{Board, Direction};
use crate::cascade::scan_and_mark;
use crate::connectivity::count_connected;
use crate::rules::{ChainMode, Rules};
use crate::score::ChainScore;
use crate::token::TokenState;

/// Board commands a player can issue.
#[derive(Debug, Clone, Copy)]
enum Command {
    Move(Direction),
    Select,
    Release,
    Swap,
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

fn arb_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        arb_direction().prop_map(Command::Move),
        Just(Command::Select),
        Just(Command::Release),
        Just(Command::Swap),
    ]
}

/// Strategy: a random board of up to 8x8 drawn from a few attributes.
fn arb_board() -> impl Strategy<Value = Board> {
    (1u32..=8, 1u32..=8, 1usize..=4, any::<u64>()).prop_map(|(w, h, count, seed)| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Board::filled(w, h, &mut rng, count)
    })
}

fn apply(board: &mut Board, command: Command) {
    match command {
        Command::Move(direction) => board.move_cursor(direction),
        Command::Select => {
            board.select();
        }
        Command::Release => {
            board.release();
        }
        Command::Swap => {
            board.swap();
        }
    }
}

proptest! {
    #[test]
    fn prop_selection_is_exclusive(
        board in arb_board(),
        commands in proptest::collection::vec(arb_command(), 0..64),
    ) {
        let mut board = board;
        for command in commands {
            apply(&mut board, command);
            let selected = board.count_in_state(TokenState::Selected);
            prop_assert!(selected <= 1);
            prop_assert_eq!(selected == 1, board.has_selection());
            if let Some(index) = board.selected() {
                prop_assert_eq!(board.token(index).state(), TokenState::Selected);
            }
        }
    }

    #[test]
    fn prop_commands_preserve_tokens(
        board in arb_board(),
        commands in proptest::collection::vec(arb_command(), 0..64),
    ) {
        let mut board = board;
        let mut before: Vec<_> = board.tokens().iter().map(|t| (t.id(), t.attribute())).collect();
        for command in commands {
            apply(&mut board, command);
        }
        let mut after: Vec<_> = board.tokens().iter().map(|t| (t.id(), t.attribute())).collect();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_evaluated_flags_cleared_after_scan(
        board in arb_board(),
        min_group in 2usize..=5,
        single in any::<bool>(),
    ) {
        let mut board = board;
        let rules = Rules {
            width: board.width(),
            height: board.height(),
            min_group,
            chain_mode: if single { ChainMode::Single } else { ChainMode::Multiple },
            ..Rules::default()
        };
        let mut score = ChainScore::new();
        let vanished = scan_and_mark(&mut board, &mut score, &rules);
        prop_assert!(!board.any_evaluated());
        prop_assert_eq!(vanished, board.count_in_state(TokenState::Vanishing));
        prop_assert_eq!(vanished as u32, score.total_vanished());
        if single {
            prop_assert!(score.group_count() <= 1);
        }
    }

    #[test]
    fn prop_group_size_is_member_independent(board in arb_board(), x in 0u32..8, y in 0u32..8) {
        let mut board = board;
        let origin = UVec2::new(x % board.width(), y % board.height());
        let size = count_connected(&mut board, origin);
        let members: Vec<_> = (0..board.len()).filter(|&i| board.token(i).is_evaluated()).collect();
        prop_assert_eq!(members.len(), size);
        prop_assert!(members.iter().all(|&i| board.token(i).attribute() == board.token_at(origin).attribute()));
        for &member in &members {
            let mut fresh = board.clone();
            fresh.clear_evaluated();
            prop_assert_eq!(count_connected(&mut fresh, board.index_to_coord(member)), size);
        }
    }

    #[test]
    fn prop_compaction_preserves_order(
        present in proptest::collection::vec(any::<bool>(), 1..16),
    ) {
        let height = present.len() as u32;
        let mut board = Board::from_attributes(1, height, &vec![Attribute::Wood; present.len()]);
        for (y, keep) in present.iter().enumerate() {
            if !keep {
                board.begin_vanish(y);
                board.finish_vanish(y);
            }
        }
        let expected: Vec<_> = board
            .tokens()
            .iter()
            .filter(|t| !t.is_idle())
            .map(crate::token::Token::id)
            .collect();

        board.compact();

        let column: Vec<_> = board.tokens().iter().collect();
        let (kept, idle) = column.split_at(expected.len());
        prop_assert_eq!(kept.iter().map(|t| t.id()).collect::<Vec<_>>(), expected);
        prop_assert!(kept.iter().all(|t| !t.is_idle()));
        prop_assert!(idle.iter().all(|t| t.is_idle()));
    }

    #[test]
    fn prop_cursor_wraps(
        width in 1u32..=10,
        height in 1u32..=10,
        moves in proptest::collection::vec(arb_direction(), 0..100),
    ) {
        let mut board = Board::new(width, height);
        let mut expected = IVec2::ZERO;
        for direction in moves {
            board.move_cursor(direction);
            expected += direction.delta();
            let cursor = board.cursor();
            prop_assert!(cursor.x < width && cursor.y < height);
            prop_assert_eq!(cursor.x as i32, expected.x.rem_euclid(width as i32));
            prop_assert_eq!(cursor.y as i32, expected.y.rem_euclid(height as i32));
        }
    }

    #[test]
    fn prop_double_swap_restores_identity(
        board in arb_board(),
        a in 0usize..64,
        b in 0usize..64,
    ) {
        let mut board = board;
        let a = a % board.len();
        let b = b % board.len();
        prop_assume!(a != b);
        let original: Vec<_> = board.tokens().iter().map(crate::token::Token::id).collect();

        let a_coord = board.index_to_coord(a).as_ivec2();
        let b_coord = board.index_to_coord(b).as_ivec2();
        board.place_cursor(a_coord);
        prop_assert!(board.select());
        board.place_cursor(b_coord);
        prop_assert!(board.swap());
        prop_assert_eq!(board.token(b).id(), original[a]);

        prop_assert!(board.select());
        board.place_cursor(a_coord);
        prop_assert!(board.swap());

        let restored: Vec<_> = board.tokens().iter().map(crate::token::Token::id).collect();
        prop_assert_eq!(restored, original);
    }
}
