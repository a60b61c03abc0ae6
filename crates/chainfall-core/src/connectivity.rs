//! Connectivity analysis over the board.
//!
//! Groups are found with an explicit-stack flood fill so worst-case stack
//! usage does not grow with board size. The token `evaluated` mark doubles as
//! the visited set:
//!
//! - [`count_connected`] sets the mark on every group member and returns the
//!   group size
//! - [`mark_vanish`] walks the same marked group, clears the mark as it goes
//!   and starts removal of each member
//!
//! Marks are only meaningful within one scan; the caller clears them
//! afterwards.

use glam::UVec2;

use crate::board::Board;

/// Counts the group containing `origin`, marking every member evaluated.
///
/// Neighbours are visited up, down, left, right. A neighbour joins the group
/// when it is not yet evaluated and [`can_connect`](crate::token::Token::can_connect)
/// holds for the pair.
#[must_use]
pub fn count_connected(board: &mut Board, origin: UVec2) -> usize {
    let dims = board.dimensions();
    let start = dims.coord_to_index(origin);
    board.token_mut(start).set_evaluated(true);

    let mut stack = vec![origin];
    let mut count = 0;
    while let Some(coord) = stack.pop() {
        count += 1;
        let current = dims.coord_to_index(coord);
        for neighbor in dims.neighbors_of(coord) {
            let next = dims.coord_to_index(neighbor);
            if board.token(next).is_evaluated() {
                continue;
            }
            if board.token(current).can_connect(board.token(next)) {
                board.token_mut(next).set_evaluated(true);
                stack.push(neighbor);
            }
        }
    }
    count
}

/// Starts removal of the group previously counted from `origin`.
///
/// Follows only evaluated, connectable neighbours, clearing each mark as it
/// is consumed. Returns how many tokens began vanishing.
pub fn mark_vanish(board: &mut Board, origin: UVec2) -> usize {
    let dims = board.dimensions();
    let start = dims.coord_to_index(origin);
    board.token_mut(start).set_evaluated(false);

    let mut stack = vec![origin];
    let mut marked = 0;
    while let Some(coord) = stack.pop() {
        let current = dims.coord_to_index(coord);
        for neighbor in dims.neighbors_of(coord) {
            let next = dims.coord_to_index(neighbor);
            if !board.token(next).is_evaluated() {
                continue;
            }
            if board.token(current).can_connect(board.token(next)) {
                board.token_mut(next).set_evaluated(false);
                stack.push(neighbor);
            }
        }
        if board.begin_vanish(current) {
            marked += 1;
        }
    }
    marked
}
