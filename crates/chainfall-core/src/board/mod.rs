//! Board module: the fixed-size token grid.
//!
//! The board owns every token in row-major order (`index = y * width + x`),
//! a wrapped cursor and an optional selected index. Row 0 is the bottom of the
//! grid; compaction packs tokens toward it.
//!
//! # Invariants
//!
//! - `selected`, if present, refers to a token in [`TokenState::Selected`]
//! - At most one token is selected at a time
//! - Clearing the selection always returns that token to [`TokenState::Usual`]
//!
//! # Example
//!
//! ```
//! use chainfall_core::board::{Board, Direction};
//! use glam::UVec2;
//!
//! let mut board = Board::new(6, 12);
//! board.move_cursor(Direction::Left);
//! assert_eq!(board.cursor(), UVec2::new(5, 0));
//! assert_eq!(board.coord_to_index(UVec2::new(2, 3)), 20);
//! ```

mod selection;

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use glam::{IVec2, UVec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::token::{InvisibleRule, MoveOrder, StatusEffect, Token, TokenId, TokenState};

// =============================================================================
// Direction
// =============================================================================

/// Cardinal direction for cursor movement and neighbour lookup.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward higher rows.
    Up,
    /// Toward row 0.
    Down,
    /// Toward column 0.
    Left,
    /// Toward higher columns.
    Right,
}

impl Direction {
    /// All directions in neighbour search order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset for this direction.
    #[must_use]
    pub const fn delta(self) -> IVec2 {
        match self {
            Self::Up => IVec2::new(0, 1),
            Self::Down => IVec2::new(0, -1),
            Self::Left => IVec2::new(-1, 0),
            Self::Right => IVec2::new(1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "Up"),
            Self::Down => write!(f, "Down"),
            Self::Left => write!(f, "Left"),
            Self::Right => write!(f, "Right"),
        }
    }
}

// =============================================================================
// Dimensions
// =============================================================================

/// Grid dimensions with coordinate arithmetic.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl Dimensions {
    /// Creates dimensions.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        assert!(
            width > 0 && height > 0,
            "board dimensions must be positive, got {width}x{height}"
        );
        Self { width, height }
    }

    /// Number of cells.
    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns true if the signed coordinate lies on the grid.
    #[must_use]
    pub fn contains(self, coord: IVec2) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    /// Converts a coordinate to a row-major index.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[must_use]
    pub fn coord_to_index(self, coord: UVec2) -> usize {
        assert!(
            coord.x < self.width && coord.y < self.height,
            "coordinate {coord} outside {}x{} board",
            self.width,
            self.height
        );
        coord.y as usize * self.width as usize + coord.x as usize
    }

    /// Converts a row-major index to a coordinate.
    ///
    /// # Panics
    ///
    /// Panics if the index is outside the grid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn index_to_coord(self, index: usize) -> UVec2 {
        assert!(
            index < self.cell_count(),
            "index {index} outside {}x{} board",
            self.width,
            self.height
        );
        let width = self.width as usize;
        UVec2::new((index % width) as u32, (index / width) as u32)
    }

    /// Wraps a signed coordinate onto the grid on both axes.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn wrap(self, coord: IVec2) -> UVec2 {
        UVec2::new(
            coord.x.rem_euclid(self.width as i32) as u32,
            coord.y.rem_euclid(self.height as i32) as u32,
        )
    }

    /// In-bounds cardinal neighbours in search order (up, down, left, right).
    #[allow(clippy::cast_sign_loss)]
    pub fn neighbors_of(self, coord: UVec2) -> impl Iterator<Item = UVec2> {
        let origin = coord.as_ivec2();
        Direction::ALL.into_iter().filter_map(move |direction| {
            let next = origin + direction.delta();
            self.contains(next).then(|| next.as_uvec2())
        })
    }
}

// =============================================================================
// Board
// =============================================================================

/// Fixed-size rectangular grid of tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    dims: Dimensions,
    cells: Vec<Token>,
    cursor: UVec2,
    selected: Option<usize>,
}

impl Board {
    /// Creates a board of empty slots awaiting refill.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(width: u32, height: u32) -> Self {
        let dims = Dimensions::new(width, height);
        let cells = (0..dims.cell_count())
            .map(|i| Token::idle(TokenId::new(i as u32)))
            .collect();
        Self {
            dims,
            cells,
            cursor: UVec2::ZERO,
            selected: None,
        }
    }

    /// Creates a board with every slot holding a random attribute.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn filled<R: Rng + ?Sized>(
        width: u32,
        height: u32,
        rng: &mut R,
        attribute_count: usize,
    ) -> Self {
        let mut board = Self::new(width, height);
        for token in &mut board.cells {
            token.respawn(Attribute::random(rng, attribute_count));
        }
        board
    }

    /// Creates a board from attributes in row-major order, bottom row first.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or the slice length does not match.
    #[must_use]
    pub fn from_attributes(width: u32, height: u32, attributes: &[Attribute]) -> Self {
        let mut board = Self::new(width, height);
        assert_eq!(
            attributes.len(),
            board.cells.len(),
            "expected {} attributes for a {width}x{height} board",
            board.cells.len()
        );
        for (token, attribute) in board.cells.iter_mut().zip(attributes) {
            token.respawn(*attribute);
        }
        board
    }

    /// Returns the grid dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.dims.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.dims.height
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; boards have positive dimensions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// See [`Dimensions::coord_to_index`].
    #[must_use]
    pub fn coord_to_index(&self, coord: UVec2) -> usize {
        self.dims.coord_to_index(coord)
    }

    /// See [`Dimensions::index_to_coord`].
    #[must_use]
    pub fn index_to_coord(&self, index: usize) -> UVec2 {
        self.dims.index_to_coord(index)
    }

    /// See [`Dimensions::neighbors_of`].
    pub fn neighbors_of(&self, coord: UVec2) -> impl Iterator<Item = UVec2> {
        self.dims.neighbors_of(coord)
    }

    /// Returns the token at an index.
    #[must_use]
    pub fn token(&self, index: usize) -> &Token {
        &self.cells[index]
    }

    /// Returns the token at a coordinate.
    #[must_use]
    pub fn token_at(&self, coord: UVec2) -> &Token {
        &self.cells[self.coord_to_index(coord)]
    }

    pub(crate) fn token_mut(&mut self, index: usize) -> &mut Token {
        &mut self.cells[index]
    }

    /// Returns all tokens in row-major order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.cells
    }

    /// Returns the index currently holding the token with `id`.
    #[must_use]
    pub fn position_of(&self, id: TokenId) -> Option<usize> {
        self.cells.iter().position(|token| token.id() == id)
    }

    // -------------------------------------------------------------------------
    // Cursor
    // -------------------------------------------------------------------------

    /// Returns the cursor coordinate.
    #[must_use]
    pub const fn cursor(&self) -> UVec2 {
        self.cursor
    }

    /// Returns the index under the cursor.
    #[must_use]
    pub fn cursor_index(&self) -> usize {
        self.coord_to_index(self.cursor)
    }

    /// Moves the cursor one step, wrapping both axes.
    pub fn move_cursor(&mut self, direction: Direction) {
        self.cursor = self.dims.wrap(self.cursor.as_ivec2() + direction.delta());
    }

    /// Places the cursor, wrapping out-of-range coordinates.
    pub fn place_cursor(&mut self, coord: IVec2) {
        self.cursor = self.dims.wrap(coord);
    }

    // -------------------------------------------------------------------------
    // State queries
    // -------------------------------------------------------------------------

    /// Returns true if any token is in `state`.
    #[must_use]
    pub fn any_in_state(&self, state: TokenState) -> bool {
        self.cells.iter().any(|token| token.state() == state)
    }

    /// Counts tokens in `state`.
    #[must_use]
    pub fn count_in_state(&self, state: TokenState) -> usize {
        self.cells.iter().filter(|token| token.state() == state).count()
    }

    /// Returns true if no token is vanishing or moving.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !self
            .cells
            .iter()
            .any(|token| matches!(token.state(), TokenState::Vanishing | TokenState::Moving))
    }

    /// Counts present tokens with the given attribute.
    #[must_use]
    pub fn count_attribute(&self, attribute: Attribute) -> usize {
        self.cells
            .iter()
            .filter(|token| !token.is_idle() && token.attribute() == attribute)
            .count()
    }

    /// Returns true if any token carries an evaluation mark.
    #[must_use]
    pub fn any_evaluated(&self) -> bool {
        self.cells.iter().any(Token::is_evaluated)
    }

    pub(crate) fn clear_evaluated(&mut self) {
        for token in &mut self.cells {
            token.set_evaluated(false);
        }
    }

    // -------------------------------------------------------------------------
    // Vanish and move
    // -------------------------------------------------------------------------

    /// Starts removal of the token at `index`, dropping the selection if it
    /// pointed there.
    pub(crate) fn begin_vanish(&mut self, index: usize) -> bool {
        if !self.cells[index].begin_vanish() {
            return false;
        }
        if self.selected == Some(index) {
            self.selected = None;
        }
        true
    }

    /// Completes removal of the token at `index`.
    pub fn finish_vanish(&mut self, index: usize) -> bool {
        self.cells[index].finish_vanish()
    }

    /// Completes the move of the token at `index`.
    pub fn finish_move(&mut self, index: usize) -> bool {
        self.cells[index].finish_move()
    }

    /// Completes every pending removal. Returns how many finished.
    pub fn finish_all_vanishing(&mut self) -> usize {
        self.cells
            .iter_mut()
            .map(Token::finish_vanish)
            .filter(|finished| *finished)
            .count()
    }

    /// Completes every pending move. Returns how many finished.
    pub fn finish_all_moving(&mut self) -> usize {
        self.cells
            .iter_mut()
            .map(Token::finish_move)
            .filter(|finished| *finished)
            .count()
    }

    /// Packs every column's present tokens toward row 0, preserving their
    /// relative order. Idle slots end up at the top of each column.
    ///
    /// Any selection is released first, since slots move underneath it.
    ///
    /// Returns a move order for every present token, including those that
    /// stayed in place.
    #[allow(clippy::cast_possible_wrap)]
    pub fn compact(&mut self) -> Vec<MoveOrder> {
        self.release();
        let mut orders = Vec::with_capacity(self.cells.len());
        for x in 0..self.dims.width {
            let mut write = 0;
            for y in 0..self.dims.height {
                let from = self.coord_to_index(UVec2::new(x, y));
                if self.cells[from].is_idle() {
                    continue;
                }
                let to = UVec2::new(x, write);
                if write != y {
                    let to_index = self.coord_to_index(to);
                    self.cells.swap(from, to_index);
                }
                orders.push(MoveOrder {
                    from: IVec2::new(x as i32, y as i32),
                    to,
                });
                write += 1;
            }
        }
        orders
    }

    /// Respawns every idle token with a random attribute.
    ///
    /// Returns move orders that drop the new tokens in from above the board,
    /// stacked in the order they fill their column.
    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn restock<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        attribute_count: usize,
    ) -> Vec<MoveOrder> {
        let mut orders = Vec::new();
        for x in 0..self.dims.width {
            let mut spawned = 0;
            for y in 0..self.dims.height {
                let index = self.coord_to_index(UVec2::new(x, y));
                if !self.cells[index].is_idle() {
                    continue;
                }
                self.cells[index].respawn(Attribute::random(rng, attribute_count));
                orders.push(MoveOrder {
                    from: IVec2::new(x as i32, (self.dims.height + spawned) as i32),
                    to: UVec2::new(x, y),
                });
                spawned += 1;
            }
        }
        orders
    }

    /// Issues a move order to the token at `order.to`.
    pub(crate) fn order_move(&mut self, order: MoveOrder) {
        let index = self.coord_to_index(order.to);
        self.cells[index].order_move(order);
    }

    // -------------------------------------------------------------------------
    // Status effects and attribute reassignment
    // -------------------------------------------------------------------------

    /// Applies `effect` to every present token matching `predicate`.
    ///
    /// Returns how many tokens were affected.
    pub fn apply_status<F>(
        &mut self,
        effect: StatusEffect,
        rule: &InvisibleRule,
        mut predicate: F,
    ) -> usize
    where
        F: FnMut(UVec2, &Token) -> bool,
    {
        let dims = self.dims;
        let mut affected = 0;
        for (index, token) in self.cells.iter_mut().enumerate() {
            if token.is_idle() || !predicate(dims.index_to_coord(index), token) {
                continue;
            }
            token.apply_effect(effect, rule);
            affected += 1;
        }
        affected
    }

    /// Removes every status effect board-wide. Returns how many tokens changed.
    pub fn cure(&mut self, rule: &InvisibleRule) -> usize {
        self.cells
            .iter_mut()
            .map(|token| token.cure(rule))
            .filter(|cured| *cured)
            .count()
    }

    /// Ages every status effect by one tick. Returns how many expired.
    pub fn age_status(&mut self, rule: &InvisibleRule) -> usize {
        self.cells
            .iter_mut()
            .map(|token| token.age_effects(rule))
            .sum()
    }

    /// Reassigns random attributes to resting tokens matching `predicate`.
    ///
    /// Returns how many tokens were reassigned.
    pub fn randomize<R, F>(&mut self, rng: &mut R, attribute_count: usize, mut predicate: F) -> usize
    where
        R: Rng + ?Sized,
        F: FnMut(UVec2, &Token) -> bool,
    {
        let dims = self.dims;
        let mut changed = 0;
        for (index, token) in self.cells.iter_mut().enumerate() {
            if !token.can_to_vanish() || !predicate(dims.index_to_coord(index), token) {
                continue;
            }
            token.set_attribute(Attribute::random(rng, attribute_count));
            changed += 1;
        }
        changed
    }

    // -------------------------------------------------------------------------
    // Hashing
    // -------------------------------------------------------------------------

    /// Computes a deterministic hash of the board.
    ///
    /// Covers dimensions, cursor, selection and every token in index order.
    /// Two boards driven by the same seed and commands hash identically.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.dims.hash(&mut hasher);
        self.cursor.hash(&mut hasher);
        self.selected.hash(&mut hasher);
        for token in &self.cells {
            token.hash(&mut hasher);
        }
        hasher.finish()
    }
}
