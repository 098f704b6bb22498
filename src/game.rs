//! Game state: field, active piece, collision, rotation, line clear, scoring.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Field height in rows.
pub const FIELD_ROWS: usize = 20;
/// Field width in columns.
pub const FIELD_COLS: usize = 10;

/// Every new piece appears with its top-left anchor here.
pub const SPAWN_X: i32 = 3;
pub const SPAWN_Y: i32 = 0;

/// Points per removed row.
pub const POINTS_PER_LINE: u32 = 100;

/// Largest template bounding box (the I piece).
const MAX_SHAPE: usize = 4;

/// Colour tag stored in a locked cell; the theme maps it to a terminal colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorId(pub u8);

/// Single field cell: empty or holding the colour of the piece that locked there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(ColorId),
}

impl Cell {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Tetromino kinds (I, J, L, O, S, T, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl TetrominoKind {
    pub const ALL: [Self; 7] = [Self::I, Self::J, Self::L, Self::O, Self::S, Self::T, Self::Z];

    /// Base (spawn) orientation. Square boxes only: 4x4 for I, 2x2 for O, 3x3 otherwise.
    pub fn shape(&self) -> Shape {
        match self {
            Self::I => Shape::from_rows(&[&[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]]),
            Self::J => Shape::from_rows(&[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]]),
            Self::L => Shape::from_rows(&[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]]),
            Self::O => Shape::from_rows(&[&[1, 1], &[1, 1]]),
            Self::S => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]]),
            Self::T => Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]]),
            Self::Z => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]]),
        }
    }

    /// Colour tag 0..7, one per kind, in `ALL` order.
    pub fn color(&self) -> ColorId {
        let index = match self {
            Self::I => 0,
            Self::J => 1,
            Self::L => 2,
            Self::O => 3,
            Self::S => 4,
            Self::T => 5,
            Self::Z => 6,
        };
        ColorId(index)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::I => "I",
            Self::J => "J",
            Self::L => "L",
            Self::O => "O",
            Self::S => "S",
            Self::T => "T",
            Self::Z => "Z",
        }
    }
}

/// Square occupancy matrix of side `size` (at most 4). `cells[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    size: usize,
    cells: [[bool; MAX_SHAPE]; MAX_SHAPE],
}

impl Shape {
    /// Build from 0/1 rows; rows must form a square no larger than 4x4.
    fn from_rows(rows: &[&[u8]]) -> Self {
        debug_assert!(rows.len() <= MAX_SHAPE);
        debug_assert!(rows.iter().all(|r| r.len() == rows.len()));
        let mut cells = [[false; MAX_SHAPE]; MAX_SHAPE];
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                cells[r][c] = v != 0;
            }
        }
        Self {
            size: rows.len(),
            cells,
        }
    }

    /// Occupied cells as (col, row) offsets from the top-left anchor.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.size).flat_map(move |r| {
            (0..self.size)
                .filter(move |&c| self.cells[r][c])
                .map(move |c| (c as i32, r as i32))
        })
    }

    /// Clockwise quarter turn: transpose, then reverse each row.
    pub fn rotated(&self) -> Self {
        let n = self.size;
        let mut cells = [[false; MAX_SHAPE]; MAX_SHAPE];
        for (r, row) in cells.iter_mut().enumerate().take(n) {
            for (c, cell) in row.iter_mut().enumerate().take(n) {
                *cell = self.cells[n - 1 - c][r];
            }
        }
        Self { size: n, cells }
    }
}

/// The falling, player-controlled piece. (x, y) is the shape's top-left in field coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: TetrominoKind,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
    pub color: ColorId,
}

impl Piece {
    /// Base orientation of `kind` at the spawn anchor.
    pub fn spawn(kind: TetrominoKind) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            x: SPAWN_X,
            y: SPAWN_Y,
            color: kind.color(),
        }
    }

    /// Absolute field coordinates (x, y) of every occupied cell; y may be negative.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape.cells().map(move |(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// True if the piece occupies field cell (x, y).
    pub fn covers(&self, x: i32, y: i32) -> bool {
        self.cells().any(|(px, py)| px == x && py == y)
    }
}

/// Locked cells. rows[0] is the top row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    rows: VecDeque<[Cell; FIELD_COLS]>,
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}

impl Field {
    pub fn new() -> Self {
        Self {
            rows: (0..FIELD_ROWS).map(|_| [Cell::Empty; FIELD_COLS]).collect(),
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell; FIELD_COLS]> {
        self.rows.iter()
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(|c| !c.is_empty()))
    }

    pub fn is_clear(&self) -> bool {
        self.rows.iter().flatten().all(Cell::is_empty)
    }

    /// True if `shape` anchored at (x, y) leaves the side walls, passes the floor,
    /// or overlaps a locked cell. Cells above the top row only hit the walls.
    pub fn collides(&self, x: i32, y: i32, shape: &Shape) -> bool {
        shape.cells().any(|(dx, dy)| {
            let (cx, cy) = (x + dx, y + dy);
            if cx < 0 || cx >= FIELD_COLS as i32 || cy >= FIELD_ROWS as i32 {
                return true;
            }
            cy >= 0 && self.get(cx as usize, cy as usize).is_some_and(|c| !c.is_empty())
        })
    }

    /// Write the piece's on-field cells with its colour. Cells above the top are dropped.
    fn merge(&mut self, piece: &Piece) {
        for (x, y) in piece.cells() {
            if x >= 0 && y >= 0 {
                self.set(x as usize, y as usize, Cell::Filled(piece.color));
            }
        }
    }

    /// Remove every full row, bottom to top, inserting an empty row at the top for each.
    /// The same index is re-checked after a removal since the row above has moved into it.
    fn clear_full_rows(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = FIELD_ROWS;
        while y > 0 {
            if self.is_row_full(y - 1) {
                self.rows.remove(y - 1);
                self.rows.push_front([Cell::Empty; FIELD_COLS]);
                cleared += 1;
            } else {
                y -= 1;
            }
        }
        cleared
    }
}

/// Supplies the kind of each spawned piece.
pub trait PieceSource {
    fn next_kind(&mut self) -> TetrominoKind;
}

/// Uniform choice among the 7 kinds.
#[derive(Debug, Clone)]
pub struct RandomSource<R = StdRng> {
    rng: R,
}

impl<R: Rng> RandomSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomSource<StdRng> {
    /// Reproducible piece order.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> PieceSource for RandomSource<R> {
    fn next_kind(&mut self) -> TetrominoKind {
        TetrominoKind::ALL[self.rng.random_range(0..TetrominoKind::ALL.len())]
    }
}

/// Replays a fixed list of kinds, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    kinds: Vec<TetrominoKind>,
    pos: usize,
}

impl SequenceSource {
    /// An empty list replays `TetrominoKind::ALL`.
    pub fn new(kinds: impl Into<Vec<TetrominoKind>>) -> Self {
        let kinds = kinds.into();
        let kinds = if kinds.is_empty() {
            TetrominoKind::ALL.to_vec()
        } else {
            kinds
        };
        Self { kinds, pos: 0 }
    }
}

impl PieceSource for SequenceSource {
    fn next_kind(&mut self) -> TetrominoKind {
        let kind = self.kinds[self.pos % self.kinds.len()];
        self.pos = (self.pos + 1) % self.kinds.len();
        kind
    }
}

/// Result of merging the active piece into the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockOutcome {
    pub cleared: u32,
    pub game_over: bool,
}

/// Game state: field, active piece, score, game-over flag.
#[derive(Debug)]
pub struct GameState<S = RandomSource> {
    field: Field,
    piece: Piece,
    score: u32,
    lines_cleared: u32,
    game_over: bool,
    source: S,
    /// Bumped on every accepted change to the piece, field or game-over flag.
    revision: u64,
}

impl<S: PieceSource> GameState<S> {
    pub fn new(mut source: S) -> Self {
        let piece = Piece::spawn(source.next_kind());
        Self {
            field: Field::new(),
            piece,
            score: 0,
            lines_cleared: 0,
            game_over: false,
            source,
            revision: 0,
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Replace the active piece with a fresh one at the spawn anchor. Does not check for overlap;
    /// a blocked spawn is caught by the next lock.
    pub fn spawn_piece(&mut self) {
        self.piece = Piece::spawn(self.source.next_kind());
        self.touch();
    }

    pub fn collide(&self, x: i32, y: i32, shape: &Shape) -> bool {
        self.field.collides(x, y, shape)
    }

    pub fn rotate(shape: &Shape) -> Shape {
        shape.rotated()
    }

    /// Rotate clockwise in place; rejected (no kicks) if the result collides.
    pub fn handle_rotate(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        let rotated = Self::rotate(&self.piece.shape);
        if self.collide(self.piece.x, self.piece.y, &rotated) {
            return false;
        }
        self.piece.shape = rotated;
        self.touch();
        true
    }

    /// Shift the piece by (dx, dy). Returns false and changes nothing if the target collides.
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        if self.game_over {
            return false;
        }
        let (x, y) = (self.piece.x + dx, self.piece.y + dy);
        if self.collide(x, y, &self.piece.shape) {
            return false;
        }
        self.piece.x = x;
        self.piece.y = y;
        self.touch();
        true
    }

    /// Merge the piece, clear full rows, score them, then either end the game
    /// (piece anchor at or above row 0) or spawn the next piece.
    pub fn lock_piece(&mut self) -> LockOutcome {
        if self.game_over {
            return LockOutcome {
                cleared: 0,
                game_over: true,
            };
        }
        let anchor_y = self.piece.y;
        self.field.merge(&self.piece);
        let cleared = self.field.clear_full_rows();
        self.score += cleared * POINTS_PER_LINE;
        self.lines_cleared += cleared;

        if anchor_y <= 0 {
            self.game_over = true;
            self.touch();
        } else {
            self.spawn_piece();
        }
        LockOutcome {
            cleared,
            game_over: self.game_over,
        }
    }

    /// One gravity step: fall a row, or lock if blocked. Returns false once the game is over.
    pub fn tick(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        if !self.try_move(0, 1) {
            self.lock_piece();
        }
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.try_move(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_move(1, 0)
    }

    /// One row down. Never locks; a blocked drop waits for gravity.
    pub fn soft_drop(&mut self) -> bool {
        self.try_move(0, 1)
    }

    pub fn rotate_piece(&mut self) -> bool {
        self.handle_rotate()
    }

    /// Empty field, zero score, back to playing with a new piece.
    pub fn reset(&mut self) {
        self.field = Field::new();
        self.score = 0;
        self.lines_cleared = 0;
        self.game_over = false;
        self.spawn_piece();
    }
}
