//! Playfield: fixed grid of cells with a piece → cells index.
//!
//! y = 0 is the bottom row and y = height - 1 the top row. Cells are stored
//! row-major so a row is a contiguous slice.

use crate::error::EngineError;
use crate::piece::PieceId;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Grid coordinate. Signed so that neighbour and rotation arithmetic can step
/// outside the grid before being rejected by a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// One step in `direction`, without bounds checks.
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }
}

// Bottom row first, then left to right.
impl Ord for Pos {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Up => (0, 1),
            Self::Down => (0, -1),
        }
    }
}

/// Single addressable grid position and the piece filling it, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pos: Pos,
    occupant: Option<PieceId>,
}

impl Cell {
    const fn new(pos: Pos) -> Self {
        Self {
            pos,
            occupant: None,
        }
    }

    #[inline]
    pub const fn pos(&self) -> Pos {
        self.pos
    }

    #[inline]
    pub const fn x(&self) -> i32 {
        self.pos.x
    }

    #[inline]
    pub const fn y(&self) -> i32 {
        self.pos.y
    }

    #[inline]
    pub const fn occupant(&self) -> Option<PieceId> {
        self.occupant
    }

    #[inline]
    pub const fn is_filled(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Cell mutation recorded by the grid, drained and dispatched by the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEvent {
    Filled { pos: Pos, piece: PieceId },
    Emptied { pos: Pos },
}

#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    /// Piece → cells it fills. Kept in step with `cells` by `fill`/`empty`.
    occupancy: HashMap<PieceId, BTreeSet<Pos>>,
    events: Vec<GridEvent>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions { width, height });
        }
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell::new(Pos::new(x as i32, y as i32))))
            .collect();
        Ok(Self {
            width,
            height,
            cells,
            occupancy: HashMap::new(),
            events: Vec::new(),
        })
    }

    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Cell at (x, y), or `None` outside the grid.
    #[inline]
    pub fn cell_at(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    #[inline]
    pub fn cell(&self, pos: Pos) -> Option<&Cell> {
        self.cell_at(pos.x, pos.y)
    }

    /// Cells of row `y`, left to right.
    pub fn row(&self, y: i32) -> Option<&[Cell]> {
        let start = self.index(0, y)?;
        Some(&self.cells[start..start + self.width])
    }

    /// All cells, bottom row first.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Neighbouring position, `None` at the grid boundary.
    pub fn neighbor(&self, pos: Pos, direction: Direction) -> Option<Pos> {
        let next = pos.step(direction);
        self.index(next.x, next.y).map(|_| next)
    }

    #[inline]
    pub fn occupant(&self, pos: Pos) -> Option<PieceId> {
        self.cell(pos).and_then(Cell::occupant)
    }

    #[inline]
    pub fn is_empty_at(&self, pos: Pos) -> bool {
        self.cell(pos).is_some_and(|c| !c.is_filled())
    }

    /// Cells currently filled by `piece`, ordered bottom row first.
    pub fn cells_of(&self, piece: PieceId) -> impl Iterator<Item = Pos> + '_ {
        self.occupancy.get(&piece).into_iter().flatten().copied()
    }

    pub fn filled_count(&self, piece: PieceId) -> usize {
        self.occupancy.get(&piece).map_or(0, BTreeSet::len)
    }

    /// Ids of every piece with at least one filled cell.
    pub fn occupied_pieces(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.occupancy.keys().copied()
    }

    pub fn is_row_full(&self, y: i32) -> bool {
        self.row(y).is_some_and(|row| row.iter().all(Cell::is_filled))
    }

    /// Fill the cell at `pos` with `piece`. Out-of-grid positions are ignored.
    pub fn fill(&mut self, pos: Pos, piece: PieceId) {
        let Some(i) = self.index(pos.x, pos.y) else {
            return;
        };
        if let Some(previous) = self.cells[i].occupant.replace(piece) {
            self.unindex(previous, pos);
        }
        self.occupancy.entry(piece).or_default().insert(pos);
        self.events.push(GridEvent::Filled { pos, piece });
    }

    /// Release the cell at `pos` from its piece, if any.
    pub fn empty(&mut self, pos: Pos) {
        let Some(i) = self.index(pos.x, pos.y) else {
            return;
        };
        if let Some(previous) = self.cells[i].occupant.take() {
            self.unindex(previous, pos);
        }
        self.events.push(GridEvent::Emptied { pos });
    }

    /// Empty every cell of row `y`.
    pub fn clear_row(&mut self, y: i32) {
        for x in 0..self.width as i32 {
            self.empty(Pos::new(x, y));
        }
    }

    /// Empty every filled cell of the grid.
    pub fn clear(&mut self) {
        let filled: Vec<Pos> = self.occupancy.values().flatten().copied().collect();
        for pos in filled {
            self.empty(pos);
        }
    }

    fn unindex(&mut self, piece: PieceId, pos: Pos) {
        if let Some(set) = self.occupancy.get_mut(&piece) {
            set.remove(&pos);
            if set.is_empty() {
                self.occupancy.remove(&piece);
            }
        }
    }

    /// Drain the cell events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }
}
