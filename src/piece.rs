//! Pieces: template geometry plus the move/rotate/split algorithms that
//! rewrite grid occupancy.
//!
//! A piece never stores its cells. The grid's occupancy index is the single
//! source of truth, so a row clear that empties part of a piece is seen by
//! every later query. After such a clear the remaining cells may fall apart
//! into several regions, and [`Piece::try_move`] moves each region on its own.

use crate::error::EngineError;
use crate::grid::{Direction, Grid, Pos};
use crate::shape::{PieceKind, Rgb, Template};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(u64);

impl PieceId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Piece {
    id: PieceId,
    kind: PieceKind,
    template: Template,
    /// Grid cell the piece rotates around; set by `join`.
    origin_cell: Option<Pos>,
}

impl Piece {
    pub fn new(id: PieceId, kind: PieceKind) -> Result<Self, EngineError> {
        Ok(Self {
            id,
            kind,
            template: kind.template()?,
            origin_cell: None,
        })
    }

    #[inline]
    pub const fn id(&self) -> PieceId {
        self.id
    }

    #[inline]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[inline]
    pub const fn color(&self) -> Rgb {
        self.kind.color()
    }

    pub const fn template(&self) -> &Template {
        &self.template
    }

    pub fn size(&self) -> i32 {
        self.template.size()
    }

    pub const fn rotation_origin_cell(&self) -> Option<Pos> {
        self.origin_cell
    }

    /// Cells currently filled by this piece, bottom row first.
    pub fn filled_cells(&self, grid: &Grid) -> Vec<Pos> {
        grid.cells_of(self.id).collect()
    }

    /// True while no cell of the piece has been cleared.
    pub fn is_complete(&self, grid: &Grid) -> bool {
        grid.filled_count(self.id) == self.template.len()
    }

    /// Partition of the filled cells into 4-connected regions (flood fill).
    pub fn regions(&self, grid: &Grid) -> Vec<Vec<Pos>> {
        let mut remaining: BTreeSet<Pos> = grid.cells_of(self.id).collect();
        let mut regions = Vec::new();

        while let Some(start) = remaining.pop_first() {
            let mut region = vec![start];
            let mut stack = vec![start];
            while let Some(pos) = stack.pop() {
                for direction in Direction::ALL {
                    if let Some(next) = grid.neighbor(pos, direction) {
                        if remaining.remove(&next) {
                            region.push(next);
                            stack.push(next);
                        }
                    }
                }
            }
            region.sort_unstable();
            regions.push(region);
        }
        regions
    }

    /// Bind the piece to cells already filled with it and locate the grid cell
    /// matching the template rotation origin.
    pub fn join(&mut self, grid: &Grid) -> Result<(), EngineError> {
        let filled: BTreeSet<Pos> = grid.cells_of(self.id).collect();
        let not_placed = EngineError::NotPlaced { piece: self.id };
        let (Some(min_x), Some(min_y)) = (
            filled.iter().map(|p| p.x).min(),
            filled.iter().map(|p| p.y).min(),
        ) else {
            return Err(not_placed);
        };

        let corner = self.template.min_corner();
        let (dx, dy) = (min_x - corner.x, min_y - corner.y);
        let expected: BTreeSet<Pos> = self
            .template
            .cells()
            .iter()
            .map(|c| Pos::new(c.x + dx, c.y + dy))
            .collect();
        if expected != filled {
            return Err(not_placed);
        }

        let origin = self.template.rotation_origin();
        self.origin_cell = Some(Pos::new(origin.x + dx, origin.y + dy));
        Ok(())
    }

    /// Move every region one cell in `direction`. Blocked regions stay put.
    /// Returns true if at least one region moved.
    pub fn try_move(&mut self, grid: &mut Grid, direction: Direction) -> bool {
        let mut moved = false;

        for region in self.regions(grid) {
            let Some(destination) = region
                .iter()
                .map(|&p| grid.neighbor(p, direction))
                .collect::<Option<Vec<_>>>()
            else {
                continue;
            };
            let carries_origin = self.origin_cell.is_some_and(|o| region.contains(&o));
            if swap_cells(grid, &region, &destination) {
                moved = true;
                if carries_origin {
                    self.origin_cell = self.origin_cell.map(|o| o.step(direction));
                }
            }
        }
        moved
    }

    /// Move down until blocked. Returns whether the piece moved at all.
    pub fn slide(&mut self, grid: &mut Grid) -> bool {
        let mut slid = false;
        while self.try_move(grid, Direction::Down) {
            slid = true;
        }
        slid
    }

    /// Rotate all filled cells 90 degrees around the rotation origin cell.
    pub fn rotate(&mut self, grid: &mut Grid, clockwise: bool) -> bool {
        if !self.kind.can_rotate() {
            return false;
        }
        let Some(origin) = self.origin_cell else {
            return false;
        };
        let source = self.filled_cells(grid);
        if !source.contains(&origin) {
            return false;
        }

        let Some(destination) = source
            .iter()
            .map(|&p| {
                let target = rotate_about(p, origin, clockwise);
                grid.cell(target).map(|c| c.pos())
            })
            .collect::<Option<Vec<_>>>()
        else {
            return false;
        };
        swap_cells(grid, &source, &destination)
    }
}

/// Quarter turn of `pos` around `origin` in the y-up grid.
fn rotate_about(pos: Pos, origin: Pos, clockwise: bool) -> Pos {
    let (dx, dy) = (pos.x - origin.x, pos.y - origin.y);
    let (rx, ry) = if clockwise { (dy, -dx) } else { (-dy, dx) };
    Pos::new(origin.x + rx, origin.y + ry)
}

/// Move the content of `source` to `destination`, all or nothing.
///
/// Every source cell must hold the same piece and every destination must be
/// empty or part of the source.
fn swap_cells(grid: &mut Grid, source: &[Pos], destination: &[Pos]) -> bool {
    if source.is_empty() || source.len() != destination.len() {
        return false;
    }
    let Some(piece) = grid.occupant(source[0]) else {
        return false;
    };
    if !source.iter().all(|&p| grid.occupant(p) == Some(piece)) {
        return false;
    }
    let members: HashSet<Pos> = source.iter().copied().collect();
    let free = |p: &Pos| grid.cell(*p).is_some_and(|c| !c.is_filled() || members.contains(p));
    if !destination.iter().all(free) {
        return false;
    }

    for &p in source {
        grid.empty(p);
    }
    for &p in destination {
        grid.fill(p, piece);
    }
    true
}
