//! Property tests for grid addressing, region splitting and the all-or-nothing
//! move/rotate contract.

use proptest::prelude::*;
use splitris::{Direction, Grid, Piece, PieceId, PieceKind, Pos};
use std::collections::BTreeSet;

fn kind() -> impl Strategy<Value = PieceKind> {
    prop::sample::select(PieceKind::ALL.to_vec())
}

fn direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(vec![Direction::Left, Direction::Right, Direction::Down])
}

/// Fill the template of a fresh piece at `corner` and join it. `None` if it
/// does not fit.
fn put(grid: &mut Grid, id: u64, kind: PieceKind, corner: Pos) -> Option<Piece> {
    let mut piece = Piece::new(PieceId::new(id), kind).ok()?;
    let targets: Vec<Pos> = piece
        .template()
        .cells()
        .iter()
        .map(|c| Pos::new(corner.x + c.x, corner.y + c.y))
        .collect();
    if !targets.iter().all(|&p| grid.is_empty_at(p)) {
        return None;
    }
    for p in targets {
        grid.fill(p, piece.id());
    }
    piece.join(grid).ok()?;
    Some(piece)
}

fn is_connected(region: &[Pos]) -> bool {
    let set: BTreeSet<Pos> = region.iter().copied().collect();
    let Some(&start) = region.first() else {
        return false;
    };
    let mut seen = BTreeSet::from([start]);
    let mut stack = vec![start];
    while let Some(p) = stack.pop() {
        for d in Direction::ALL {
            let n = p.step(d);
            if set.contains(&n) && seen.insert(n) {
                stack.push(n);
            }
        }
    }
    seen.len() == set.len()
}

proptest! {
    #[test]
    fn cell_at_matches_bounds(
        width in 1usize..16,
        height in 1usize..24,
        x in -30i32..30,
        y in -30i32..30,
    ) {
        let grid = Grid::new(width, height).unwrap();
        let inside = (0..width as i32).contains(&x) && (0..height as i32).contains(&y);
        match grid.cell_at(x, y) {
            Some(cell) => {
                prop_assert!(inside);
                prop_assert_eq!(cell.pos(), Pos::new(x, y));
            }
            None => prop_assert!(!inside),
        }
    }

    #[test]
    fn regions_partition_filled_cells(
        kind in kind(),
        cx in 0i32..6,
        cy in 0i32..6,
        turns in 0usize..4,
        holes in prop::collection::vec((0i32..10, 0i32..10), 0..4),
    ) {
        let mut grid = Grid::new(10, 10).unwrap();
        let placed = put(&mut grid, 1, kind, Pos::new(cx, cy));
        prop_assume!(placed.is_some());
        let Some(mut piece) = placed else {
            return Ok(());
        };
        for _ in 0..turns {
            piece.rotate(&mut grid, true);
        }
        for (x, y) in holes {
            grid.empty(Pos::new(x, y));
        }

        let filled: BTreeSet<Pos> = piece.filled_cells(&grid).into_iter().collect();
        prop_assert!(filled.len() <= piece.template().len());

        let regions = piece.regions(&grid);
        let mut union = BTreeSet::new();
        for region in &regions {
            prop_assert!(is_connected(region));
            for p in region {
                prop_assert!(union.insert(*p), "cell {:?} in two regions", p);
            }
        }
        prop_assert_eq!(union, filled);
    }

    #[test]
    fn pieces_hanging_over_the_wall_are_not_placed(kind in kind(), cy in 0i32..7) {
        let mut grid = Grid::new(8, 8).unwrap();
        let template = kind.template().unwrap();
        let rightmost = template.cells().iter().map(|c| c.x).max().unwrap();
        let cx = 8 - rightmost;
        prop_assert!(put(&mut grid, 1, kind, Pos::new(cx, cy)).is_none());
        prop_assert!(grid.cells().iter().all(|c| !c.is_filled()));
    }

    #[test]
    fn failed_moves_change_nothing(
        pieces in prop::collection::vec((kind(), 0i32..6, 0i32..8), 1..6),
        moves in prop::collection::vec((0usize..6, direction()), 1..30),
    ) {
        let mut grid = Grid::new(6, 8).unwrap();
        let mut placed: Vec<Piece> = Vec::new();
        for (i, (kind, x, y)) in pieces.into_iter().enumerate() {
            if let Some(p) = put(&mut grid, i as u64 + 1, kind, Pos::new(x, y)) {
                placed.push(p);
            }
        }
        prop_assume!(!placed.is_empty());
        grid.take_events();

        for (pick, direction) in moves {
            let n = placed.len();
            let piece = &mut placed[pick % n];
            let before = grid.cells().to_vec();
            let count = piece.filled_cells(&grid).len();
            if piece.try_move(&mut grid, direction) {
                prop_assert_eq!(piece.filled_cells(&grid).len(), count);
                grid.take_events();
            } else {
                prop_assert_eq!(grid.cells(), &before[..]);
                prop_assert!(!grid.has_pending_events());
            }
        }
    }

    #[test]
    fn rotation_is_reversible_or_refused(
        kind in kind(),
        cx in 0i32..7,
        cy in 0i32..7,
        clockwise in any::<bool>(),
    ) {
        let mut grid = Grid::new(8, 8).unwrap();
        let placed = put(&mut grid, 1, kind, Pos::new(cx, cy));
        prop_assume!(placed.is_some());
        let Some(mut piece) = placed else {
            return Ok(());
        };
        let start = piece.filled_cells(&grid);
        grid.take_events();

        if piece.rotate(&mut grid, clockwise) {
            prop_assert!(kind.can_rotate());
            prop_assert_eq!(piece.filled_cells(&grid).len(), start.len());
            prop_assert!(piece.rotate(&mut grid, !clockwise));
            prop_assert_eq!(piece.filled_cells(&grid), start);
        } else {
            prop_assert_eq!(piece.filled_cells(&grid), start);
            prop_assert!(!grid.has_pending_events());
        }
    }
}
