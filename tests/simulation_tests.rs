//! End-to-end scenarios driven through the public `Game` API.

use splitris::{
    Action, Event, EventLog, Game, GameConfig, LoopControl, NoKeys, Observer, PieceKind, Pos,
    RunState,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

fn game(width: usize, height: usize) -> Game<Action> {
    Game::new(GameConfig::default().with_size(width, height).with_seed(5)).unwrap()
}

fn row_is_empty(g: &Game<Action>, y: i32) -> bool {
    g.grid().row(y).unwrap().iter().all(|c| !c.is_filled())
}

#[test]
fn straight_piece_drops_nineteen_rows() {
    let mut g = game(10, 20);
    let id = g.place(PieceKind::Straight, Pos::new(3, 19)).unwrap().unwrap();
    for step in 0..19 {
        assert!(g.apply(id, Action::MoveDown), "step {step}");
    }
    assert!(!g.apply(id, Action::MoveDown));
    let cells = g.piece(id).unwrap().filled_cells(g.grid());
    assert_eq!(
        cells,
        (3..7).map(|x| Pos::new(x, 0)).collect::<Vec<_>>()
    );
}

#[test]
fn single_row_clear_scores_and_empties_in_place() {
    let log = EventLog::shared();
    let mut g = game(10, 20);
    g.subscribe(log.clone());
    g.place(PieceKind::Straight, Pos::new(0, 0)).unwrap();
    g.place(PieceKind::Straight, Pos::new(4, 0)).unwrap();
    let square = g.place(PieceKind::Square, Pos::new(8, 0)).unwrap().unwrap();
    log.borrow_mut().clear();

    assert_eq!(g.clear_full_rows(), 1);
    assert_eq!(g.score(), 100);
    assert_eq!(g.cleared_rows(), 1);
    assert!(row_is_empty(&g, 0));
    assert_eq!(log.borrow().rows_cleared(), vec![0]);
    assert_eq!(
        log.borrow().count(|e| matches!(e, Event::CellEmptied { .. })),
        10
    );

    // The upper half of the square is still in row 1 and falls on the next pass.
    assert_eq!(
        g.piece(square).unwrap().filled_cells(g.grid()),
        vec![Pos::new(8, 1), Pos::new(9, 1)]
    );
    assert!(g.settle_step());
    assert_eq!(
        g.piece(square).unwrap().filled_cells(g.grid()),
        vec![Pos::new(8, 0), Pos::new(9, 0)]
    );
    assert!(!g.settle_step());
}

#[test]
fn four_rows_in_one_pass_score_double() {
    let mut g = game(4, 8);
    for y in 0..4 {
        g.place(PieceKind::Straight, Pos::new(0, y)).unwrap().unwrap();
    }
    assert_eq!(g.clear_full_rows(), 4);
    assert_eq!(g.score(), 800);
    assert_eq!(g.level(), 1);
    assert!((0..8).all(|y| row_is_empty(&g, y)));
}

#[test]
fn ten_rows_raise_the_level() {
    let mut g = game(4, 12);
    for y in 0..10 {
        g.place(PieceKind::Straight, Pos::new(0, y)).unwrap().unwrap();
    }
    assert_eq!(g.clear_full_rows(), 10);
    assert_eq!(g.score(), 3 * 10 * 100);
    assert_eq!(g.level(), 2);
    assert_eq!(g.descend_interval(), Duration::from_millis(960));
}

#[test]
fn rows_are_reported_top_down() {
    let log = EventLog::shared();
    let mut g = game(4, 6);
    g.subscribe(log.clone());
    g.place(PieceKind::Straight, Pos::new(0, 0)).unwrap();
    g.place(PieceKind::Square, Pos::new(0, 1)).unwrap();
    g.place(PieceKind::Straight, Pos::new(0, 3)).unwrap();
    assert_eq!(g.clear_full_rows(), 2);
    assert_eq!(log.borrow().rows_cleared(), vec![3, 0]);
}

#[test]
fn blocked_spawn_ends_the_game() {
    let mut g = game(4, 4);
    g.start();
    // Columns 0 and 1 are full; every spawn position needs column 1 near the top.
    g.place(PieceKind::Square, Pos::new(0, 0)).unwrap().unwrap();
    g.place(PieceKind::Square, Pos::new(0, 2)).unwrap().unwrap();

    g.tick(Instant::now(), &NoKeys).unwrap();
    assert_eq!(g.state(), RunState::GameOver);
    assert!(g.current_piece().is_none());

    let before: Vec<_> = g.grid().cells().to_vec();
    g.tick(Instant::now() + Duration::from_secs(5), &NoKeys).unwrap();
    assert_eq!(g.grid().cells(), &before[..]);
    assert_eq!(g.state(), RunState::GameOver);

    g.start();
    assert_eq!(g.state(), RunState::Running);
    assert!(g.grid().cells().iter().all(|c| !c.is_filled()));
}

#[derive(Default)]
struct PauseOnClear {
    rows: Vec<i32>,
}

impl Observer for PauseOnClear {
    fn on_row_cleared(&mut self, row: i32, ctl: &mut LoopControl) {
        self.rows.push(row);
        ctl.pause();
    }
}

#[test]
fn observer_pauses_on_row_clear() {
    let watcher = Rc::new(RefCell::new(PauseOnClear::default()));
    let mut g = game(4, 6);
    g.subscribe(Rc::clone(&watcher));
    g.start();
    g.place(PieceKind::Straight, Pos::new(0, 0)).unwrap();

    let t0 = Instant::now();
    g.tick(t0, &NoKeys).unwrap();
    assert_eq!(watcher.borrow().rows, vec![0]);
    assert_eq!(g.state(), RunState::Paused);
    assert_eq!(g.score(), 100);
    assert!(g.current_piece().is_none());

    // Paused: nothing spawns.
    g.tick(t0 + Duration::from_secs(2), &NoKeys).unwrap();
    assert!(g.current_piece().is_none());

    g.resume();
    g.tick(t0 + Duration::from_secs(4), &NoKeys).unwrap();
    assert!(g.current_piece().is_some());
}

#[test]
fn no_spawn_while_fragments_settle() {
    let mut g = game(4, 6);
    g.start();
    // A floating square falls one row per tick before a piece may spawn.
    g.place(PieceKind::Square, Pos::new(2, 2)).unwrap().unwrap();
    let t0 = Instant::now();
    g.tick(t0, &NoKeys).unwrap();
    assert!(g.current_piece().is_none());
    g.tick(t0 + Duration::from_millis(20), &NoKeys).unwrap();
    assert!(g.current_piece().is_none());
    // Landed on the floor: the next tick has nothing to settle, but the gravity
    // gate is still closed.
    g.tick(t0 + Duration::from_millis(40), &NoKeys).unwrap();
    assert!(g.current_piece().is_none());
    g.tick(t0 + Duration::from_millis(1100), &NoKeys).unwrap();
    assert!(g.current_piece().is_some());
}

#[test]
fn piece_falls_and_is_released() {
    let mut g = game(10, 20);
    g.start();
    let mut now = Instant::now();
    g.tick(now, &NoKeys).unwrap();
    let id = g.current_piece().unwrap().id();

    let mut ticks = 0;
    while g.current_piece().is_some() {
        now += Duration::from_millis(1001);
        g.tick(now, &NoKeys).unwrap();
        ticks += 1;
        assert!(ticks < 40, "piece never landed");
    }
    let lowest = g.piece(id).unwrap().filled_cells(g.grid())[0];
    assert_eq!(lowest.y, 0);
    assert!(g.piece(id).unwrap().is_complete(g.grid()));
}

#[test]
fn tick_completed_is_raised_only_while_running() {
    let log = EventLog::shared();
    let mut g = game(10, 20);
    g.subscribe(log.clone());
    let t0 = Instant::now();
    g.tick(t0, &NoKeys).unwrap();
    g.start();
    g.tick(t0, &NoKeys).unwrap();
    g.pause();
    g.tick(t0, &NoKeys).unwrap();
    assert_eq!(log.borrow().count(|e| *e == Event::TickCompleted), 1);
}
