//! Game loop: input, gravity, spawning, settling, line clears, scoring and
//! the run state machine.
//!
//! Cleared rows are emptied in place; nothing above them is shifted. Pieces
//! that lost cells fall back down one step per tick through [`Game::settle_step`],
//! each connected fragment on its own, until nothing moves. Only then is a
//! new piece spawned.

use crate::config::GameConfig;
use crate::error::EngineError;
use crate::grid::{Direction, Grid, Pos};
use crate::input::{Action, ActionGroup, Cooldowns, KeyState};
use crate::observer::{Event, LoopControl, Observer};
use crate::piece::{Piece, PieceId};
use crate::rng::Randomizer;
use crate::scoring::Progress;
use crate::shape::PieceKind;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    Stopped,
    Running,
    Paused,
    GameOver,
}

pub struct Game<K> {
    config: GameConfig<K>,
    grid: Grid,
    pieces: HashMap<PieceId, Piece>,
    /// Piece under player control and gravity.
    current: Option<PieceId>,
    upcoming: VecDeque<PieceKind>,
    randomizer: Randomizer,
    progress: Progress,
    state: RunState,
    cooldowns: Cooldowns,
    /// `None` until the first gravity step after `start`.
    last_descend: Option<Instant>,
    next_id: u64,
    observers: Vec<Box<dyn Observer>>,
    /// Game-level notifications waiting for the next `flush`.
    pending: Vec<Event>,
}

impl<K> Game<K> {
    pub fn new(config: GameConfig<K>) -> Result<Self, EngineError> {
        let grid = Grid::new(config.width, config.height)?;
        let randomizer = Randomizer::new(config.seed);
        Ok(Self {
            config,
            grid,
            pieces: HashMap::new(),
            current: None,
            upcoming: VecDeque::new(),
            randomizer,
            progress: Progress::default(),
            state: RunState::Stopped,
            cooldowns: Cooldowns::default(),
            last_descend: None,
            next_id: 1,
            observers: Vec::new(),
            pending: Vec::new(),
        })
    }

    pub fn subscribe(&mut self, observer: impl Observer + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub const fn config(&self) -> &GameConfig<K> {
        &self.config
    }

    pub const fn state(&self) -> RunState {
        self.state
    }

    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    pub const fn progress(&self) -> &Progress {
        &self.progress
    }

    pub const fn score(&self) -> u64 {
        self.progress.score
    }

    pub const fn level(&self) -> u32 {
        self.progress.level
    }

    pub const fn cleared_rows(&self) -> u64 {
        self.progress.cleared_rows
    }

    pub const fn descend_interval(&self) -> Duration {
        self.progress.descend_interval
    }

    pub fn current_piece(&self) -> Option<&Piece> {
        self.current.and_then(|id| self.pieces.get(&id))
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    /// Pieces that still fill at least one cell.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    /// Upcoming kinds, next first.
    pub fn upcoming(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.upcoming.iter().copied()
    }

    // --- state machine ---

    /// Begin a new game from `Stopped` or `GameOver`.
    pub fn start(&mut self) {
        if !matches!(self.state, RunState::Stopped | RunState::GameOver) {
            return;
        }
        self.reset();
        self.refill_upcoming();
        self.set_state(RunState::Running);
        self.flush();
    }

    /// End the game from any state and discard the board.
    pub fn stop(&mut self) {
        self.set_state(RunState::Stopped);
        self.reset();
        self.flush();
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.set_state(RunState::Paused);
            self.flush();
        }
    }

    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            self.set_state(RunState::Running);
            self.flush();
        }
    }

    fn set_state(&mut self, to: RunState) {
        let from = self.state;
        if from != to {
            self.state = to;
            self.pending.push(Event::StateChanged { from, to });
        }
    }

    fn reset(&mut self) {
        self.grid.clear();
        self.pieces.clear();
        self.upcoming.clear();
        self.current = None;
        self.progress = Progress::default();
        self.cooldowns.reset();
        self.last_descend = None;
    }

    // --- the tick ---

    /// Advance the simulation by one step. Ignored unless `Running`.
    pub fn tick<S>(&mut self, now: Instant, keys: &S) -> Result<(), EngineError>
    where
        S: KeyState<K> + ?Sized,
    {
        if self.state != RunState::Running {
            return Ok(());
        }

        self.handle_input(now, keys);

        // A new piece may only drop once nothing is settling and no row is full.
        let may_spawn = self.current.is_none() && !self.settle_step() && self.clear_full_rows() == 0;

        if self.gravity_due(now) {
            self.last_descend = Some(now);
            match self.current {
                Some(id) => {
                    if !self.move_piece(id, Direction::Down) {
                        self.current = None;
                    }
                }
                None if may_spawn => {
                    if !self.spawn_next()? {
                        self.set_state(RunState::GameOver);
                    }
                }
                None => {}
            }
        }

        self.pieces.retain(|id, _| self.grid.filled_count(*id) > 0);
        self.pending.push(Event::TickCompleted);
        self.flush();
        Ok(())
    }

    fn gravity_due(&self, now: Instant) -> bool {
        self.last_descend
            .is_none_or(|t| now.saturating_duration_since(t) > self.progress.descend_interval)
    }

    fn handle_input<S>(&mut self, now: Instant, keys: &S)
    where
        S: KeyState<K> + ?Sized,
    {
        let Some(id) = self.current else {
            return;
        };
        // Readiness is sampled once per group; every held action of a ready
        // group fires, in `Action::ALL` order.
        let ready = ActionGroup::ALL.map(|group| self.cooldowns.ready(group, now));
        let mut accepted = [false; 3];
        for action in Action::ALL {
            let slot = action.group().index();
            if !ready[slot] || !keys.is_held(self.config.bindings.key(action)) {
                continue;
            }
            accepted[slot] = true;
            self.apply(id, action);
        }
        for (group, accepted) in ActionGroup::ALL.into_iter().zip(accepted) {
            if accepted {
                self.cooldowns.accept(group, now);
            }
        }
    }

    /// Perform `action` on piece `id`. Returns whether the board changed.
    pub fn apply(&mut self, id: PieceId, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.move_piece(id, Direction::Left),
            Action::MoveRight => self.move_piece(id, Direction::Right),
            Action::MoveDown => self.move_piece(id, Direction::Down),
            Action::HardDrop => {
                let Some(piece) = self.pieces.get_mut(&id) else {
                    return false;
                };
                let slid = piece.slide(&mut self.grid);
                if slid {
                    self.pending.push(Event::PieceMoved {
                        piece: id,
                        direction: Direction::Down,
                    });
                }
                self.flush();
                slid
            }
            Action::RotateClockwise => self.rotate_piece(id, true),
            Action::RotateCounterClockwise => self.rotate_piece(id, false),
        }
    }

    fn move_piece(&mut self, id: PieceId, direction: Direction) -> bool {
        let Some(piece) = self.pieces.get_mut(&id) else {
            return false;
        };
        let moved = piece.try_move(&mut self.grid, direction);
        if moved {
            self.pending.push(Event::PieceMoved {
                piece: id,
                direction,
            });
        }
        self.flush();
        moved
    }

    fn rotate_piece(&mut self, id: PieceId, clockwise: bool) -> bool {
        let Some(piece) = self.pieces.get_mut(&id) else {
            return false;
        };
        let rotated = piece.rotate(&mut self.grid, clockwise);
        if rotated {
            self.pending.push(Event::PieceRotated {
                piece: id,
                clockwise,
            });
        }
        self.flush();
        rotated
    }

    /// Let every piece except the current one fall one step, bottom-most first.
    /// Returns whether anything moved.
    pub fn settle_step(&mut self) -> bool {
        let mut order: Vec<(Pos, PieceId)> = self
            .grid
            .occupied_pieces()
            .filter(|id| Some(*id) != self.current)
            .filter_map(|id| self.grid.cells_of(id).next().map(|lowest| (lowest, id)))
            .collect();
        order.sort_unstable();

        let mut moved = false;
        for (_, id) in order {
            if self.move_piece(id, Direction::Down) {
                moved = true;
            }
        }
        moved
    }

    /// Empty every full row, top to bottom, and score the pass.
    /// Returns the number of rows cleared.
    pub fn clear_full_rows(&mut self) -> u32 {
        let mut cleared = 0;
        for y in (0..self.grid.height() as i32).rev() {
            if self.grid.is_row_full(y) {
                self.grid.clear_row(y);
                cleared += 1;
                self.pending.push(Event::RowCleared(y));
                self.flush();
            }
        }
        self.progress.record_clear(cleared);
        cleared
    }

    /// Drop the next upcoming piece at the top centre. Returns `false` when
    /// the spawn area is blocked.
    fn spawn_next(&mut self) -> Result<bool, EngineError> {
        if self.upcoming.is_empty() {
            self.upcoming.push_back(self.randomizer.next_kind());
        }
        let Some(&kind) = self.upcoming.front() else {
            return Ok(false);
        };
        let template = kind.template()?;
        let dx = (self.grid.width() as i32 - template.size()) / 2;
        let dy = self.grid.height() as i32 - 1 - template.max_y();

        let Some(id) = self.put(kind, Pos::new(dx, dy))? else {
            return Ok(false);
        };
        self.upcoming.pop_front();
        self.refill_upcoming();
        self.current = Some(id);
        Ok(true)
    }

    /// Put a settled piece with its template corner at `corner`, for building
    /// boards by hand. Returns `None` if any target cell is taken or missing.
    pub fn place(&mut self, kind: PieceKind, corner: Pos) -> Result<Option<PieceId>, EngineError> {
        self.put(kind, corner)
    }

    fn put(&mut self, kind: PieceKind, corner: Pos) -> Result<Option<PieceId>, EngineError> {
        let id = PieceId::new(self.next_id);
        let mut piece = Piece::new(id, kind)?;
        let targets: Vec<Pos> = piece
            .template()
            .cells()
            .iter()
            .map(|c| Pos::new(corner.x + c.x, corner.y + c.y))
            .collect();
        if !targets.iter().all(|&p| self.grid.is_empty_at(p)) {
            return Ok(None);
        }

        self.next_id += 1;
        for p in targets {
            self.grid.fill(p, id);
        }
        piece.join(&self.grid)?;
        self.pieces.insert(id, piece);
        self.flush();
        Ok(Some(id))
    }

    fn refill_upcoming(&mut self) {
        while self.upcoming.len() < self.config.preview {
            self.upcoming.push_back(self.randomizer.next_kind());
        }
    }

    // --- notifications ---

    /// Dispatch buffered cell changes, then game events, to every observer.
    /// Pause/resume requests are applied after each batch.
    fn flush(&mut self) {
        loop {
            let mut batch: Vec<Event> = self
                .grid
                .take_events()
                .into_iter()
                .map(Event::from)
                .collect();
            batch.append(&mut self.pending);
            if batch.is_empty() || self.observers.is_empty() {
                return;
            }

            let mut ctl = LoopControl::default();
            for event in &batch {
                for observer in &mut self.observers {
                    dispatch(observer.as_mut(), event, &self.grid, &self.pieces, &mut ctl);
                }
            }

            if ctl.pause_requested() && self.state == RunState::Running {
                self.set_state(RunState::Paused);
            } else if ctl.resume_requested() && self.state == RunState::Paused {
                self.set_state(RunState::Running);
            }
        }
    }
}

fn dispatch(
    observer: &mut dyn Observer,
    event: &Event,
    grid: &Grid,
    pieces: &HashMap<PieceId, Piece>,
    ctl: &mut LoopControl,
) {
    match *event {
        Event::CellFilled { pos, piece } => {
            if let (Some(cell), Some(piece)) = (grid.cell(pos), pieces.get(&piece)) {
                observer.on_cell_filled(cell, piece, ctl);
            }
        }
        Event::CellEmptied { pos } => {
            if let Some(cell) = grid.cell(pos) {
                observer.on_cell_emptied(cell, ctl);
            }
        }
        Event::PieceMoved { piece, direction } => {
            if let Some(piece) = pieces.get(&piece) {
                observer.on_piece_moved(piece, direction, ctl);
            }
        }
        Event::PieceRotated { piece, clockwise } => {
            if let Some(piece) = pieces.get(&piece) {
                observer.on_piece_rotated(piece, clockwise, ctl);
            }
        }
        Event::RowCleared(row) => observer.on_row_cleared(row, ctl),
        Event::StateChanged { from, to } => observer.on_state_changed(from, to, ctl),
        Event::TickCompleted => observer.on_tick_completed(ctl),
    }
}
