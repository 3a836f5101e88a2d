//! Synchronous notifications raised by the game loop.
//!
//! Grid mutations are buffered and dispatched once the operation that caused
//! them has finished, so a callback never sees a half-applied move. Callbacks
//! cannot borrow the game, so they ask for pause/resume through
//! [`LoopControl`]; the request is applied right after dispatch.

use crate::game::RunState;
use crate::grid::{Cell, Direction, GridEvent, Pos};
use crate::piece::{Piece, PieceId};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    CellFilled { pos: Pos, piece: PieceId },
    CellEmptied { pos: Pos },
    PieceMoved { piece: PieceId, direction: Direction },
    PieceRotated { piece: PieceId, clockwise: bool },
    RowCleared(i32),
    StateChanged { from: RunState, to: RunState },
    TickCompleted,
}

impl From<GridEvent> for Event {
    fn from(e: GridEvent) -> Self {
        match e {
            GridEvent::Filled { pos, piece } => Self::CellFilled { pos, piece },
            GridEvent::Emptied { pos } => Self::CellEmptied { pos },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    Pause,
    Resume,
}

/// Handle given to every callback. The last request wins.
#[derive(Debug, Default)]
pub struct LoopControl {
    request: Option<Request>,
}

impl LoopControl {
    pub fn pause(&mut self) {
        self.request = Some(Request::Pause);
    }

    pub fn resume(&mut self) {
        self.request = Some(Request::Resume);
    }

    pub(crate) fn pause_requested(&self) -> bool {
        self.request == Some(Request::Pause)
    }

    pub(crate) fn resume_requested(&self) -> bool {
        self.request == Some(Request::Resume)
    }
}

/// View-side listener. Every method defaults to doing nothing.
#[allow(unused_variables)]
pub trait Observer {
    fn on_cell_filled(&mut self, cell: &Cell, piece: &Piece, ctl: &mut LoopControl) {}
    fn on_cell_emptied(&mut self, cell: &Cell, ctl: &mut LoopControl) {}
    fn on_piece_moved(&mut self, piece: &Piece, direction: Direction, ctl: &mut LoopControl) {}
    fn on_piece_rotated(&mut self, piece: &Piece, clockwise: bool, ctl: &mut LoopControl) {}
    fn on_row_cleared(&mut self, row: i32, ctl: &mut LoopControl) {}
    fn on_state_changed(&mut self, from: RunState, to: RunState, ctl: &mut LoopControl) {}
    fn on_tick_completed(&mut self, ctl: &mut LoopControl) {}
}

/// Shared observers, so the owner can keep reading what it collected.
impl<O: Observer> Observer for Rc<RefCell<O>> {
    fn on_cell_filled(&mut self, cell: &Cell, piece: &Piece, ctl: &mut LoopControl) {
        self.borrow_mut().on_cell_filled(cell, piece, ctl);
    }

    fn on_cell_emptied(&mut self, cell: &Cell, ctl: &mut LoopControl) {
        self.borrow_mut().on_cell_emptied(cell, ctl);
    }

    fn on_piece_moved(&mut self, piece: &Piece, direction: Direction, ctl: &mut LoopControl) {
        self.borrow_mut().on_piece_moved(piece, direction, ctl);
    }

    fn on_piece_rotated(&mut self, piece: &Piece, clockwise: bool, ctl: &mut LoopControl) {
        self.borrow_mut().on_piece_rotated(piece, clockwise, ctl);
    }

    fn on_row_cleared(&mut self, row: i32, ctl: &mut LoopControl) {
        self.borrow_mut().on_row_cleared(row, ctl);
    }

    fn on_state_changed(&mut self, from: RunState, to: RunState, ctl: &mut LoopControl) {
        self.borrow_mut().on_state_changed(from, to, ctl);
    }

    fn on_tick_completed(&mut self, ctl: &mut LoopControl) {
        self.borrow_mut().on_tick_completed(ctl);
    }
}

/// Records every notification as an [`Event`].
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<Event>,
}

impl EventLog {
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn rows_cleared(&self) -> Vec<i32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::RowCleared(y) => Some(*y),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Observer for EventLog {
    fn on_cell_filled(&mut self, cell: &Cell, piece: &Piece, _ctl: &mut LoopControl) {
        self.events.push(Event::CellFilled {
            pos: cell.pos(),
            piece: piece.id(),
        });
    }

    fn on_cell_emptied(&mut self, cell: &Cell, _ctl: &mut LoopControl) {
        self.events.push(Event::CellEmptied { pos: cell.pos() });
    }

    fn on_piece_moved(&mut self, piece: &Piece, direction: Direction, _ctl: &mut LoopControl) {
        self.events.push(Event::PieceMoved {
            piece: piece.id(),
            direction,
        });
    }

    fn on_piece_rotated(&mut self, piece: &Piece, clockwise: bool, _ctl: &mut LoopControl) {
        self.events.push(Event::PieceRotated {
            piece: piece.id(),
            clockwise,
        });
    }

    fn on_row_cleared(&mut self, row: i32, _ctl: &mut LoopControl) {
        self.events.push(Event::RowCleared(row));
    }

    fn on_state_changed(&mut self, from: RunState, to: RunState, _ctl: &mut LoopControl) {
        self.events.push(Event::StateChanged { from, to });
    }

    fn on_tick_completed(&mut self, _ctl: &mut LoopControl) {
        self.events.push(Event::TickCompleted);
    }
}
