//! Construction-time settings: board size, preview length, key bindings.

use crate::input::Action;

pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 20;
pub const DEFAULT_PREVIEW: usize = 3;

/// Key bound to each logical action. Keys are only compared for equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings<K> {
    pub move_left: K,
    pub move_right: K,
    pub move_down: K,
    pub hard_drop: K,
    pub rotate_clockwise: K,
    pub rotate_counter_clockwise: K,
}

impl<K> KeyBindings<K> {
    pub const fn key(&self, action: Action) -> &K {
        match action {
            Action::MoveLeft => &self.move_left,
            Action::MoveRight => &self.move_right,
            Action::MoveDown => &self.move_down,
            Action::HardDrop => &self.hard_drop,
            Action::RotateClockwise => &self.rotate_clockwise,
            Action::RotateCounterClockwise => &self.rotate_counter_clockwise,
        }
    }
}

/// Bindings that use the actions themselves as keys.
impl Default for KeyBindings<Action> {
    fn default() -> Self {
        Self {
            move_left: Action::MoveLeft,
            move_right: Action::MoveRight,
            move_down: Action::MoveDown,
            hard_drop: Action::HardDrop,
            rotate_clockwise: Action::RotateClockwise,
            rotate_counter_clockwise: Action::RotateCounterClockwise,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameConfig<K> {
    pub width: usize,
    pub height: usize,
    /// Number of upcoming pieces kept in the queue.
    pub preview: usize,
    pub bindings: KeyBindings<K>,
    /// Fixed seed for the piece sequence; entropy when `None`.
    pub seed: Option<u64>,
}

impl<K> GameConfig<K> {
    pub fn new(bindings: KeyBindings<K>) -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            preview: DEFAULT_PREVIEW,
            bindings,
            seed: None,
        }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_preview(mut self, preview: usize) -> Self {
        self.preview = preview;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for GameConfig<Action> {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}
