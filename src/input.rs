//! Logical actions, the held-key query the game polls, and per-group
//! cooldowns that rate-limit held keys.

use std::collections::HashSet;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Action the player can hold down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveDown,
    HardDrop,
    RotateClockwise,
    RotateCounterClockwise,
}

impl Action {
    /// Polling order. Every held action of a ready group fires once per tick.
    pub const ALL: [Self; 6] = [
        Self::MoveLeft,
        Self::MoveRight,
        Self::MoveDown,
        Self::HardDrop,
        Self::RotateClockwise,
        Self::RotateCounterClockwise,
    ];

    pub const fn group(self) -> ActionGroup {
        match self {
            Self::MoveLeft | Self::MoveRight => ActionGroup::Sideways,
            Self::MoveDown | Self::HardDrop => ActionGroup::Drop,
            Self::RotateClockwise | Self::RotateCounterClockwise => ActionGroup::Rotate,
        }
    }
}

/// Actions sharing one cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionGroup {
    Sideways,
    Drop,
    Rotate,
}

impl ActionGroup {
    pub const ALL: [Self; 3] = [Self::Sideways, Self::Drop, Self::Rotate];

    pub const fn cooldown(self) -> Duration {
        match self {
            Self::Sideways => Duration::from_millis(100),
            Self::Drop => Duration::from_millis(50),
            Self::Rotate => Duration::from_millis(150),
        }
    }

    /// Position in [`ActionGroup::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Sideways => 0,
            Self::Drop => 1,
            Self::Rotate => 2,
        }
    }
}

/// "Is this key held right now?" The game knows nothing else about devices.
pub trait KeyState<K> {
    fn is_held(&self, key: &K) -> bool;
}

impl<K: Eq + Hash> KeyState<K> for HashSet<K> {
    fn is_held(&self, key: &K) -> bool {
        self.contains(key)
    }
}

/// Nothing held.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKeys;

impl<K> KeyState<K> for NoKeys {
    fn is_held(&self, _key: &K) -> bool {
        false
    }
}

/// Time of the last accepted action per group.
#[derive(Debug, Clone, Default)]
pub struct Cooldowns {
    last: [Option<Instant>; 3],
}

impl Cooldowns {
    pub fn ready(&self, group: ActionGroup, now: Instant) -> bool {
        self.last[group.index()]
            .is_none_or(|t| now.saturating_duration_since(t) >= group.cooldown())
    }

    pub fn accept(&mut self, group: ActionGroup, now: Instant) {
        self.last[group.index()] = Some(now);
    }

    pub fn reset(&mut self) {
        self.last = [None; 3];
    }
}
