//! Terminal keys: default bindings, app commands, and the held-key set the
//! engine polls every tick.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use splitris::{KeyBindings, KeyState};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How long a press counts as held on terminals that never report release.
/// Auto-repeat refreshes it while the key stays down.
const HOLD_TIMEOUT: Duration = Duration::from_millis(120);

/// Arrows move, `s` slides to the floor, `c` and Up rotate.
pub fn default_bindings() -> KeyBindings<KeyCode> {
    KeyBindings {
        move_left: KeyCode::Left,
        move_right: KeyCode::Right,
        move_down: KeyCode::Down,
        hard_drop: KeyCode::Char('s'),
        rotate_clockwise: KeyCode::Char('c'),
        rotate_counter_clockwise: KeyCode::Up,
    }
}

/// Keys handled by the app rather than the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start from the title or game-over screen.
    Start,
    /// Pause or resume a running game.
    Pause,
    /// Abandon the game and go back to the title screen.
    Stop,
    Quit,
    None,
}

pub fn key_to_command(key: KeyEvent) -> Command {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Command::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Command::None;
    }
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Command::Quit,
        KeyCode::Char('p' | 'P') => Command::Pause,
        KeyCode::Char('e' | 'E') => Command::Stop,
        KeyCode::Enter | KeyCode::Char('r' | 'R') => Command::Start,
        _ => Command::None,
    }
}

/// Keys currently down, tracked from press/release events.
#[derive(Debug, Default)]
pub struct HeldKeys {
    pressed_at: HashMap<KeyCode, Instant>,
    /// Set once the terminal has sent a release event.
    reports_release: bool,
}

impl HeldKeys {
    pub fn handle(&mut self, key: KeyEvent, now: Instant) {
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.pressed_at.insert(normalize(key.code), now);
            }
            KeyEventKind::Release => {
                self.reports_release = true;
                self.pressed_at.remove(&normalize(key.code));
            }
        }
    }

    /// Forget stale presses when release events are not available.
    pub fn expire(&mut self, now: Instant) {
        if self.reports_release {
            return;
        }
        self.pressed_at
            .retain(|_, at| now.saturating_duration_since(*at) < HOLD_TIMEOUT);
    }

    pub fn clear(&mut self) {
        self.pressed_at.clear();
    }
}

impl KeyState<KeyCode> for HeldKeys {
    fn is_held(&self, key: &KeyCode) -> bool {
        self.pressed_at.contains_key(key)
    }
}

/// Shifted letters count as the plain letter.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
