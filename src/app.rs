//! App: terminal init, main loop, tick and key handling.

use crate::Args;
use crate::keyboard::{Command, HeldKeys, key_to_command};
use crate::theme::Theme;
use crate::ui::RowFade;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use splitris::{Game, LoopControl, Observer, RunState};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Target frame time for drawing and event polling.
const FRAME: Duration = Duration::from_millis(16);

/// Collects cleared rows and pauses the game so they can be flashed.
#[derive(Debug, Default)]
struct RowFlash {
    rows: Vec<i32>,
}

impl Observer for RowFlash {
    fn on_row_cleared(&mut self, row: i32, ctl: &mut LoopControl) {
        self.rows.push(row);
        ctl.pause();
    }
}

pub struct App {
    game: Game<KeyCode>,
    theme: Theme,
    keys: HeldKeys,
    /// Rows reported by the game, waiting to be picked up by the fade.
    flash: Option<Rc<RefCell<RowFlash>>>,
    fade: RowFade,
    tick_interval: Duration,
    last_tick: Instant,
}

impl App {
    pub fn new(args: &Args, theme: Theme) -> Result<Self> {
        let mut game = Game::new(args.game_config())?;
        let flash = (!args.no_animation).then(|| {
            let flash = Rc::new(RefCell::new(RowFlash::default()));
            game.subscribe(Rc::clone(&flash));
            flash
        });
        Ok(Self {
            game,
            theme,
            keys: HeldKeys::default(),
            flash,
            fade: RowFade::default(),
            tick_interval: Duration::from_millis(args.tick_ms.max(1)),
            last_tick: Instant::now(),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        // Release events let held keys end exactly; not every terminal has them.
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        );

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            self.collect_flash();
            terminal.draw(|f| crate::ui::draw(f, &self.game, &self.theme, &mut self.fade, now))?;

            if self.fade.is_done() {
                self.fade.reset();
                self.game.resume();
            }

            let timeout = FRAME.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key) = event::read()? else {
                        continue;
                    };
                    self.keys.handle(key, Instant::now());
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if !self.handle_command(key_to_command(key)) {
                        return Ok(());
                    }
                }
            }

            let now = Instant::now();
            self.keys.expire(now);
            if now.saturating_duration_since(self.last_tick) >= self.tick_interval {
                self.last_tick = now;
                self.game.tick(now, &self.keys)?;
            }
        }
    }

    /// Move rows reported since the last frame into the fade.
    fn collect_flash(&mut self) {
        let Some(flash) = &self.flash else {
            return;
        };
        let rows = std::mem::take(&mut flash.borrow_mut().rows);
        if rows.is_empty() {
            return;
        }
        // A clear during a running fade restarts it with every flashed row.
        self.fade.effect = None;
        self.fade.last_process = None;
        self.fade.rows.extend(rows);
    }

    /// Returns `false` when the app should exit.
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => return false,
            Command::Start => {
                if matches!(self.game.state(), RunState::Stopped | RunState::GameOver) {
                    self.fade.reset();
                    self.keys.clear();
                    self.game.start();
                }
            }
            Command::Pause => match self.game.state() {
                RunState::Running => self.game.pause(),
                RunState::Paused if !self.fade.is_active() => self.game.resume(),
                _ => {}
            },
            Command::Stop => {
                self.fade.reset();
                self.game.stop();
            }
            Command::None => {}
        }
        true
    }
}
