//! Layout and drawing: playfield, sidebar (next pieces, stats, keys), title,
//! pause and game-over overlays, row-clear fade.

use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use splitris::{Game, PieceKind, RunState};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Each grid cell is two terminal columns wide so blocks look square.
const CELL_WIDTH: u16 = 2;
const CELL_HEIGHT: u16 = 1;

const SIDEBAR_WIDTH: u16 = 24;

/// Duration of the row-clear fade in ms.
pub const ROW_CLEAR_FADE_MS: u32 = 400;

/// Preview slots shown in the sidebar.
const MAX_PREVIEW: usize = 3;
const PREVIEW_ROWS: u16 = 3;

/// Row-clear animation state owned by the app.
#[derive(Default)]
pub struct RowFade {
    /// Grid rows being flashed; empty when idle.
    pub rows: Vec<i32>,
    pub effect: Option<Effect>,
    pub last_process: Option<Instant>,
}

impl RowFade {
    pub fn is_active(&self) -> bool {
        !self.rows.is_empty()
    }

    /// True once the fade has played to the end.
    pub fn is_done(&self) -> bool {
        self.effect.as_ref().is_some_and(Effect::done)
    }

    pub fn reset(&mut self) {
        self.rows.clear();
        self.effect = None;
        self.last_process = None;
    }
}

/// Board plus border, in terminal cells.
fn playfield_outer_size<K>(game: &Game<K>) -> (u16, u16) {
    let grid = game.grid();
    (
        framed(grid.width(), CELL_WIDTH),
        framed(grid.height(), CELL_HEIGHT),
    )
}

/// `cells * scale` plus two border cells, clamped to `u16::MAX`.
fn framed(cells: usize, scale: u16) -> u16 {
    u16::try_from(cells)
        .unwrap_or(u16::MAX)
        .saturating_mul(scale)
        .saturating_add(2)
}

/// Split `area` into the centred playfield and the sidebar next to it.
fn game_layout<K>(game: &Game<K>, area: Rect) -> (Rect, Rect) {
    let (pw, ph) = playfield_outer_size(game);
    let total_w = pw + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    (inner[0], inner[1])
}

/// Terminal position of grid cell `(x, y)`. Row 0 is at the bottom of the board.
fn cell_rect(board: Rect, grid_height: usize, x: i32, y: i32) -> Option<Rect> {
    let col = u16::try_from(x).ok()?;
    let row = u16::try_from(grid_height as i32 - 1 - y).ok()?;
    let r = Rect {
        x: board.x.checked_add(col.checked_mul(CELL_WIDTH)?)?,
        y: board.y.checked_add(row.checked_mul(CELL_HEIGHT)?)?,
        width: CELL_WIDTH,
        height: CELL_HEIGHT,
    };
    (r.right() <= board.right() && r.bottom() <= board.bottom()).then_some(r)
}

pub fn draw<K>(frame: &mut Frame, game: &Game<K>, theme: &Theme, fade: &mut RowFade, now: Instant) {
    let area = frame.area();
    let (playfield_area, sidebar_area) = game_layout(game, area);
    let board = draw_playfield(frame, game, theme, playfield_area, &fade.rows);
    draw_sidebar(frame, game, theme, sidebar_area);

    if fade.is_active() {
        apply_row_fade(frame, game, theme, board, fade, now);
    }

    match game.state() {
        RunState::Stopped => draw_title(frame, theme, playfield_area),
        RunState::Paused if !fade.is_active() => draw_pause_overlay(frame, theme, playfield_area),
        RunState::GameOver => draw_game_over(frame, game, theme, playfield_area),
        RunState::Running | RunState::Paused => {}
    }
}

/// Draws the board and returns its inner rect.
fn draw_playfield<K>(
    frame: &mut Frame,
    game: &Game<K>,
    theme: &Theme,
    area: Rect,
    flashing: &[i32],
) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Splitris ", theme.title));
    let board = block.inner(area);
    block.render(area, frame.buffer_mut());

    let grid = game.grid();
    let buf = frame.buffer_mut();
    for cell in grid.cells() {
        let Some(r) = cell_rect(board, grid.height(), cell.x(), cell.y()) else {
            continue;
        };
        let color = if flashing.contains(&cell.y()) {
            theme.flash
        } else {
            cell.occupant()
                .and_then(|id| game.piece(id))
                .map_or(theme.bg, |piece| theme.piece_color(piece.kind()))
        };
        let symbol = if color == theme.bg { " " } else { "█" };
        for bx in r.left()..r.right() {
            buf[(bx, r.y)]
                .set_symbol(symbol)
                .set_style(Style::default().fg(color).bg(color));
        }
    }
    board
}

/// Create or advance the fade that turns flashed rows back into background.
fn apply_row_fade<K>(
    frame: &mut Frame,
    game: &Game<K>,
    theme: &Theme,
    board: Rect,
    fade: &mut RowFade,
    now: Instant,
) {
    let delta = fade
        .last_process
        .map_or(std::time::Duration::ZERO, |t| now.saturating_duration_since(t));
    let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
    fade.last_process = Some(now);

    if fade.effect.is_none() {
        let height = game.grid().height();
        let width = game.grid().width() as i32;
        let positions: HashSet<(u16, u16)> = fade
            .rows
            .iter()
            .flat_map(|&y| (0..width).filter_map(move |x| cell_rect(board, height, x, y)))
            .flat_map(|r| (r.left()..r.right()).map(move |bx| (bx, r.y)))
            .collect();
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            positions.contains(&(pos.x, pos.y))
        }));
        let bg = theme.bg;
        let effect = fx::fade_to(bg, bg, (ROW_CLEAR_FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(board);
        fade.effect = Some(effect);
    }

    if let Some(effect) = fade.effect.as_mut() {
        frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
    }
}

fn draw_sidebar<K>(frame: &mut Frame, game: &Game<K>, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let help_style = Style::default().fg(theme.inactive_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2 + 1 + PREVIEW_ROWS * MAX_PREVIEW as u16), // Next
            Constraint::Length(1),                                          // gap
            Constraint::Length(7),                                          // Stats
            Constraint::Length(1),                                          // gap
            Constraint::Fill(1),                                            // Keys
        ])
        .split(area);

    // --- Next ---
    let next_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], frame.buffer_mut());
    Paragraph::new(Line::from(Span::styled("Next", title_style))).render(
        Rect {
            height: 1.min(next_inner.height),
            ..next_inner
        },
        frame.buffer_mut(),
    );
    for (i, kind) in game.upcoming().take(MAX_PREVIEW).enumerate() {
        let slot = Rect {
            x: next_inner.x,
            y: next_inner.y + 1 + i as u16 * PREVIEW_ROWS,
            width: next_inner.width,
            height: PREVIEW_ROWS,
        };
        draw_piece_preview(frame, theme, slot.intersection(next_inner), kind);
    }

    // --- Stats ---
    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let stats_inner = stats_block.inner(chunks[2]);
    stats_block.render(chunks[2], frame.buffer_mut());
    let stat = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value, fg_style),
        ])
    };
    let stats_lines = vec![
        stat("Score: ", game.score().to_string()),
        stat("Level: ", game.level().to_string()),
        stat("Rows:  ", game.cleared_rows().to_string()),
        stat("Speed: ", format!("{} ms", game.descend_interval().as_millis())),
        stat("State: ", state_label(game.state()).to_string()),
    ];
    Paragraph::new(ratatui::text::Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    // --- Keys ---
    let keys = [
        "←/→  move",
        "↓    soft drop",
        "s    slide down",
        "c/↑  rotate",
        "p    pause",
        "e    stop",
        "q    quit",
    ];
    let lines: Vec<Line> = keys
        .iter()
        .map(|k| Line::from(Span::styled(*k, help_style)))
        .collect();
    Paragraph::new(lines).render(chunks[4], frame.buffer_mut());
}

const fn state_label(state: RunState) -> &'static str {
    match state {
        RunState::Stopped => "stopped",
        RunState::Running => "running",
        RunState::Paused => "paused",
        RunState::GameOver => "game over",
    }
}

/// Small rendition of a piece template, centred in `area`.
fn draw_piece_preview(frame: &mut Frame, theme: &Theme, area: Rect, kind: PieceKind) {
    let color = theme.piece_color(kind);
    let cells = kind.cells();
    let max_x = cells.iter().map(|c| c.x).max().unwrap_or(0);
    let max_y = cells.iter().map(|c| c.y).max().unwrap_or(0);
    let bw = (max_x + 1) as u16 * CELL_WIDTH;
    let bh = (max_y + 1) as u16;
    let off_x = area.width.saturating_sub(bw) / 2;
    let off_y = area.height.saturating_sub(bh) / 2;

    for c in cells {
        let r = Rect {
            x: area.x + off_x + c.x as u16 * CELL_WIDTH,
            // Template rows grow upwards.
            y: area.y + off_y + (max_y - c.y) as u16,
            width: CELL_WIDTH,
            height: 1,
        };
        Paragraph::new("██")
            .style(Style::default().fg(color))
            .render(r.intersection(area), frame.buffer_mut());
    }
}

fn popup_rect(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn draw_popup(frame: &mut Frame, theme: &Theme, area: Rect, lines: Vec<Line>) {
    let height = lines.len() as u16 + 2;
    let popup = popup_rect(area, area.width.saturating_sub(2), height);
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_title(frame: &mut Frame, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Splitris ",
            Style::default()
                .fg(theme.bg)
                .bg(theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Enter  start", Style::default().fg(theme.main_fg))),
        Line::from(Span::styled("q      quit", Style::default().fg(theme.main_fg))),
        Line::from(""),
    ];
    draw_popup(frame, theme, area, lines);
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "p resume  e stop",
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
    ];
    draw_popup(frame, theme, area, lines);
}

fn draw_game_over<K>(frame: &mut Frame, game: &Game<K>, theme: &Theme, area: Rect) {
    let fg = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!("Score: {}", game.score()), fg)),
        Line::from(Span::styled(format!("Level: {}", game.level()), fg)),
        Line::from(Span::styled(format!("Rows: {}", game.cleared_rows()), fg)),
        Line::from(""),
        Line::from(Span::styled("r restart  q quit", fg)),
        Line::from(""),
    ];
    draw_popup(frame, theme, area, lines);
}
