//! Layout and drawing: playfield, active piece, sidebar, pause and game-over overlays.

use crate::game::{Cell, FIELD_COLS, FIELD_ROWS, GameState, PieceSource};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

/// Each field cell is two terminal columns wide so blocks look square.
const CELL_WIDTH: u16 = 2;
const CELL_HEIGHT: u16 = 1;
const SIDEBAR_WIDTH: u16 = 24;

/// Playfield size in terminal cells, border included.
fn playfield_outer_size() -> (u16, u16) {
    (
        FIELD_COLS as u16 * CELL_WIDTH + 2,
        FIELD_ROWS as u16 * CELL_HEIGHT + 2,
    )
}

/// Board + sidebar, centred in `area` and clipped to it.
fn game_rect(area: Rect) -> Rect {
    let (pw, ph) = playfield_outer_size();
    let total_w = pw + SIDEBAR_WIDTH;
    Rect {
        x: area.x + area.width.saturating_sub(total_w) / 2,
        y: area.y + area.height.saturating_sub(ph) / 2,
        width: total_w.min(area.width),
        height: ph.min(area.height),
    }
}

/// (playfield with border, sidebar).
fn split_game_rect(game: Rect) -> (Rect, Rect) {
    let (pw, _) = playfield_outer_size();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(game);
    (chunks[0], chunks[1])
}

/// Board cells only (inside the border).
fn board_rect(area: Rect) -> Rect {
    let (playfield, _) = split_game_rect(game_rect(area));
    Rect {
        x: playfield.x + 1,
        y: playfield.y + 1,
        width: (FIELD_COLS as u16 * CELL_WIDTH).min(playfield.width.saturating_sub(2)),
        height: (FIELD_ROWS as u16 * CELL_HEIGHT).min(playfield.height.saturating_sub(2)),
    }
}

/// What is visible at field cell (x, y): the active piece over locked cells.
fn cell_color<S: PieceSource>(state: &GameState<S>, theme: &Theme, x: usize, y: usize) -> Option<Color> {
    let piece = state.piece();
    if piece.covers(x as i32, y as i32) {
        return Some(theme.piece_color(piece.color));
    }
    match state.field().get(x, y) {
        Some(Cell::Filled(id)) => Some(theme.piece_color(id)),
        _ => None,
    }
}

/// Draw the game, then any overlay for pause or game over.
pub fn draw<S: PieceSource>(
    frame: &mut Frame,
    state: &GameState<S>,
    theme: &Theme,
    paused: bool,
    area: Rect,
) {
    frame
        .buffer_mut()
        .set_style(area, Style::default().bg(theme.bg));
    draw_game(frame, state, theme, area);
    if state.is_game_over() {
        draw_game_over(frame, state, theme, area);
    } else if paused {
        draw_pause_overlay(frame, theme, area);
    }
}

fn draw_game<S: PieceSource>(frame: &mut Frame, state: &GameState<S>, theme: &Theme, area: Rect) {
    let (playfield_area, sidebar_area) = split_game_rect(game_rect(area));
    draw_playfield(frame, state, theme, playfield_area, board_rect(area));
    draw_sidebar(frame, state, theme, sidebar_area);
}

fn draw_playfield<S: PieceSource>(
    frame: &mut Frame,
    state: &GameState<S>,
    theme: &Theme,
    area: Rect,
    board: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Blockstack ", Style::default().fg(theme.title).bold()));
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    for y in 0..FIELD_ROWS {
        for x in 0..FIELD_COLS {
            let (symbol, style) = match cell_color(state, theme, x, y) {
                Some(color) => ("█", Style::default().fg(color).bg(color)),
                None => (" ", Style::default().fg(theme.div_line).bg(theme.bg)),
            };
            let ry = board.y + y as u16 * CELL_HEIGHT;
            for dx in 0..CELL_WIDTH {
                let rx = board.x + x as u16 * CELL_WIDTH + dx;
                if rx < board.x + board.width && ry < board.y + board.height {
                    buf[(rx, ry)].set_symbol(symbol).set_style(style);
                }
            }
        }
    }
}

fn draw_sidebar<S: PieceSource>(frame: &mut Frame, state: &GameState<S>, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let help_style = Style::default().fg(theme.inactive_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Stats
            Constraint::Length(1), // gap
            Constraint::Length(9), // Controls
        ])
        .split(area);

    let stats_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    let piece = state.piece();
    let stats_lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(state.score().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Lines: ", title_style),
            Span::styled(state.lines_cleared().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Piece: ", title_style),
            Span::styled(
                piece.kind.name(),
                Style::default().fg(theme.piece_color(piece.color)),
            ),
        ]),
    ];
    Paragraph::new(Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    let help_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Keys ", title_style));
    let help_inner = help_block.inner(chunks[2]);
    help_block.render(chunks[2], frame.buffer_mut());
    let help = [
        "←/h  Left",
        "→/l  Right",
        "↓/j  Soft drop",
        "↑/k  Rotate",
        "P    Pause",
        "R    Restart",
        "Q    Quit",
    ];
    let help_lines: Vec<Line> = help
        .iter()
        .map(|s| Line::from(Span::styled(*s, help_style)))
        .collect();
    Paragraph::new(Text::from(help_lines)).render(help_inner, frame.buffer_mut());
}

/// Popup of the given size centred on the board, clipped to `area`.
fn popup_rect(area: Rect, width: u16, height: u16) -> Rect {
    let board = board_rect(area);
    Rect {
        x: board.x + board.width.saturating_sub(width) / 2,
        y: board.y + board.height.saturating_sub(height) / 2,
        width,
        height,
    }
    .intersection(area)
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = popup_rect(area, 20, 5);
    if popup.is_empty() {
        return;
    }
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(theme.title),
        )),
        Line::from(Span::styled(
            " P — Resume ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    Clear.render(popup, frame.buffer_mut());
    p.render(popup, frame.buffer_mut());
}

fn draw_game_over<S: PieceSource>(frame: &mut Frame, state: &GameState<S>, theme: &Theme, area: Rect) {
    let popup = popup_rect(area, 20, 8);
    if popup.is_empty() {
        return;
    }
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(theme.title).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", state.score()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            " R — Try again ",
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(" Q — Quit ", Style::default().fg(theme.inactive_fg))),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    Clear.render(popup, frame.buffer_mut());
    p.render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{SPAWN_X, SequenceSource, TetrominoKind};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    const W: u16 = 60;
    const H: u16 = 26;

    fn render(state: &GameState<SequenceSource>, paused: bool) -> ratatui::buffer::Buffer {
        render_sized(state, paused, W, H)
    }

    fn render_sized(
        state: &GameState<SequenceSource>,
        paused: bool,
        width: u16,
        height: u16,
    ) -> ratatui::buffer::Buffer {
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                draw(f, state, &theme, paused, area);
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn screen_text(buf: &ratatui::buffer::Buffer) -> String {
        buf.content.iter().map(|c| c.symbol()).collect()
    }

    fn board_cell_bg(buf: &ratatui::buffer::Buffer, x: usize, y: usize) -> Option<Color> {
        let board = board_rect(Rect::new(0, 0, W, H));
        let rx = board.x + x as u16 * CELL_WIDTH;
        let ry = board.y + y as u16 * CELL_HEIGHT;
        buf[(rx, ry)].style().bg
    }

    #[test]
    fn test_board_fits_and_is_centred() {
        let board = board_rect(Rect::new(0, 0, W, H));
        assert_eq!(board.width, FIELD_COLS as u16 * CELL_WIDTH);
        assert_eq!(board.height, FIELD_ROWS as u16);
        assert_eq!(board.x, (W - (22 + SIDEBAR_WIDTH)) / 2 + 1);
    }

    #[test]
    fn test_active_piece_is_drawn_in_its_colour() {
        let state = GameState::new(SequenceSource::new(vec![TetrominoKind::O]));
        let buf = render(&state, false);
        let theme = Theme::default();
        let o = theme.piece_color(TetrominoKind::O.color());
        assert_eq!(board_cell_bg(&buf, SPAWN_X as usize, 0), Some(o));
        assert_eq!(board_cell_bg(&buf, SPAWN_X as usize + 1, 1), Some(o));
        assert_eq!(board_cell_bg(&buf, 0, 19), Some(theme.bg));
        let text = screen_text(&buf);
        assert!(text.contains("Score: 0"));
        assert!(!text.contains("Paused"));
    }

    #[test]
    fn test_pause_and_game_over_overlays() {
        let mut state = GameState::new(SequenceSource::new(vec![TetrominoKind::T]));
        assert!(screen_text(&render(&state, true)).contains("Paused"));

        state.lock_piece();
        let text = screen_text(&render(&state, true));
        assert!(text.contains("Game Over"));
        assert!(text.contains("Try again"));
        assert!(!text.contains("Paused"));
    }

    #[test]
    fn test_overlays_fit_small_terminals() {
        let playing = GameState::new(SequenceSource::new(vec![TetrominoKind::T]));
        let mut over = GameState::new(SequenceSource::new(vec![TetrominoKind::T]));
        over.lock_piece();
        assert!(over.is_game_over());
        for width in (1..70).step_by(3).chain([10, 15, 20, 60]) {
            for height in (1..30).step_by(2).chain([5, 6, 10, 24]) {
                render_sized(&playing, true, width, height);
                render_sized(&over, false, width, height);
            }
        }
    }

    #[test]
    fn test_popup_stays_inside_area() {
        for (width, height) in [(60, 6), (60, 5), (20, 24), (10, 24), (15, 10), (1, 1)] {
            let area = Rect::new(0, 0, width, height);
            let popup = popup_rect(area, 20, 8);
            assert!(popup.right() <= area.right());
            assert!(popup.bottom() <= area.bottom());
        }
    }
}
