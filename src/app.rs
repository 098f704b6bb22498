//! App: terminal init, main loop, gravity tick and key handling.

use crate::GameConfig;
use crate::clock::GravityTimer;
use crate::game::{GameState, PieceSource, RandomSource};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// Input poll budget per frame (~60 FPS).
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

/// Whether the loop keeps running after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App<S = RandomSource> {
    theme: Theme,
    state: GameState<S>,
    paused: bool,
    gravity: GravityTimer,
}

impl App {
    pub fn new(config: &GameConfig, theme: Theme) -> Self {
        let source = match config.seed {
            Some(seed) => RandomSource::seeded(seed),
            None => RandomSource::from_entropy(),
        };
        Self::with_source(source, theme, Instant::now())
    }
}

impl<S: PieceSource> App<S> {
    fn with_source(source: S, theme: Theme, now: Instant) -> Self {
        let state = GameState::new(source);
        let gravity = GravityTimer::new(now, state.revision());
        Self {
            theme,
            state,
            paused: false,
            gravity,
        }
    }

    pub fn screen(&self) -> Screen {
        if self.state.is_game_over() {
            Screen::GameOver
        } else {
            Screen::Playing
        }
    }

    fn apply_action(&mut self, action: Action, now: Instant) -> Flow {
        match action {
            Action::Quit => return Flow::Quit,
            Action::Reset => {
                self.state.reset();
                self.paused = false;
            }
            Action::Pause => {
                if self.screen() == Screen::Playing {
                    self.paused = !self.paused;
                    // Resume with a full period rather than whatever was left.
                    self.gravity.restart(now);
                }
            }
            _ if self.paused => {}
            Action::MoveLeft => {
                self.state.move_left();
            }
            Action::MoveRight => {
                self.state.move_right();
            }
            Action::SoftDrop => {
                self.state.soft_drop();
            }
            Action::Rotate => {
                self.state.rotate_piece();
            }
            Action::None => {}
        }
        self.gravity.observe(self.state.revision(), now);
        Flow::Continue
    }

    /// Run one gravity step if the timer is due.
    fn tick_gravity(&mut self, now: Instant) {
        if self.paused || self.state.is_game_over() {
            return;
        }
        self.gravity.observe(self.state.revision(), now);
        if self.gravity.is_due(now) {
            self.state.tick();
            self.gravity.observe(self.state.revision(), now);
            self.gravity.restart(now);
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        self.gravity = GravityTimer::new(Instant::now(), self.state.revision());

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                let area = f.area();
                crate::ui::draw(f, &self.state, &self.theme, self.paused, area);
            })?;

            let timeout = FRAME
                .saturating_sub(now.elapsed())
                .min(self.gravity.remaining(Instant::now()));

            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.apply_action(key_to_action(key), Instant::now()) == Flow::Quit {
                            return Ok(());
                        }
                    }
                }
            }

            self.tick_gravity(Instant::now());
        }
    }
}
