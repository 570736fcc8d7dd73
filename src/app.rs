use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use stankade::assets::AssetLoader;
use stankade::config::ArcadeConfig;
use stankade::games::GameKind;
use stankade::input::{self, InputEvent, InputSender, Touch};
use stankade::{Engine, GameState, Simulation};

#[derive(Clone, Copy, PartialEq)]
pub enum Tab {
    Home,
    Game(GameKind),
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Home, Tab::Game(GameKind::Stank), Tab::Game(GameKind::Bong)]
    }

    pub fn title(&self) -> &str {
        match self {
            Tab::Home => " Home ",
            Tab::Game(GameKind::Stank) => " Stank ",
            Tab::Game(GameKind::Bong) => " Bong ",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Home => 0,
            Tab::Game(kind) => kind.index() + 1,
        }
    }
}

/// One running game: its engine plus the host end of its input port.
pub struct Session {
    pub kind: GameKind,
    pub engine: Engine<Box<dyn Simulation>>,
    input: InputSender,
}

pub struct App {
    pub should_quit: bool,
    pub current_tab: Tab,
    pub selected_game: usize,
    pub session: Option<Session>,
    /// Best score per game since the program started.
    pub best: [u32; 2],
    viewport: (u16, u16),
    config: ArcadeConfig,
    loader: AssetLoader,
    clock: Instant,
}

impl App {
    pub fn new(config: ArcadeConfig, viewport: (u16, u16)) -> Self {
        Self {
            should_quit: false,
            current_tab: Tab::Home,
            selected_game: 0,
            session: None,
            best: [0; 2],
            viewport,
            loader: AssetLoader::new(config.asset_root.clone()),
            config,
            clock: Instant::now(),
        }
    }

    pub fn on_tick(&mut self) {
        let now = self.clock.elapsed().as_secs_f64() * 1000.0;
        let Some(session) = self.session.as_mut() else { return };

        session.engine.pump_input();
        if session.engine.frame_pending() {
            session.engine.tick(now);
        }

        if session.engine.state() == GameState::GameOver {
            let idx = session.kind.index();
            self.best[idx] = self.best[idx].max(session.engine.simulation().score());
        }
    }

    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.viewport = (width, height);
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        let Some(session) = &self.session else { return };
        let touch = Touch {
            x: mouse.column as f32,
            y: mouse.row as f32,
            viewport_width: self.viewport.0 as f32,
            viewport_height: self.viewport.1 as f32,
        };
        let event = match mouse.kind {
            MouseEventKind::Down(_) => InputEvent::TouchStart(touch),
            MouseEventKind::Drag(_) => InputEvent::TouchMove(touch),
            _ => return,
        };
        session.input.send(event);
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Result<()> {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') if self.current_tab == Tab::Home => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    return self.prev_tab();
                }
                return self.next_tab();
            }
            KeyCode::BackTab => return self.prev_tab(),
            KeyCode::Esc if self.current_tab != Tab::Home => {
                return self.switch_to(Tab::Home);
            }
            _ => {}
        }

        if self.current_tab == Tab::Home {
            return self.on_home_key(key);
        }

        let Some(session) = self.session.as_mut() else { return Ok(()) };
        match key.code {
            KeyCode::Char('p') | KeyCode::Char('P') => match session.engine.state() {
                GameState::Paused => session.engine.resume(),
                GameState::Running => session.engine.pause(),
                GameState::GameOver => {}
            },
            KeyCode::Char('r') | KeyCode::Char('R') => session.engine.restart(),
            code => {
                session.input.send(InputEvent::Key(code));
            }
        }
        Ok(())
    }

    fn on_home_key(&mut self, key: KeyEvent) -> Result<()> {
        if !key.modifiers.is_empty() {
            return Ok(());
        }
        let games = GameKind::all();
        match key.code {
            KeyCode::Char('1') => self.switch_to(Tab::Game(GameKind::Stank)),
            KeyCode::Char('2') => self.switch_to(Tab::Game(GameKind::Bong)),
            KeyCode::Right | KeyCode::Down => {
                self.selected_game = (self.selected_game + 1) % games.len();
                Ok(())
            }
            KeyCode::Left | KeyCode::Up => {
                self.selected_game = (self.selected_game + games.len() - 1) % games.len();
                Ok(())
            }
            KeyCode::Enter => self.switch_to(Tab::Game(games[self.selected_game])),
            _ => Ok(()),
        }
    }

    /// Tears down the current session before building the next one.
    fn switch_to(&mut self, tab: Tab) -> Result<()> {
        if let Some(mut old) = self.session.take() {
            let idx = old.kind.index();
            self.best[idx] = self.best[idx].max(old.engine.simulation().score());
            old.engine.cleanup();
        }

        self.current_tab = tab;
        if let Tab::Game(kind) = tab {
            self.selected_game = kind.index();
            self.session = Some(self.launch(kind)?);
        }
        Ok(())
    }

    fn launch(&self, kind: GameKind) -> Result<Session> {
        let sim = kind
            .build(&self.config)
            .with_context(|| format!("building {}", kind.title()))?;
        let (sender, port) = input::channel();
        let mut engine = Engine::launch(self.config.surface, sim, Box::new(port), &self.loader)?;
        engine.start();
        tracing::info!(game = kind.title(), "session started");
        Ok(Session {
            kind,
            engine,
            input: sender,
        })
    }

    fn next_tab(&mut self) -> Result<()> {
        let tabs = Tab::all();
        let idx = self.current_tab.index();
        self.switch_to(tabs[(idx + 1) % tabs.len()])
    }

    fn prev_tab(&mut self) -> Result<()> {
        let tabs = Tab::all();
        let idx = self.current_tab.index();
        self.switch_to(tabs[(idx + tabs.len() - 1) % tabs.len()])
    }
}
