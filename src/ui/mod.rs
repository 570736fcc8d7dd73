pub mod canvas;
pub mod game;
pub mod home;
pub mod tabs;

use ratatui::prelude::*;

use crate::app::{App, Tab};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),   // Content
        ])
        .split(frame.area());

    tabs::render_tabs(frame, app, chunks[0]);

    match (app.current_tab, &app.session) {
        (Tab::Game(_), Some(session)) => game::render_session(frame, chunks[1], session),
        _ => home::render_home(frame, chunks[1], app.selected_game, &app.best),
    }
}
