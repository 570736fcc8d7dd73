use ratatui::prelude::*;
use ratatui::widgets::*;

use stankade::GameState;

use crate::app::{App, Tab};

fn session_badge(app: &App) -> Span<'static> {
    match app.session.as_ref().map(|s| s.engine.state()) {
        Some(GameState::Running) => Span::styled(" ● live ", Style::default().fg(Color::Rgb(80, 220, 80))),
        Some(GameState::Paused) => Span::styled(" ● paused ", Style::default().fg(Color::Rgb(255, 220, 80))),
        Some(GameState::GameOver) => Span::styled(" ● over ", Style::default().fg(Color::Rgb(220, 80, 80))),
        None => Span::styled(" ○ idle ", Style::default().fg(Color::Rgb(90, 90, 110))),
    }
}

pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(60, 130, 60)))
        .title(" 🦨 Stankade ")
        .title_style(
            Style::default()
                .fg(Color::Rgb(144, 238, 144))
                .add_modifier(Modifier::BOLD),
        )
        .title(Line::from(session_badge(app)).right_aligned());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let titles: Vec<Line> = Tab::all()
        .iter()
        .map(|t| Line::from(t.title()))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_tab.index())
        .style(Style::default().fg(Color::Rgb(120, 120, 140)))
        .highlight_style(
            Style::default()
                .fg(Color::Rgb(255, 220, 80))
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::styled(" │ ", Style::default().fg(Color::Rgb(60, 60, 80))));

    frame.render_widget(tabs, inner);
}
