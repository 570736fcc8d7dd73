use ratatui::prelude::*;
use ratatui::widgets::*;

use stankade::games::GameKind;
use stankade::{GameState, Simulation};

use crate::app::Session;
use crate::ui::canvas;

struct Theme {
    icon: &'static str,
    accent: Color,
    border: Color,
}

fn theme(kind: GameKind) -> Theme {
    match kind {
        GameKind::Stank => Theme {
            icon: "🦨",
            accent: Color::Rgb(144, 238, 144),
            border: Color::Rgb(60, 130, 60),
        },
        GameKind::Bong => Theme {
            icon: "🍃",
            accent: Color::Rgb(120, 200, 255),
            border: Color::Rgb(50, 100, 140),
        },
    }
}

fn help_spans(kind: GameKind) -> Vec<Span<'static>> {
    let key = Style::default().fg(Color::Rgb(80, 200, 255));
    let label = Style::default().fg(Color::DarkGray);
    let sep = Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60)));
    let mut spans = match kind {
        GameKind::Stank => vec![
            Span::styled(" ↑↓←→", key),
            Span::styled(" Steer ", label),
        ],
        GameKind::Bong => vec![
            Span::styled(" W/S", key),
            Span::styled(" Left paddle ", label),
            sep.clone(),
            Span::styled("↑/↓", key),
            Span::styled(" Right paddle ", label),
            sep.clone(),
            Span::styled("Click", key),
            Span::styled(" Quadrant ", label),
        ],
    };
    spans.extend([
        sep.clone(),
        Span::styled("P", key),
        Span::styled(" Pause ", label),
        sep.clone(),
        Span::styled("R", key),
        Span::styled(" Restart ", label),
        sep,
        Span::styled("Esc", key),
        Span::styled(" Menu", label),
    ]);
    spans
}

pub fn render_session(frame: &mut Frame, area: Rect, session: &Session) {
    let theme = theme(session.kind);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .title(format!(" {} {} ", theme.icon, session.kind.title()))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(inner);

    // Status bar
    let sim = session.engine.simulation();
    let (label, color) = match session.engine.state() {
        GameState::Running => ("▶ RUNNING", Color::Green),
        GameState::Paused => ("⏸ PAUSED", Color::Yellow),
        GameState::GameOver => ("■ GAME OVER", Color::Red),
    };
    let status = Line::from(vec![
        Span::styled(format!(" {} ", theme.icon), Style::default()),
        Span::styled(
            format!("Score: {} ", sim.score()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(Paragraph::new(status), chunks[0]);

    // Playfield
    let field = chunks[1];
    let lines = canvas::rasterize(
        session.engine.canvas(),
        field.width as usize,
        field.height as usize,
    );
    frame.render_widget(Paragraph::new(lines), field);

    // Help bar
    let help = if session.engine.state() == GameState::Paused {
        Line::from(Span::styled(
            " ⏸ PAUSED - Press P to resume ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(help_spans(session.kind))
    };
    frame.render_widget(Paragraph::new(help), chunks[2]);
}
