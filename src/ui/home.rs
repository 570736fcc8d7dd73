use ratatui::prelude::*;
use ratatui::widgets::*;

const BANNER: &str = r#"
 ███████╗████████╗ █████╗ ███╗   ██╗██╗  ██╗ █████╗ ██████╗ ███████╗
 ██╔════╝╚══██╔══╝██╔══██╗████╗  ██║██║ ██╔╝██╔══██╗██╔══██╗██╔════╝
 ███████╗   ██║   ███████║██╔██╗ ██║█████╔╝ ███████║██║  ██║█████╗
 ╚════██║   ██║   ██╔══██║██║╚██╗██║██╔═██╗ ██╔══██║██║  ██║██╔══╝
 ███████║   ██║   ██║  ██║██║ ╚████║██║  ██╗██║  ██║██████╔╝███████╗
 ╚══════╝   ╚═╝   ╚═╝  ╚═╝╚═╝  ╚═══╝╚═╝  ╚═╝╚═╝  ╚═╝╚═════╝ ╚══════╝"#;

const KEY: Color = Color::Rgb(80, 200, 255);
const LABEL: Color = Color::Rgb(140, 140, 140);
const GOLD: Color = Color::Rgb(255, 220, 80);

struct GameCard {
    key: &'static str,
    icon: &'static str,
    name: &'static str,
    blurb: &'static str,
    color: Color,
    border_color: Color,
    controls: &'static [(&'static str, &'static str)],
}

const CARDS: [GameCard; 2] = [
    GameCard {
        key: "1",
        icon: "🦨",
        name: "Stank",
        blurb: "Eat the stash,\ndodge your own stink!",
        color: Color::Rgb(144, 238, 144),
        border_color: Color::Rgb(60, 130, 60),
        controls: &[("↑ ↓ ← →", "Steer the skunk"), ("Enter", "Restart after a crash")],
    },
    GameCard {
        key: "2",
        icon: "🍃",
        name: "Bong",
        blurb: "Two paddles, one leaf.\nFirst to ten wins!",
        color: Color::Rgb(120, 200, 255),
        border_color: Color::Rgb(50, 100, 140),
        controls: &[
            ("W / S", "Left paddle"),
            ("↑ / ↓", "Right paddle"),
            ("Click", "Nudge by screen quadrant"),
            ("Enter", "Rematch"),
        ],
    },
];

fn key_line(key: &str, label: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("    {:<16}", key), Style::default().fg(KEY)),
        Span::styled(label.to_string(), Style::default().fg(LABEL)),
    ])
}

fn render_card(frame: &mut Frame, area: Rect, card: &GameCard, best: u32, selected: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if selected { BorderType::Double } else { BorderType::Rounded })
        .border_style(Style::default().fg(if selected { GOLD } else { card.border_color }));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("[{}] ", card.key), Style::default().fg(GOLD).add_modifier(Modifier::BOLD)),
        Span::raw(format!("{} ", card.icon)),
        Span::styled(
            card.name,
            Style::default()
                .fg(if selected { Color::White } else { card.color })
                .add_modifier(Modifier::BOLD),
        ),
    ])];
    let dim = if selected { Color::Rgb(180, 180, 200) } else { Color::Rgb(120, 120, 140) };
    lines.extend(card.blurb.lines().map(|l| Line::styled(l, Style::default().fg(dim))));
    lines.push(Line::styled(
        format!("Best this session: {best}"),
        Style::default().fg(Color::Rgb(100, 100, 130)),
    ));
    if selected {
        lines.push(Line::styled(
            "▶ Enter to play",
            Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

pub fn render_home(frame: &mut Frame, area: Rect, selected_game: usize, best: &[u32; 2]) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),  // Banner
            Constraint::Length(7),  // Cards
            Constraint::Min(8),     // Controls
            Constraint::Length(1),  // Footer
        ])
        .split(area);

    let banner = Paragraph::new(BANNER)
        .style(Style::default().fg(Color::Rgb(144, 238, 144)).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(banner, chunks[0]);

    let card_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(chunks[1]);
    for (i, card) in CARDS.iter().enumerate() {
        render_card(frame, card_cols[i], card, best[i], selected_game == i);
    }

    let ctrl_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[2]);

    let nav = Paragraph::new(vec![
        Line::from(""),
        key_line("Tab / Shift+Tab", "Switch tabs"),
        key_line("1 / 2", "Launch game"),
        key_line("← → ↑ ↓", "Select game"),
        key_line("Enter", "Play selected"),
        key_line("P", "Pause / resume"),
        key_line("R", "Restart game"),
        key_line("Esc", "Back to menu"),
        key_line("q / Ctrl+C", "Quit"),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
            .title(" ⌨ Navigation ")
            .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(nav, ctrl_cols[0]);

    let card = &CARDS[selected_game.min(CARDS.len() - 1)];
    let mut lines = vec![Line::from("")];
    lines.extend(card.controls.iter().map(|(k, l)| key_line(k, l)));
    let game_ctrl = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(card.border_color))
            .title(format!(" {} {} Controls ", card.icon, card.name))
            .title_style(Style::default().fg(card.color).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(game_ctrl, ctrl_cols[1]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("  🦀 ", Style::default().fg(Color::Rgb(255, 100, 50))),
        Span::styled(
            concat!("v", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Rgb(80, 80, 100)),
        ),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[3]);
}
