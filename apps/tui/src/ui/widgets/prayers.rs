use prayer_core::view::{NextPrayerPanel, TimingRow};
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

pub fn render_timings_table(
    f: &mut Frame<'_>,
    area: Rect,
    rows: &[TimingRow],
    visible: bool,
    next: Option<&NextPrayerPanel>,
) {
    let block = Block::default()
        .title(" Prayer times ")
        .title_style(Style::default().fg(Color::Cyan))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if !visible {
        let paragraph = Paragraph::new("Press l to load the timings for the selected city.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![Cell::from("Prayer"), Cell::from("Time")]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let upcoming = next.map(|panel| panel.name.as_str());
    let body = rows.iter().map(|row| {
        let style = if upcoming == Some(row.prayer.as_str()) {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(row.prayer.as_str()),
            Cell::from(row.time.clone()),
        ])
        .style(style)
    });

    let table = Table::new(body, [Constraint::Length(10), Constraint::Min(8)])
        .header(header)
        .block(block);
    f.render_widget(table, area);
}

pub fn render_next_prayer(f: &mut Frame<'_>, area: Rect, panel: Option<&NextPrayerPanel>) {
    let block = Block::default()
        .title(" Next prayer ")
        .title_style(Style::default().fg(Color::Magenta))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let Some(panel) = panel else {
        f.render_widget(block, area);
        return;
    };

    let text = Text::from(vec![
        TextLine::from(Span::styled(
            panel.name.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        TextLine::from(panel.time_label.clone()),
        TextLine::from(Span::styled(
            panel.countdown.clone(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
    ]);
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(block),
        area,
    );
}
