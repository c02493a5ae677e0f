use prayer_core::view::{NextPrayerPanel, SelectControl, TimingRow};
use prayer_core::{Focus, SelectId};
use ratzilla::ratatui::{
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line as TextLine, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::state::WebApp;

pub fn draw(app: &WebApp, f: &mut Frame<'_>) {
    let area = f.area();
    let block = Block::default()
        .title("Prayer Times")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area).inner(Margin::new(1, 1));
    f.render_widget(block, area);

    let screen = app.screen();
    let error_height = if screen.error.is_some() { 3 } else { 0 };
    let [body, error, footer] = Layout::vertical([
        Constraint::Min(14),
        Constraint::Length(error_height),
        Constraint::Length(1),
    ])
    .areas(inner);

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(body);
    let [selects, buttons, next] = Layout::vertical([
        Constraint::Length(12),
        Constraint::Length(3),
        Constraint::Min(5),
    ])
    .areas(left);

    let select_areas = Layout::vertical([Constraint::Length(3); 4]).split(selects);
    for (id, area) in SelectId::ALL.iter().zip(select_areas.iter()) {
        render_select(
            f,
            *area,
            id.label(),
            screen.select(*id),
            app.focus == Focus::Select(*id),
        );
    }
    render_buttons(app, f, buttons);
    render_next_prayer(f, next, screen.next_prayer.as_ref());

    let [options, timings] =
        Layout::vertical([Constraint::Min(6), Constraint::Length(9)]).areas(right);
    render_options(app, f, options);
    render_timings(
        f,
        timings,
        &screen.timings,
        screen.timings_visible,
        screen.next_prayer.as_ref(),
    );

    if let Some(message) = &screen.error {
        let block = Block::default()
            .title(" Error ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        f.render_widget(
            Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(block),
            error,
        );
    }

    let hint = format!(
        "{}  |  Tab: next  Enter: choose  l: load  r: reset",
        app.status
    );
    f.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
        footer,
    );
}

fn render_select(f: &mut Frame<'_>, area: Rect, title: &str, control: &SelectControl, focused: bool) {
    let border = match (focused, control.disabled) {
        (true, _) => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        (false, true) => Style::default().fg(Color::DarkGray),
        (false, false) => Style::default().fg(Color::Green),
    };
    let text_style = if control.selected().is_some() {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border);
    f.render_widget(
        Paragraph::new(Span::styled(control.display_text().to_string(), text_style)).block(block),
        area,
    );
}

fn render_buttons(app: &WebApp, f: &mut Frame<'_>, area: Rect) {
    let screen = app.screen();
    let button = |label: &'static str, enabled: bool, focused: bool| {
        let style = match (enabled, focused) {
            (false, _) => Style::default().fg(Color::DarkGray),
            (true, true) => Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
            (true, false) => Style::default().fg(Color::Green),
        };
        Span::styled(label, style)
    };

    let mut spans = vec![button("[ Load ]", screen.load_enabled, app.focus == Focus::Load)];
    if screen.reset_visible {
        spans.push(Span::raw("  "));
        spans.push(button("[ Reset ]", true, app.focus == Focus::Reset));
    }
    f.render_widget(
        Paragraph::new(TextLine::from(spans)).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_options(app: &WebApp, f: &mut Frame<'_>, area: Rect) {
    let Some(id) = app.focused_select() else {
        f.render_widget(Block::default().borders(Borders::ALL), area);
        return;
    };
    let control = app.screen().select(id);
    let block = Block::default()
        .title(format!(" {} ({}) ", id.label(), control.options.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let visible = usize::from(area.height.saturating_sub(2));
    let offset = if app.highlight < visible {
        0
    } else {
        app.highlight + 1 - visible
    };
    let rows = control
        .options
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(index, option)| {
            let marker = if control.value.as_deref() == Some(option.value.as_str()) {
                "*"
            } else {
                " "
            };
            let style = if index == app.highlight {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![Cell::from(marker), Cell::from(option.label.clone())]).style(style)
        });

    f.render_widget(
        Table::new(rows, [Constraint::Length(1), Constraint::Min(10)]).block(block),
        area,
    );
}

fn render_timings(
    f: &mut Frame<'_>,
    area: Rect,
    rows: &[TimingRow],
    visible: bool,
    next: Option<&NextPrayerPanel>,
) {
    let block = Block::default()
        .title(" Prayer times ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    if !visible {
        f.render_widget(block, area);
        return;
    }

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
    let header = Row::new(vec![Cell::from("Prayer"), Cell::from("Time")]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    f.render_widget(
        Table::new(body, [Constraint::Length(10), Constraint::Min(8)])
            .header(header)
            .block(block),
        area,
    );
}

fn render_next_prayer(f: &mut Frame<'_>, area: Rect, panel: Option<&NextPrayerPanel>) {
    let block = Block::default()
        .title(" Next prayer ")
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
