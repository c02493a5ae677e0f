// UI module for prayer-times
// Draws the controller's Screen plus the keyboard state kept in App

pub mod widgets;

use crate::app::App;
use prayer_core::{Focus, SelectId};
use ratatui::layout::{Constraint, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use widgets::popup::render_help_popup;
use widgets::prayers::{render_next_prayer, render_timings_table};
use widgets::select::{render_options, render_select};

pub fn ui(app: &App, f: &mut Frame<'_>) {
    let error_height = if app.screen().error.is_some() { 3 } else { 0 };
    let [title, body, error, status, shortcuts] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(16),
        Constraint::Length(error_height),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(f.area().inner(Margin::new(1, 0)));

    render_title(f, title);
    render_body(app, f, body);
    render_error(app, f, error);
    render_status(app, f, status);
    render_shortcuts(f, shortcuts);

    if app.show_help {
        render_help_popup(f);
    }
}

fn render_title(f: &mut Frame<'_>, area: Rect) {
    let line = TextLine::from(vec![
        Span::styled(
            "Prayer ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "Times",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_body(app: &App, f: &mut Frame<'_>, area: Rect) {
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);
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
            app.screen().select(*id),
            app.focus == Focus::Select(*id),
            &app.throbber,
        );
    }

    render_buttons(app, f, buttons);
    render_next_prayer(f, next, app.screen().next_prayer.as_ref());

    let [options, timings] =
        Layout::vertical([Constraint::Min(6), Constraint::Length(9)]).areas(right);
    render_focused_options(app, f, options);
    render_timings_table(
        f,
        timings,
        &app.screen().timings,
        app.screen().timings_visible,
        app.screen().next_prayer.as_ref(),
    );
}

fn render_focused_options(app: &App, f: &mut Frame<'_>, area: Rect) {
    let Some(id) = app.focused_select() else {
        let hint = Paragraph::new(match app.focus {
            Focus::Load => "Enter fetches today's timings.",
            _ => "Enter clears the selection and saved state.",
        })
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(hint, area);
        return;
    };

    let control = app.screen().select(id);
    let filter = (app.filtering || !app.filter.is_empty()).then_some(app.filter.as_str());
    render_options(
        f,
        area,
        id.label(),
        &app.visible_options(),
        app.highlight,
        control.value.as_deref(),
        filter,
    );
}

fn button<'a>(label: &'a str, enabled: bool, focused: bool) -> Span<'a> {
    let style = match (enabled, focused) {
        (false, _) => Style::default().fg(Color::DarkGray),
        (true, true) => Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(Color::Green),
    };
    Span::styled(label, style)
}

fn render_buttons(app: &App, f: &mut Frame<'_>, area: Rect) {
    let screen = app.screen();
    let mut spans = vec![button(
        "[ Load ]",
        screen.load_enabled,
        app.focus == Focus::Load,
    )];
    if screen.reset_visible {
        spans.push(Span::raw("  "));
        spans.push(button("[ Reset ]", true, app.focus == Focus::Reset));
    }

    f.render_widget(
        Paragraph::new(TextLine::from(spans)).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_error(app: &App, f: &mut Frame<'_>, area: Rect) {
    let Some(message) = &app.screen().error else {
        return;
    };
    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    f.render_widget(
        Paragraph::new(message.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(block),
        area,
    );
}

fn render_status(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Status ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));
    f.render_widget(
        Paragraph::new(app.status_message.as_str()).block(block),
        area,
    );
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let hint = Paragraph::new(
        "Tab: next  Enter: choose  /: filter  l: load  r: reset  F1: help  q: quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(hint, area);
}
