use prayer_core::view::SelectControl;
use prayer_core::SelectOption;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;
use throbber_widgets_tui::{Throbber, ThrobberState};

/// First row to draw so that `selected` stays on screen.
pub const fn scroll_offset(total_rows: usize, max_visible_rows: usize, selected: usize) -> usize {
    if total_rows <= max_visible_rows || selected < max_visible_rows {
        return 0;
    }
    selected + 1 - max_visible_rows
}

fn border_style(focused: bool, disabled: bool) -> Style {
    match (focused, disabled) {
        (true, _) => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        (false, true) => Style::default().fg(Color::DarkGray),
        (false, false) => Style::default().fg(Color::Green),
    }
}

/// A closed select: its label plus the chosen value, or a spinner while the
/// list is loading.
pub fn render_select(
    f: &mut Frame<'_>,
    area: Rect,
    title: &str,
    control: &SelectControl,
    focused: bool,
    throbber: &ThrobberState,
) {
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_style(focused, control.disabled));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if control.loading {
        let spinner = Throbber::default()
            .label(control.display_text().to_string())
            .style(Style::default().fg(Color::Gray))
            .throbber_style(Style::default().fg(Color::Cyan));
        f.render_stateful_widget(spinner, inner, &mut throbber.clone());
        return;
    }

    let style = if control.selected().is_some() {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    f.render_widget(
        Paragraph::new(Span::styled(control.display_text().to_string(), style)),
        inner,
    );
}

/// The open list of the focused select.
pub fn render_options(
    f: &mut Frame<'_>,
    area: Rect,
    title: &str,
    options: &[&SelectOption],
    highlight: usize,
    current: Option<&str>,
    filter: Option<&str>,
) {
    let block_title = filter.map_or_else(
        || format!(" {title} ({}) ", options.len()),
        |filter| format!(" {title} /{filter} ({}) ", options.len()),
    );
    let block = Block::default()
        .title(block_title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    if options.is_empty() {
        let message = if filter.is_some() {
            "No matches."
        } else {
            "Nothing to choose yet."
        };
        f.render_widget(
            Paragraph::new(TextLine::from(Span::styled(
                message,
                Style::default().fg(Color::DarkGray),
            )))
            .block(block),
            area,
        );
        return;
    }

    let max_visible_rows = area.height.saturating_sub(2) as usize;
    let offset = scroll_offset(options.len(), max_visible_rows, highlight);

    let rows = options
        .iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .map(|(index, option)| {
            let marker = if current == Some(option.value.as_str()) {
                "* "
            } else {
                "  "
            };
            let style = if index == highlight {
                Style::default()
                    .bg(Color::Rgb(0, 0, 238))
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![Cell::from(format!("{marker}{}", option.label))]).style(style)
        });

    f.render_widget(Table::new(rows, [Constraint::Percentage(100)]).block(block), area);
}
