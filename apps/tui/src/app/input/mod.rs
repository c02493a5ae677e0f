mod helpers;

use chrono::NaiveDateTime;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use prayer_core::{Event, Focus, SelectId};

use crate::app::input::helpers::{position_or_first, wrap_decrement, wrap_increment};
use crate::app::state::App;

pub fn handle_input(app: &mut App, key: KeyEvent, now: NaiveDateTime) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.running = false;
        return;
    }

    if handle_help_toggle(app, key.code) {
        return;
    }

    if app.filtering {
        handle_filter_input(app, key.code, now);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Tab => move_focus(app, true),
        KeyCode::BackTab => move_focus(app, false),
        KeyCode::Up => move_highlight(app, false),
        KeyCode::Down => move_highlight(app, true),
        KeyCode::Enter => activate(app, now),
        KeyCode::Char('l') => request_load(app, now),
        KeyCode::Char('r') => request_reset(app, now),
        KeyCode::Char('/') if app.focused_select().is_some() => {
            app.filtering = true;
            app.status_message = format!("Filtering {}", app.focus.label().to_lowercase());
        }
        KeyCode::Esc => app.clear_filter(),
        _ => {}
    }
}

fn handle_help_toggle(app: &mut App, key: KeyCode) -> bool {
    if key == KeyCode::F(1) || (key == KeyCode::Char('?') && !app.filtering) {
        app.show_help = !app.show_help;
        return true;
    }

    if app.show_help {
        if key == KeyCode::Esc {
            app.show_help = false;
        }
        return true;
    }

    false
}

fn handle_filter_input(app: &mut App, key: KeyCode, now: NaiveDateTime) {
    match key {
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Backspace => app.pop_filter(),
        KeyCode::Up => move_highlight(app, false),
        KeyCode::Down => move_highlight(app, true),
        KeyCode::Enter => activate(app, now),
        KeyCode::Tab => move_focus(app, true),
        KeyCode::BackTab => move_focus(app, false),
        KeyCode::Char(c) => app.push_filter(c),
        _ => {}
    }
}

fn move_focus(app: &mut App, forward: bool) {
    let order = app.screen().focus_order();
    let index = position_or_first(&order, &app.focus);
    let next = if forward {
        wrap_increment(index, order.len())
    } else {
        wrap_decrement(index, order.len())
    };
    if let Some(focus) = order.get(next) {
        app.set_focus(*focus);
    }
}

fn move_highlight(app: &mut App, down: bool) {
    let len = app.visible_options().len();
    app.highlight = if down {
        wrap_increment(app.highlight, len)
    } else {
        wrap_decrement(app.highlight, len)
    };
}

fn activate(app: &mut App, now: NaiveDateTime) {
    match app.focus {
        Focus::Select(id) => commit_select(app, id, now),
        Focus::Load => request_load(app, now),
        Focus::Reset => request_reset(app, now),
    }
}

fn commit_select(app: &mut App, id: SelectId, now: NaiveDateTime) {
    if app.screen().select(id).disabled {
        return;
    }
    let Some(value) = app.highlighted_option().map(|option| option.value.clone()) else {
        return;
    };
    let Some(event) = Event::select(id, value) else {
        return;
    };

    app.filter.clear();
    app.filtering = false;
    app.dispatch(event, now);
    app.status_message = format!("{} set", id.label());

    if let Some(next) = Focus::after_commit(id) {
        app.set_focus(next);
    }
}

fn request_load(app: &mut App, now: NaiveDateTime) {
    if !app.screen().load_enabled {
        app.status_message = "Select a continent, country and city first".to_string();
        return;
    }
    app.dispatch(Event::LoadRequested, now);
    app.status_message = "Fetching prayer times...".to_string();
}

fn request_reset(app: &mut App, now: NaiveDateTime) {
    if !app.screen().reset_visible {
        return;
    }
    app.dispatch(Event::ResetRequested, now);
    app.set_focus(Focus::Select(SelectId::Continent));
    app.status_message = "Selection cleared".to_string();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::AppStore;
    use chrono::NaiveDate;
    use crossterm::event::KeyEvent;
    use prayer_core::{Controller, Effect, MemoryStore};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE), now());
    }

    fn app() -> App {
        let store: AppStore = Box::new(MemoryStore::new());
        let mut app = App::new(Controller::new(store));
        app.start(now());
        app
    }

    #[test]
    fn enter_on_continent_requests_countries_and_moves_on() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        let effects = app.take_effects();
        assert!(matches!(
            effects.as_slice(),
            [Effect::FetchCountries { continent, .. }] if continent == "americas"
        ));
        assert_eq!(app.focus, Focus::Select(SelectId::Country));
    }

    #[test]
    fn tab_cycles_focus_and_wraps() {
        let mut app = app();
        for _ in 0..5 {
            press(&mut app, KeyCode::Tab);
        }
        assert_eq!(app.focus, Focus::Select(SelectId::Continent));

        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focus, Focus::Load);
    }

    #[test]
    fn load_key_is_refused_without_a_city() {
        let mut app = app();
        press(&mut app, KeyCode::Char('l'));

        assert!(app.take_effects().is_empty());
        assert!(app.status_message.contains("first"));
    }

    #[test]
    fn slash_starts_a_filter_that_swallows_shortcuts() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('q'));

        assert!(app.running);
        assert_eq!(app.filter, "q");

        press(&mut app, KeyCode::Esc);
        assert!(!app.filtering);
        assert!(app.filter.is_empty());
    }

    #[test]
    fn ctrl_c_quits_even_while_filtering() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        handle_input(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            now(),
        );
        assert!(!app.running);
    }

    #[test]
    fn help_popup_captures_keys_until_closed() {
        let mut app = app();
        press(&mut app, KeyCode::F(1));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.show_help && app.running);

        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
    }
}
