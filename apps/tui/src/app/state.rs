use chrono::NaiveDateTime;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use prayer_core::{Controller, Effect, Event, Focus, KeyValueStore, Screen, SelectId, SelectOption};
use throbber_widgets_tui::ThrobberState;

pub type AppStore = Box<dyn KeyValueStore>;

pub struct App {
    pub running: bool,
    pub controller: Controller<AppStore>,
    pub focus: Focus,
    /// Index into the focused select's visible (filtered) options
    pub highlight: usize,
    pub filter: String,
    pub filtering: bool,
    pub show_help: bool,
    pub throbber: ThrobberState,
    pub status_message: String,
    pending: Vec<Effect>,
    matcher: SkimMatcherV2,
}

impl App {
    pub fn new(controller: Controller<AppStore>) -> Self {
        Self {
            running: true,
            controller,
            focus: Focus::Select(SelectId::Continent),
            highlight: 0,
            filter: String::new(),
            filtering: false,
            show_help: false,
            throbber: ThrobberState::default(),
            status_message: String::from("Pick a continent to begin"),
            pending: Vec::new(),
            matcher: SkimMatcherV2::default(),
        }
    }

    pub fn screen(&self) -> &Screen {
        self.controller.screen()
    }

    pub fn start(&mut self, now: NaiveDateTime) {
        let effects = self.controller.start(now);
        self.pending.extend(effects);
        self.sync_highlight();
    }

    pub fn dispatch(&mut self, event: Event, now: NaiveDateTime) {
        let effects = self.controller.handle(event, now);
        self.pending.extend(effects);
        self.clamp_highlight();
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.pending)
    }

    /// Advances the loading spinner while any list is in flight.
    pub fn update(&mut self) {
        let screen = self.screen();
        if screen.country.loading || screen.city.loading {
            self.throbber.calc_next();
        }
    }

    pub const fn focused_select(&self) -> Option<SelectId> {
        self.focus.select()
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.filter.clear();
        self.filtering = false;
        self.sync_highlight();
    }

    /// Options of the focused select that match the filter, in list order.
    pub fn visible_options(&self) -> Vec<&SelectOption> {
        let Some(id) = self.focused_select() else {
            return Vec::new();
        };
        let options = &self.screen().select(id).options;
        if self.filter.is_empty() {
            return options.iter().collect();
        }

        options
            .iter()
            .filter(|option| self.matcher.fuzzy_match(&option.label, &self.filter).is_some())
            .collect()
    }

    pub fn highlighted_option(&self) -> Option<&SelectOption> {
        self.visible_options().get(self.highlight).copied()
    }

    pub fn push_filter(&mut self, c: char) {
        self.filter.push(c);
        self.highlight = 0;
    }

    pub fn pop_filter(&mut self) {
        self.filter.pop();
        self.clamp_highlight();
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.filtering = false;
        self.sync_highlight();
    }

    /// Puts the highlight on the committed value, if it is visible.
    fn sync_highlight(&mut self) {
        if self.filter.is_empty() {
            self.highlight = self.screen().committed_position(self.focus).unwrap_or(0);
            return;
        }
        let current = self
            .focused_select()
            .and_then(|id| self.screen().select(id).value.clone());
        self.highlight = current
            .and_then(|value| {
                self.visible_options()
                    .iter()
                    .position(|option| option.value == value)
            })
            .unwrap_or(0);
    }

    fn clamp_highlight(&mut self) {
        let len = self.visible_options().len();
        if self.highlight >= len {
            self.highlight = len.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prayer_core::MemoryStore;

    fn app() -> App {
        let store: AppStore = Box::new(MemoryStore::new());
        App::new(Controller::new(store))
    }

    #[test]
    fn reset_is_not_focusable_until_shown() {
        let app = app();
        let order = app.screen().focus_order();
        assert_eq!(order.len(), 5);
        assert_eq!(order.last(), Some(&Focus::Load));
    }

    #[test]
    fn method_focus_highlights_the_selected_method() {
        let mut app = app();
        app.set_focus(Focus::Select(SelectId::Method));

        assert_eq!(app.visible_options().len(), 5);
        assert_eq!(app.highlighted_option().map(|o| o.value.as_str()), Some("2"));
    }

    #[test]
    fn fuzzy_filter_narrows_visible_options() {
        let mut app = app();
        app.set_focus(Focus::Select(SelectId::Continent));

        for c in "amr".chars() {
            app.push_filter(c);
        }

        let labels = app
            .visible_options()
            .iter()
            .map(|o| o.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["Americas"]);

        app.clear_filter();
        assert_eq!(app.visible_options().len(), 5);
    }
}
