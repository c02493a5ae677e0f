use chrono::NaiveDateTime;
use prayer_core::{Controller, Effect, Event, Focus, KeyValueStore, Screen, SelectId};
use ratzilla::event::KeyCode;

pub type WebStore = Box<dyn KeyValueStore>;

/// Keyboard state layered over the controller.
pub struct WebApp {
    pub controller: Controller<WebStore>,
    pub focus: Focus,
    pub highlight: usize,
    pub status: String,
}

impl WebApp {
    pub fn new(controller: Controller<WebStore>) -> Self {
        Self {
            controller,
            focus: Focus::Select(SelectId::Continent),
            highlight: 0,
            status: String::from("Pick a continent to begin"),
        }
    }

    pub fn screen(&self) -> &Screen {
        self.controller.screen()
    }

    pub fn start(&mut self, now: NaiveDateTime) -> Vec<Effect> {
        let effects = self.controller.start(now);
        self.sync_highlight();
        effects
    }

    pub fn dispatch(&mut self, event: Event, now: NaiveDateTime) -> Vec<Effect> {
        let effects = self.controller.handle(event, now);
        let len = self.option_count();
        if self.highlight >= len {
            self.highlight = len.saturating_sub(1);
        }
        effects
    }

    pub const fn focused_select(&self) -> Option<SelectId> {
        self.focus.select()
    }

    pub fn handle_key(&mut self, code: KeyCode, shift: bool, now: NaiveDateTime) -> Vec<Effect> {
        match code {
            KeyCode::Tab => {
                self.move_focus(!shift);
                Vec::new()
            }
            KeyCode::Up => {
                self.move_highlight(false);
                Vec::new()
            }
            KeyCode::Down => {
                self.move_highlight(true);
                Vec::new()
            }
            KeyCode::Enter => match self.focus {
                Focus::Select(id) => self.commit_select(id, now),
                Focus::Load => self.request_load(now),
                Focus::Reset => self.request_reset(now),
            },
            KeyCode::Char('l') => self.request_load(now),
            KeyCode::Char('r') => self.request_reset(now),
            _ => Vec::new(),
        }
    }

    fn option_count(&self) -> usize {
        self.focused_select()
            .map_or(0, |id| self.screen().select(id).options.len())
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.sync_highlight();
    }

    fn sync_highlight(&mut self) {
        self.highlight = self.screen().committed_position(self.focus).unwrap_or(0);
    }

    fn move_focus(&mut self, forward: bool) {
        let order = self.screen().focus_order();
        let len = order.len();
        let index = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        self.set_focus(order[next]);
    }

    fn move_highlight(&mut self, down: bool) {
        let len = self.option_count();
        if len == 0 {
            return;
        }
        self.highlight = if down {
            (self.highlight + 1) % len
        } else {
            (self.highlight + len - 1) % len
        };
    }

    fn commit_select(&mut self, id: SelectId, now: NaiveDateTime) -> Vec<Effect> {
        let control = self.screen().select(id);
        if control.disabled {
            return Vec::new();
        }
        let Some(value) = control.options.get(self.highlight).map(|o| o.value.clone()) else {
            return Vec::new();
        };
        let Some(event) = Event::select(id, value) else {
            return Vec::new();
        };

        let effects = self.dispatch(event, now);
        self.status = format!("{} set", id.label());
        if let Some(next) = Focus::after_commit(id) {
            self.set_focus(next);
        }
        effects
    }

    fn request_load(&mut self, now: NaiveDateTime) -> Vec<Effect> {
        if !self.screen().load_enabled {
            self.status = "Select a continent, country and city first".to_string();
            return Vec::new();
        }
        self.status = "Fetching prayer times...".to_string();
        self.dispatch(Event::LoadRequested, now)
    }

    fn request_reset(&mut self, now: NaiveDateTime) -> Vec<Effect> {
        if !self.screen().reset_visible {
            return Vec::new();
        }
        let effects = self.dispatch(Event::ResetRequested, now);
        self.set_focus(Focus::Select(SelectId::Continent));
        self.status = "Selection cleared".to_string();
        effects
    }
}
