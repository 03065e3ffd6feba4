use crate::db::Database;
use crate::models::{coerce_numeric, SensorField, ThemePreference};
use crate::ui::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Overview,
    Sensors,
    Recommend,
    Disease,
    Score,
}

impl Screen {
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Screen::Overview),
            '2' => Some(Screen::Sensors),
            '3' => Some(Screen::Recommend),
            '4' => Some(Screen::Disease),
            '5' => Some(Screen::Score),
            _ => None,
        }
    }
}

/// IoT data form: which field has focus and the in-progress edit.
pub struct FormState {
    pub focused_field: SensorField,
    pub editing: bool,
    pub edit_buffer: String,
}

impl FormState {
    pub fn new() -> Self {
        Self {
            focused_field: SensorField::N,
            editing: false,
            edit_buffer: String::new(),
        }
    }

    pub fn next_field(&mut self) {
        self.focused_field = self.focused_field.next();
    }

    pub fn prev_field(&mut self) {
        self.focused_field = self.focused_field.prev();
    }

    pub fn start_editing(&mut self, current_value: f64) {
        self.editing = true;
        self.edit_buffer = format!(
            "{:.prec$}",
            current_value,
            prec = self.focused_field.precision()
        );
    }

    pub fn cancel_editing(&mut self) {
        self.editing = false;
        self.edit_buffer.clear();
    }

    /// Ends the edit and returns the field with its coerced value.
    pub fn finish_editing(&mut self) -> (SensorField, f64) {
        self.editing = false;
        let raw = std::mem::take(&mut self.edit_buffer);
        (self.focused_field, coerce_numeric(&raw))
    }
}

/// Leaf image path entry on the disease screen.
pub struct UploadState {
    pub path: String,
    pub editing: bool,
    previous: String,
}

impl UploadState {
    pub fn new() -> Self {
        Self {
            path: String::new(),
            editing: false,
            previous: String::new(),
        }
    }

    pub fn start_editing(&mut self) {
        self.previous = self.path.clone();
        self.editing = true;
    }

    pub fn cancel_editing(&mut self) {
        self.path = std::mem::take(&mut self.previous);
        self.editing = false;
    }

    pub fn finish_editing(&mut self) {
        self.previous.clear();
        self.editing = false;
    }

    /// Trimmed path, `None` when nothing was chosen.
    pub fn selected(&self) -> Option<&str> {
        let trimmed = self.path.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

pub struct App {
    pub screen: Screen,
    pub should_quit: bool,
    pub theme: ThemePreference,
    pub db: Database,

    // Screen states
    pub form: FormState,
    pub upload: UploadState,
}

impl App {
    pub fn new(db: Database, theme: ThemePreference) -> Self {
        Self {
            screen: Screen::Overview,
            should_quit: false,
            theme,
            db,
            form: FormState::new(),
            upload: UploadState::new(),
        }
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn palette(&self) -> Theme {
        Theme::for_preference(self.theme)
    }

    /// True while a text field owns the keyboard.
    pub fn is_editing(&self) -> bool {
        self.form.editing || self.upload.editing
    }

    /// Flips the theme and writes it through to the settings table.
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(e) = self.db.save_theme(self.theme) {
            tracing::warn!("Failed to persist theme preference: {}", e);
        }
    }
}
