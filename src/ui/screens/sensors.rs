use super::render_frame;
use crate::logic::DashboardSnapshot;
use crate::models::SensorField;
use crate::ui::components::{field_gauge, InputWidget, ScoreGauge};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Widget,
};

/// IoT data form: one input per sensor field plus the live score.
pub struct SensorsScreen<'a> {
    pub snapshot: &'a DashboardSnapshot,
    pub theme: &'a Theme,
    pub focused_field: SensorField,
    pub editing: bool,
    pub edit_buffer: &'a str,
}

impl<'a> SensorsScreen<'a> {
    pub fn new(snapshot: &'a DashboardSnapshot, theme: &'a Theme) -> Self {
        Self {
            snapshot,
            theme,
            focused_field: SensorField::N,
            editing: false,
            edit_buffer: "",
        }
    }

    pub fn with_focus(mut self, field: SensorField) -> Self {
        self.focused_field = field;
        self
    }

    pub fn editing(mut self, editing: bool, buffer: &'a str) -> Self {
        self.editing = editing;
        self.edit_buffer = buffer;
        self
    }
}

impl Widget for SensorsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let nav: &[(&str, &str)] = if self.editing {
            &[("Enter", "Apply"), ("Esc", "Cancel")]
        } else {
            &[("↑↓", "Field"), ("Enter", "Edit"), ("s", "Save")]
        };
        let body = render_frame("IoT Data", self.snapshot, nav, self.theme, area, buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body);

        self.render_form(columns[0], buf);
        self.render_side(columns[1], buf);
    }
}

impl SensorsScreen<'_> {
    fn render_form(&self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(SensorField::ALL.iter().map(|_| Constraint::Length(3)))
            .split(area);

        let busy = self.snapshot.busy;
        for (field, row) in SensorField::ALL.iter().zip(rows.iter()) {
            let focused = *field == self.focused_field;
            let label = format!("{} ({})", field.label(), field.key());
            let value = if focused && self.editing {
                self.edit_buffer.to_string()
            } else {
                format!(
                    "{:.prec$}",
                    self.snapshot.reading.get(*field),
                    prec = field.precision()
                )
            };

            InputWidget::new(&label, &value, self.theme)
                .focused(focused)
                .disabled(busy)
                .render(*row, buf);
        }
    }

    fn render_side(&self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Min(0),
            ])
            .split(area);

        ScoreGauge::new(self.snapshot.score, self.theme).render(rows[0], buf);
        let reading = &self.snapshot.reading;
        for (field, row) in [SensorField::N, SensorField::P, SensorField::K]
            .into_iter()
            .zip(rows.iter().skip(1))
        {
            field_gauge(field, reading.get(field), self.theme).render(*row, buf);
        }
    }
}
