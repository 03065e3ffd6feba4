use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct InputWidget<'a> {
    label: &'a str,
    value: &'a str,
    focused: bool,
    disabled: bool,
    theme: &'a Theme,
}

impl<'a> InputWidget<'a> {
    pub fn new(label: &'a str, value: &'a str, theme: &'a Theme) -> Self {
        Self {
            label,
            value,
            focused: false,
            disabled: false,
            theme,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Greyed out and without cursor, e.g. while a request is in flight.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused && !self.disabled {
            self.theme.border_focused()
        } else {
            self.theme.border()
        };

        let block = Block::default()
            .title(self.label)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        let line = if self.disabled {
            Line::from(Span::styled(self.value, self.theme.dim()))
        } else if self.focused {
            Line::from(vec![
                Span::styled(self.value, self.theme.normal()),
                Span::styled(" ", self.theme.selected()),
            ])
        } else {
            Line::from(Span::styled(self.value, self.theme.normal()))
        };

        Paragraph::new(line).render(inner, buf);
    }
}
