use super::{render_frame, result_title};
use crate::logic::DashboardSnapshot;
use crate::ui::components::InputWidget;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::Span,
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Leaf image upload and the last diagnosis.
pub struct DiseaseScreen<'a> {
    pub snapshot: &'a DashboardSnapshot,
    pub theme: &'a Theme,
    pub path: &'a str,
    pub editing: bool,
}

impl<'a> DiseaseScreen<'a> {
    pub fn new(snapshot: &'a DashboardSnapshot, theme: &'a Theme) -> Self {
        Self {
            snapshot,
            theme,
            path: "",
            editing: false,
        }
    }

    pub fn with_path(mut self, path: &'a str, editing: bool) -> Self {
        self.path = path;
        self.editing = editing;
        self
    }
}

impl Widget for DiseaseScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let nav: &[(&str, &str)] = if self.editing {
            &[("Enter", "Done"), ("Esc", "Cancel")]
        } else if self.snapshot.busy {
            &[]
        } else {
            &[("Enter", "Edit path"), ("u", "Upload")]
        };
        let body = render_frame(
            "Disease Detection",
            self.snapshot,
            nav,
            self.theme,
            area,
            buf,
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(body);

        InputWidget::new("Leaf image path", self.path, self.theme)
            .focused(self.editing)
            .disabled(self.snapshot.busy)
            .render(chunks[0], buf);

        let block = Block::default()
            .title(Span::styled(
                result_title("Diagnosis", self.snapshot.disease_received),
                self.theme.header(),
            ))
            .borders(Borders::ALL)
            .border_style(self.theme.border());

        let para = match self.snapshot.disease.as_deref() {
            Some(text) => Paragraph::new(text).style(self.theme.normal()),
            None => Paragraph::new(Span::styled("No image analyzed yet", self.theme.dim())),
        };
        para.block(block)
            .wrap(Wrap { trim: false })
            .render(chunks[1], buf);
    }
}
