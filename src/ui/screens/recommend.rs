use super::{render_frame, result_title};
use crate::logic::DashboardSnapshot;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

pub struct RecommendScreen<'a> {
    pub snapshot: &'a DashboardSnapshot,
    pub theme: &'a Theme,
}

impl<'a> RecommendScreen<'a> {
    pub fn new(snapshot: &'a DashboardSnapshot, theme: &'a Theme) -> Self {
        Self { snapshot, theme }
    }
}

impl Widget for RecommendScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let nav: &[(&str, &str)] = if self.snapshot.busy {
            &[]
        } else {
            &[("r", "Recommend")]
        };
        let body = render_frame(
            "Crop Recommendation",
            self.snapshot,
            nav,
            self.theme,
            area,
            buf,
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(3)])
            .split(body);

        let intro = Line::from(vec![
            Span::styled("Saves the current reading, then asks the backend for ", self.theme.dim()),
            Span::styled("crops suited to it.", self.theme.dim()),
        ]);
        Paragraph::new(intro).render(chunks[0], buf);

        let block = Block::default()
            .title(Span::styled(
                result_title("Recommendation", self.snapshot.crops_received),
                self.theme.header(),
            ))
            .borders(Borders::ALL)
            .border_style(self.theme.border());

        let para = match self.snapshot.crops.as_deref() {
            Some(text) => Paragraph::new(text).style(self.theme.normal()),
            None => Paragraph::new(Span::styled("No recommendation yet", self.theme.dim())),
        };
        para.block(block)
            .wrap(Wrap { trim: false })
            .render(chunks[1], buf);
    }
}
