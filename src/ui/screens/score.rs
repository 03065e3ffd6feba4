use super::render_frame;
use crate::logic::DashboardSnapshot;
use crate::ui::components::ScoreGauge;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};

/// The composite score and the weighted factor table behind it.
pub struct ScoreScreen<'a> {
    pub snapshot: &'a DashboardSnapshot,
    pub theme: &'a Theme,
}

impl<'a> ScoreScreen<'a> {
    pub fn new(snapshot: &'a DashboardSnapshot, theme: &'a Theme) -> Self {
        Self { snapshot, theme }
    }
}

impl Widget for ScoreScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let body = render_frame("AgriScore", self.snapshot, &[], self.theme, area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(5)])
            .split(body);

        ScoreGauge::new(self.snapshot.score, self.theme).render(chunks[0], buf);
        self.render_breakdown(chunks[1], buf);
    }
}

impl ScoreScreen<'_> {
    fn render_breakdown(&self, area: Rect, buf: &mut Buffer) {
        let header = Row::new(vec![
            Cell::from("Factor"),
            Cell::from("Sub-score"),
            Cell::from("Points"),
        ])
        .style(self.theme.header());

        let rows: Vec<Row> = self
            .snapshot
            .breakdown
            .contributions()
            .into_iter()
            .map(|(label, sub, points)| {
                let sub_pct = (sub * 100.0).round() as u8;
                Row::new(vec![
                    Cell::from(label),
                    Cell::from(Span::styled(
                        format!("{}%", sub_pct),
                        Style::default().fg(self.theme.score_color(sub_pct)),
                    )),
                    Cell::from(format!("{:.1}", points)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(14),
                Constraint::Length(10),
                Constraint::Length(8),
            ],
        )
        .header(header)
        .style(self.theme.normal())
        .block(
            Block::default()
                .title(Span::styled("What affects the score?", self.theme.header()))
                .borders(Borders::ALL)
                .border_style(self.theme.border()),
        );

        table.render(area, buf);
    }
}
