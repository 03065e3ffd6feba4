use super::render_frame;
use crate::logic::DashboardSnapshot;
use crate::models::SensorField;
use crate::ui::components::{field_gauge, ScoreGauge, TrendChart, TrendKind};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

pub struct OverviewScreen<'a> {
    pub snapshot: &'a DashboardSnapshot,
    pub theme: &'a Theme,
}

impl<'a> OverviewScreen<'a> {
    pub fn new(snapshot: &'a DashboardSnapshot, theme: &'a Theme) -> Self {
        Self { snapshot, theme }
    }
}

impl Widget for OverviewScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let body = render_frame("Overview", self.snapshot, &[], self.theme, area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Gauges row
                Constraint::Length(1), // Remote history
                Constraint::Min(8),    // Charts
            ])
            .split(body);

        self.render_gauges(chunks[0], buf);
        self.render_remote_summary(chunks[1], buf);

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        TrendChart::new(
            "Sensor Trends",
            &self.snapshot.chart,
            TrendKind::Climate,
            self.theme,
        )
        .render(charts[0], buf);
        TrendChart::new(
            "Nutrient Levels",
            &self.snapshot.chart,
            TrendKind::Nutrients,
            self.theme,
        )
        .render(charts[1], buf);
    }
}

impl OverviewScreen<'_> {
    fn render_gauges(&self, area: Rect, buf: &mut Buffer) {
        let gauge_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
            ])
            .split(area);

        ScoreGauge::new(self.snapshot.score, self.theme).render(gauge_chunks[0], buf);

        let reading = &self.snapshot.reading;
        let fields = [
            SensorField::Temp,
            SensorField::Humidity,
            SensorField::Ph,
            SensorField::Rainfall,
        ];
        for (field, chunk) in fields.into_iter().zip(gauge_chunks.iter().skip(1)) {
            field_gauge(field, reading.get(field), self.theme).render(*chunk, buf);
        }
    }

    fn render_remote_summary(&self, area: Rect, buf: &mut Buffer) {
        let summary = match self.snapshot.remote_history_len {
            Some(n) => format!("Remote history: {} readings", n),
            None => "Remote history: not loaded".to_string(),
        };
        Paragraph::new(Line::from(Span::styled(summary, self.theme.dim()))).render(area, buf);
    }
}
