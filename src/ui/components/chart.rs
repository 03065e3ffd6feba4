use crate::models::HistoryPoint;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendKind {
    /// Temperature, humidity and pH.
    Climate,
    /// N, P and K where the point carries them.
    Nutrients,
}

/// Line chart over the chart series, one dataset per plotted quantity.
pub struct TrendChart<'a> {
    title: &'a str,
    points: &'a [HistoryPoint],
    kind: TrendKind,
    theme: &'a Theme,
}

impl<'a> TrendChart<'a> {
    pub fn new(
        title: &'a str,
        points: &'a [HistoryPoint],
        kind: TrendKind,
        theme: &'a Theme,
    ) -> Self {
        Self {
            title,
            points,
            kind,
            theme,
        }
    }

    fn series(&self) -> Vec<(&'static str, Color, Vec<(f64, f64)>)> {
        let collect = |get: fn(&HistoryPoint) -> Option<f64>| -> Vec<(f64, f64)> {
            self.points
                .iter()
                .enumerate()
                .filter_map(|(i, p)| get(p).map(|v| (i as f64, v)))
                .collect()
        };

        match self.kind {
            TrendKind::Climate => vec![
                ("Temp", self.theme.temp_line, collect(|p| Some(p.temp))),
                ("Humidity", self.theme.humidity_line, collect(|p| Some(p.humidity))),
                ("pH", self.theme.ph_line, collect(|p| Some(p.ph))),
            ],
            TrendKind::Nutrients => vec![
                ("N", self.theme.n_line, collect(|p| p.n)),
                ("P", self.theme.p_line, collect(|p| p.p)),
                ("K", self.theme.k_line, collect(|p| p.k)),
            ],
        }
    }
}

fn y_bounds(series: &[(&'static str, Color, Vec<(f64, f64)>)]) -> [f64; 2] {
    let max = series
        .iter()
        .flat_map(|(_, _, data)| data.iter().map(|(_, y)| *y))
        .filter(|y| y.is_finite())
        .fold(0.0_f64, f64::max);
    [0.0, if max > 0.0 { max * 1.1 } else { 1.0 }]
}

impl Widget for TrendChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let series = self.series();
        let bounds = y_bounds(&series);

        let datasets: Vec<Dataset> = series
            .iter()
            .filter(|(_, _, data)| !data.is_empty())
            .map(|(name, color, data)| {
                Dataset::default()
                    .name(*name)
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(*color))
                    .data(data)
            })
            .collect();

        let x_max = self.points.len().saturating_sub(1).max(1) as f64;
        let x_labels: Vec<Span> = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => vec![
                Span::styled(first.label.clone(), self.theme.dim()),
                Span::styled(last.label.clone(), self.theme.dim()),
            ],
            _ => Vec::new(),
        };

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .title(Span::styled(self.title, self.theme.header()))
                    .borders(Borders::ALL)
                    .border_style(self.theme.border()),
            )
            .x_axis(
                Axis::default()
                    .style(self.theme.dim())
                    .bounds([0.0, x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .style(self.theme.dim())
                    .bounds(bounds)
                    .labels(vec![
                        Span::styled("0", self.theme.dim()),
                        Span::styled(format!("{:.0}", bounds[1]), self.theme.dim()),
                    ]),
            );

        chart.render(area, buf);
    }
}
