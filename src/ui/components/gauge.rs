use crate::models::SensorField;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct GaugeWidget<'a> {
    title: &'a str,
    value: Option<f64>,
    unit: &'a str,
    min: f64,
    max: f64,
    thresholds: Vec<(f64, Color)>,
    precision: usize,
    theme: &'a Theme,
}

impl<'a> GaugeWidget<'a> {
    pub fn new(title: &'a str, value: Option<f64>, unit: &'a str, theme: &'a Theme) -> Self {
        Self {
            title,
            value,
            unit,
            min: 0.0,
            max: 100.0,
            thresholds: Vec::new(),
            precision: 1,
            theme,
        }
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn thresholds(mut self, thresholds: Vec<(f64, Color)>) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    fn get_color(&self, value: f64) -> Color {
        for (threshold, color) in self.thresholds.iter().rev() {
            if value >= *threshold {
                return *color;
            }
        }
        self.theme.fg
    }
}

impl Widget for GaugeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 || area.width < 10 {
            return;
        }

        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(self.theme.border());

        let inner = block.inner(area);
        block.render(area, buf);

        match self.value {
            Some(value) => {
                let color = self.get_color(value);
                let value_str = format!("{:.prec$}{}", value, self.unit, prec = self.precision);

                let value_line =
                    Line::from(vec![Span::styled(value_str, Style::default().fg(color))]);
                Paragraph::new(value_line).render(inner, buf);

                // Bar if space allows
                if inner.height >= 2 {
                    let bar_area = Rect {
                        x: inner.x,
                        y: inner.y + 1,
                        width: inner.width,
                        height: 1,
                    };

                    let span = self.max - self.min;
                    let ratio = if span > 0.0 {
                        ((value - self.min) / span).clamp(0.0, 1.0)
                    } else {
                        0.0
                    };
                    let filled = (bar_area.width as f64 * ratio) as u16;

                    for x in bar_area.x..bar_area.x + bar_area.width {
                        let ch = if x < bar_area.x + filled {
                            '█'
                        } else {
                            '░'
                        };
                        buf[(x, bar_area.y)].set_char(ch).set_fg(color);
                    }
                }
            }
            None => {
                let na_line = Line::from(vec![Span::styled("N/A", self.theme.dim())]);
                Paragraph::new(na_line).render(inner, buf);
            }
        }
    }
}

/// Gauge for one sensor field, scaled to the range the dashboard shows for it.
pub fn field_gauge<'a>(field: SensorField, value: f64, theme: &'a Theme) -> GaugeWidget<'a> {
    let base = GaugeWidget::new(field.label(), Some(value), field.unit(), theme)
        .precision(field.precision());
    match field {
        SensorField::N | SensorField::P | SensorField::K => base
            .range(0.0, 120.0)
            .thresholds(vec![(0.0, theme.warning), (30.0, theme.success)]),
        SensorField::Temp => base.range(0.0, 50.0).thresholds(vec![
            (0.0, theme.warning),
            (18.0, theme.success),
            (38.0, theme.error),
        ]),
        SensorField::Humidity => base
            .range(0.0, 100.0)
            .thresholds(vec![(0.0, theme.warning), (40.0, theme.success)]),
        SensorField::Ph => base.range(0.0, 14.0).thresholds(vec![
            (0.0, theme.error),
            (5.5, theme.success),
            (7.5, theme.warning),
        ]),
        SensorField::Rainfall => base
            .range(0.0, 250.0)
            .thresholds(vec![(0.0, theme.warning), (60.0, theme.success)]),
    }
}

/// Large AgriScore readout with a zone-coloured bar.
pub struct ScoreGauge<'a> {
    score: u8,
    theme: &'a Theme,
}

impl<'a> ScoreGauge<'a> {
    pub fn new(score: u8, theme: &'a Theme) -> Self {
        Self { score, theme }
    }
}

impl Widget for ScoreGauge<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 || area.width < 10 {
            return;
        }

        let block = Block::default()
            .title(Span::styled("AgriScore", self.theme.header()))
            .borders(Borders::ALL)
            .border_style(self.theme.border());
        let inner = block.inner(area);
        block.render(area, buf);

        let color = self.theme.score_color(self.score);
        let line = Line::from(vec![
            Span::styled(
                format!("{}", self.score),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" / 100", self.theme.dim()),
        ]);
        Paragraph::new(line).render(inner, buf);

        if inner.height >= 2 {
            let y = inner.y + 1;
            let filled = (inner.width as u32 * self.score as u32 / 100) as u16;
            for x in inner.x..inner.x + inner.width {
                let ch = if x < inner.x + filled { '█' } else { '░' };
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}
