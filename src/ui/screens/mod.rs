pub mod disease;
pub mod overview;
pub mod recommend;
pub mod score;
pub mod sensors;

pub use disease::DiseaseScreen;
pub use overview::OverviewScreen;
pub use recommend::RecommendScreen;
pub use score::ScoreScreen;
pub use sensors::SensorsScreen;

use crate::logic::DashboardSnapshot;
use crate::ui::components::{nav_line, StatusLine};
use crate::ui::Theme;
use chrono::{DateTime, Local, Utc};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

/// Paints the background, title, toast and nav rows, returning the body area.
fn render_frame(
    title: &str,
    snapshot: &DashboardSnapshot,
    nav: &[(&str, &str)],
    theme: &Theme,
    area: Rect,
    buf: &mut Buffer,
) -> Rect {
    Block::default().style(theme.base()).render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(6),    // Body
            Constraint::Length(1), // Toast
            Constraint::Length(1), // Nav
        ])
        .split(area);

    let header = Line::from(vec![
        Span::styled("AgriScore", theme.title()),
        Span::styled(" - ", theme.dim()),
        Span::styled(title.to_string(), theme.header()),
    ]);
    Paragraph::new(header).render(chunks[0], buf);

    StatusLine::new(snapshot.notification.as_ref(), snapshot.busy, theme).render(chunks[2], buf);
    let mut keys = nav.to_vec();
    if snapshot.notification.is_some() {
        keys.push(("x", "Dismiss"));
    }
    Paragraph::new(nav_line(&keys, theme)).render(chunks[3], buf);

    chunks[1]
}

/// Block title for a remote result, stamped with the local time it arrived.
fn result_title(label: &str, received: Option<DateTime<Utc>>) -> String {
    match received {
        Some(at) => format!(
            "{} (received {})",
            label,
            at.with_timezone(&Local).format("%H:%M:%S")
        ),
        None => label.to_string(),
    }
}
