use crate::models::Notification;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Toast line: busy indicator first, then the active notification.
pub struct StatusLine<'a> {
    notification: Option<&'a Notification>,
    busy: bool,
    theme: &'a Theme,
}

impl<'a> StatusLine<'a> {
    pub fn new(notification: Option<&'a Notification>, busy: bool, theme: &'a Theme) -> Self {
        Self {
            notification,
            busy,
            theme,
        }
    }

    fn spans(&self) -> Vec<Span<'a>> {
        let mut spans = Vec::new();
        if self.busy {
            spans.push(Span::styled(
                "WORKING... ",
                self.theme.highlight().add_modifier(Modifier::SLOW_BLINK),
            ));
        }
        if let Some(n) = self.notification {
            let style = if n.is_error() {
                self.theme.error()
            } else {
                self.theme.success()
            };
            spans.push(Span::styled(n.message.as_str(), style));
        }
        spans
    }
}

impl Widget for StatusLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(Line::from(self.spans())).render(area, buf);
    }
}

/// Bottom key legend shared by every screen.
pub fn nav_line<'a>(extra: &[(&'a str, &'a str)], theme: &Theme) -> Line<'a> {
    let mut spans = Vec::new();
    for (key, label) in extra {
        spans.push(Span::styled(format!("[{}]", key), theme.nav_key()));
        spans.push(Span::styled(format!("{} ", label), theme.nav_label()));
    }
    spans.push(Span::styled("[1-5]", theme.nav_key()));
    spans.push(Span::styled("Screens ", theme.nav_label()));
    spans.push(Span::styled("[t]", theme.nav_key()));
    let other = if theme.preference.is_dark() {
        "Light "
    } else {
        "Dark "
    };
    spans.push(Span::styled(other, theme.nav_label()));
    spans.push(Span::styled("[q]", theme.nav_key()));
    spans.push(Span::styled("Quit", theme.nav_label()));
    Line::from(spans)
}
