pub mod chart;
pub mod gauge;
pub mod input;
pub mod status;

pub use chart::{TrendChart, TrendKind};
pub use gauge::{field_gauge, ScoreGauge};
pub use input::InputWidget;
pub use status::{nav_line, StatusLine};
