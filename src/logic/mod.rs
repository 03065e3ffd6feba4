pub mod busy;
pub mod coordinator;
pub mod score;

pub use coordinator::{DashboardSnapshot, OperationCoordinator, Outcome};
pub use score::{compute_score, score_breakdown};
