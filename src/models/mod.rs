pub mod history;
pub mod notification;
pub mod preference;
pub mod sensor;

pub use history::*;
pub use notification::*;
pub use preference::*;
pub use sensor::*;
