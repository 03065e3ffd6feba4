pub mod notifications;
pub mod result_store;
pub mod sensor_store;

pub use notifications::NotificationCenter;
pub use result_store::ResultStore;
pub use sensor_store::SensorStore;
