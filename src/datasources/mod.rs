pub mod agri_backend;

pub use agri_backend::{AgriBackend, HttpBackend, ImageUpload};
