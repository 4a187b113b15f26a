pub mod config;
pub mod file;
pub mod models;
pub mod queries;

pub use file::{StateStore, StoreError};
