pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod services;

pub use error::{NovaError, NovaResult};
