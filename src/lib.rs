pub mod config;
pub mod handlers;
pub mod models;
pub mod services;

#[cfg(feature = "web-server")]
pub mod web; // Single-page web surface

pub use config::Config;
