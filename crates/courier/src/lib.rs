pub use crate::app::run;
pub use crate::config::CourierConfig;

pub mod app;
pub mod config;
pub mod terminal;
