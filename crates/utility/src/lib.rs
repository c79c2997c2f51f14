pub mod config;
pub mod geo;
pub mod id;
pub mod serde;
