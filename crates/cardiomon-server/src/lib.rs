//! Monitor service wiring: configuration, record store, ingestion and the
//! periodic evaluation pass.

pub mod config;
pub mod monitor;


pub use config::ServerConfig;
pub use monitor::Monitor;
