pub mod config;
pub mod influx;
pub mod logging;
pub mod modem;
pub mod parser;
pub mod pipeline;
pub mod service;
pub mod stats;

pub use config::AppConfig;
pub use service::Service;
pub use stats::DslStats;
