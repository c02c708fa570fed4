//! Configuration block management for reverse proxy instances.

pub mod blocks;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use blocks::{BlockService, ConfigurationBlock};
pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
