//! HR server: configuration, router and handlers. The binary in `main.rs`
//! wires these to the CLI.

pub mod config;
pub mod http;
pub mod routes;

pub use config::AppConfig;
pub use http::{AppState, ServeConfig, build_router, serve};
