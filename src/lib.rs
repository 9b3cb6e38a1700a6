pub mod api;
pub mod config;
pub mod harness;
pub mod server;
pub mod slot;
pub mod telemetry;
