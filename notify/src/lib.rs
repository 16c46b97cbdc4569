// Shared library for reminder notification scheduling and record capture

pub mod config;
pub mod errors;
pub mod host;
pub mod models;
pub mod records;
pub mod scheduler;
pub mod telemetry;
pub mod trigger;
