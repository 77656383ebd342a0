pub mod configuration;
pub mod console;
pub mod models;
pub mod policy;
pub mod services;
pub mod telemetry;
