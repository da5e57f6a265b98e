pub mod config;
pub mod log;
pub mod simulation;
pub mod store;
