pub mod artifacts;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod errors;
pub mod status;
pub mod validators;
pub mod watcher;
