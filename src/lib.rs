// Core infrastructure modules
pub mod core;

// Feature-specific modules
pub mod cli;
pub mod config;
pub mod repl;
pub mod results_grid;
pub mod sandbox;
pub mod session;
