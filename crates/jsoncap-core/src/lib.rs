pub mod config;
pub mod logging;

// Capture pipeline, leaves first.
pub mod event;
pub mod filter;
pub mod pending;
pub mod staging;
pub mod capture;

// Collaborators and protocol plumbing.
pub mod control;
pub mod filename;
pub mod har;
pub mod settings;
pub mod sink;
