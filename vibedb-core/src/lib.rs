pub mod config;
pub mod error;
pub mod model;

// Collaborator traits implemented by the front end
pub mod adapter;

// Instance discovery
pub mod registry;
pub mod scan;
pub mod selector;

// Orchestration + dispatch
pub mod command;
pub mod lifecycle;
