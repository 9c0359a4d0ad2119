//! caseagent HTTP server: application state, API routes and CLI.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod state;
