//! Library crate for cherryty-back, exposing modules for binaries and integration tests.

/// Runtime configuration loaded from disk and environment.
pub mod config;
/// Snapshot persistence layer.
pub mod dao;
mod dto;
/// Error types shared by services and HTTP handlers.
pub mod error;
/// HTTP route trees.
pub mod routes;
/// Business operations and background tasks.
pub mod services;
/// Shared application state and the in-memory tables.
pub mod state;
