//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Database connection and schema creation (db)
//! - Configuration loading (config)
//! - Password hashing and authorities (auth)
//! - Repository implementations (repositories)
//! - Application state (state)

pub mod auth;
pub mod config;
pub mod db;
pub mod repositories;
pub mod state;

pub use repositories::*;
pub use state::AppState;
