//! Services Layer
//!
//! Business logic that spans more than one repository call.

pub mod user_service;

pub use user_service::{AuthenticatedUser, authenticate};
