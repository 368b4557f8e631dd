//! Domain layer - Pure business abstractions
//!
//! This layer holds no SeaORM entities or connections: only trait
//! definitions, DTOs, validation rules and domain error types.

pub mod errors;
pub mod repositories;
pub mod validation;

pub use errors::DomainError;
pub use repositories::*;
