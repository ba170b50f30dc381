//! Domain layer - Pure business abstractions
//!
//! Query normalization, size classification, pagination rules, repository
//! contracts and domain error types. No Axum here; SeaORM only appears in
//! error conversion.

pub mod catalog;
pub mod errors;
pub mod pagination;
pub mod repositories;
pub mod size;

pub use errors::DomainError;
pub use repositories::*;
