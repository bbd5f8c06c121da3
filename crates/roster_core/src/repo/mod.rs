//! Repository layer: the generic CRUD engine and its concrete repositories.
//!
//! # Responsibility
//! - Implement CRUD once in [`crud::CrudRepository`], parameterized over an
//!   entity type and its row mapping.
//! - Keep SQL text and column mapping inside each concrete repository.
//!
//! # Invariants
//! - Write paths validate model invariants before SQL mutations.
//! - Dependent rows are persisted before the rows that reference them.

pub mod address_repo;
pub mod crud;
pub mod person_repo;
pub mod sql;
