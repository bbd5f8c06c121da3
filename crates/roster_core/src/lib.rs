//! Core persistence logic for the roster.
//! This crate is the single source of truth for storage invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::address::{Address, Region};
pub use model::person::Person;
pub use model::ValidationError;
pub use repo::address_repo::AddressRepository;
pub use repo::crud::{
    CrudRepository, EntityId, Identified, RepoError, RepoResult, RowMapping,
};
pub use repo::person_repo::PersonRepository;
pub use repo::sql::{CrudOperation, SqlSet};
pub use service::person_service::PersonService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
