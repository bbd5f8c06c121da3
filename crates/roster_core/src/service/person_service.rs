//! Person use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for core callers.
//! - Delegate persistence to the people repository.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.

use crate::model::person::Person;
use crate::repo::crud::{EntityId, RepoResult};
use crate::repo::person_repo::PersonRepository;
use chrono::{DateTime, Utc};

/// Use-case service wrapper for person CRUD operations.
pub struct PersonService<'conn> {
    repo: PersonRepository<'conn>,
}

impl<'conn> PersonService<'conn> {
    /// Creates a service using the provided repository.
    pub fn new(repo: PersonRepository<'conn>) -> Self {
        Self { repo }
    }

    /// Creates and persists a person from the required fields, returning
    /// the saved record with its identity set.
    pub fn register(
        &self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        dob: DateTime<Utc>,
    ) -> RepoResult<Person> {
        let mut person = Person::new(first_name, last_name, dob);
        self.repo.save(&mut person)?;
        Ok(person)
    }

    /// Persists a caller-constructed person, cascading to its addresses.
    pub fn save(&self, person: &mut Person) -> RepoResult<()> {
        self.repo.save(person)
    }

    /// Gets one person by identity.
    pub fn get(&self, id: EntityId) -> RepoResult<Option<Person>> {
        self.repo.find_by_id(id)
    }

    /// Lists every person on the roster.
    pub fn list(&self) -> RepoResult<Vec<Person>> {
        self.repo.find_all()
    }

    /// Returns the roster headcount.
    pub fn headcount(&self) -> RepoResult<i64> {
        self.repo.count()
    }

    /// Rewrites a saved person's mutable fields.
    pub fn update(&self, person: &Person) -> RepoResult<()> {
        self.repo.update(person)
    }

    /// Removes one saved person.
    pub fn remove(&self, person: &Person) -> RepoResult<()> {
        self.repo.delete(person)
    }

    /// Removes all given saved people in one statement.
    pub fn remove_many(&self, people: &[Person]) -> RepoResult<()> {
        self.repo.delete_many(people)
    }
}
