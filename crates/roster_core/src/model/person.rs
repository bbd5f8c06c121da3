//! Person record.
//!
//! # Responsibility
//! - Define the person shape persisted in the `people` table.
//! - Carry the optional home/business address associations.
//!
//! # Invariants
//! - `id` is `None` until the store assigns it.
//! - `dob` is normalized to UTC; storage uses epoch milliseconds.
//! - An associated address may itself be unsaved; it is persisted before
//!   the person row and its fresh id recorded as the foreign key.

use crate::model::address::Address;
use crate::model::{require_non_blank, ValidationError};
use crate::repo::crud::{EntityId, Identified};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A person on the roster, with optional compensation and contact fields
/// and up to two independently persisted address associations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Store-assigned identity. `None` means never persisted.
    pub id: Option<EntityId>,
    pub first_name: String,
    pub last_name: String,
    /// Date of birth, normalized to UTC.
    pub dob: DateTime<Utc>,
    /// Annual salary. Stored as exact decimal text.
    pub salary: Option<Decimal>,
    pub email: Option<String>,
    /// Optional home address association.
    pub home_address: Option<Address>,
    /// Optional business address association.
    pub business_address: Option<Address>,
}

impl Person {
    /// Creates an unsaved person with the required fields set.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        dob: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            dob,
            salary: None,
            email: None,
            home_address: None,
            business_address: None,
        }
    }

    /// Checks invariants that must hold before persistence.
    ///
    /// Associated addresses are validated by their own repository on the
    /// cascade path.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("person", "first_name", &self.first_name)?;
        require_non_blank("person", "last_name", &self.last_name)?;
        Ok(())
    }
}

impl Identified for Person {
    fn identity(&self) -> Option<EntityId> {
        self.id
    }

    fn assign_identity(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::Person;
    use crate::model::ValidationError;
    use crate::repo::crud::Identified;
    use chrono::{TimeZone, Utc};

    fn sample() -> Person {
        Person::new(
            "John",
            "Smith",
            Utc.with_ymd_and_hms(1980, 11, 15, 21, 15, 0).unwrap(),
        )
    }

    #[test]
    fn new_person_is_unsaved() {
        let person = sample();
        assert_eq!(person.identity(), None);
        assert!(person.salary.is_none());
        assert!(person.home_address.is_none());
        assert!(person.business_address.is_none());
    }

    #[test]
    fn assign_identity_sets_the_id_slot() {
        let mut person = sample();
        person.assign_identity(41);
        assert_eq!(person.identity(), Some(41));
    }

    #[test]
    fn person_serializes_to_json_and_back() {
        let mut person = sample();
        person.email = Some("john.smith@example.com".to_string());

        let json = serde_json::to_string(&person).unwrap();
        let back: Person = serde_json::from_str(&json).unwrap();
        assert_eq!(back, person);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut person = sample();
        person.last_name = String::new();
        assert_eq!(
            person.validate(),
            Err(ValidationError::BlankField {
                record: "person",
                field: "last_name"
            })
        );
    }
}
