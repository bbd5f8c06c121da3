//! Postal address record.
//!
//! # Responsibility
//! - Define the address shape persisted in the `addresses` table.
//! - Provide the closed region classification used for reporting.
//!
//! # Invariants
//! - `id` is `None` until the store assigns it; a present id means the row
//!   exists until deleted.

use crate::model::{require_non_blank, ValidationError};
use crate::repo::crud::{EntityId, Identified};
use serde::{Deserialize, Serialize};

/// Broad geographic region an address falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Northeast,
    Midwest,
    South,
    West,
}

/// A postal address, independently persisted and referenced from people
/// rows via a foreign-key column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Store-assigned identity. `None` means never persisted.
    pub id: Option<EntityId>,
    pub street_address: String,
    /// Secondary line (apartment, suite). Optional.
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub postcode: String,
    /// Optional administrative subdivision.
    pub county: Option<String>,
    pub region: Region,
    pub country: String,
}

impl Address {
    /// Creates an unsaved address with the required fields set.
    pub fn new(
        street_address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postcode: impl Into<String>,
        region: Region,
        country: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            street_address: street_address.into(),
            address2: None,
            city: city.into(),
            state: state.into(),
            postcode: postcode.into(),
            county: None,
            region,
            country: country.into(),
        }
    }

    /// Checks invariants that must hold before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("address", "street_address", &self.street_address)?;
        require_non_blank("address", "city", &self.city)?;
        require_non_blank("address", "state", &self.state)?;
        require_non_blank("address", "postcode", &self.postcode)?;
        require_non_blank("address", "country", &self.country)?;
        Ok(())
    }
}

impl Identified for Address {
    fn identity(&self) -> Option<EntityId> {
        self.id
    }

    fn assign_identity(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}
