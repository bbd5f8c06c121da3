//! Address repository: SQL text and row mapping for `addresses`.
//!
//! # Responsibility
//! - Declare the address statements and bind all persisted columns in
//!   positional order.
//! - Own the region enum's to-db/parse pair and the aliased-column
//!   extraction shared with joining repositories.
//!
//! # Invariants
//! - `Address::validate()` runs before any SQL mutation.
//! - An unknown persisted region value is rejected, not masked.

use crate::model::address::{Address, Region};
use crate::repo::crud::{CrudRepository, EntityId, RepoError, RepoResult, RowMapping};
use crate::repo::sql::{CrudOperation, SqlSet};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

const SAVE_ADDRESS_SQL: &str = "INSERT INTO addresses
    (street_address, address2, city, state, postcode, county, region, country)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)";
const FIND_ADDRESS_BY_ID_SQL: &str = "SELECT
    id, street_address, address2, city, state, postcode, county, region, country
    FROM addresses WHERE id = ?";

/// Row mapping for [`Address`].
pub struct AddressMapping;

impl RowMapping for AddressMapping {
    type Entity = Address;

    fn entity_name(&self) -> &'static str {
        "address"
    }

    fn save_params(&self, entity: &Address) -> RepoResult<Vec<Value>> {
        entity.validate()?;

        Ok(vec![
            Value::Text(entity.street_address.clone()),
            opt_text(entity.address2.as_deref()),
            Value::Text(entity.city.clone()),
            Value::Text(entity.state.clone()),
            Value::Text(entity.postcode.clone()),
            opt_text(entity.county.as_deref()),
            Value::Text(region_to_db(entity.region).to_string()),
            Value::Text(entity.country.clone()),
        ])
    }

    fn update_params(&self, entity: &Address) -> RepoResult<Vec<Value>> {
        // Same mutable column set as save; addresses have no derived columns.
        self.save_params(entity)
    }

    fn entity_from_row(&self, row: &Row<'_>) -> RepoResult<Address> {
        address_from_row(row, "")?.ok_or_else(|| {
            RepoError::InvalidData("address row is missing its id column".to_string())
        })
    }
}

/// SQLite-backed address repository.
///
/// Declares only the statements person cascades need; the remaining
/// operations surface a configuration error if invoked.
pub struct AddressRepository<'conn> {
    repo: CrudRepository<'conn, AddressMapping>,
}

impl<'conn> AddressRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> RepoResult<Self> {
        let sql = SqlSet::new()
            .declare(CrudOperation::Save, SAVE_ADDRESS_SQL)?
            .declare(CrudOperation::FindById, FIND_ADDRESS_BY_ID_SQL)?;

        Ok(Self {
            repo: CrudRepository::new(conn, AddressMapping, sql),
        })
    }

    /// Persists an unsaved address and stamps its generated identity.
    pub fn save(&self, address: &mut Address) -> RepoResult<()> {
        self.repo.save(address)
    }

    pub fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Address>> {
        self.repo.find_by_id(id)
    }
}

/// Reads an optional address from aliased columns (`home_`, `biz_`, or no
/// prefix for a plain address select).
///
/// Absence is signaled by SQL NULL in the aliased id column; any other
/// NULL in a required column is a mapping error.
pub(crate) fn address_from_row(row: &Row<'_>, alias_prefix: &str) -> RepoResult<Option<Address>> {
    let id: Option<EntityId> = row.get(format!("{alias_prefix}id").as_str())?;
    let Some(id) = id else {
        return Ok(None);
    };

    let region_text: String = row.get(format!("{alias_prefix}region").as_str())?;
    let region = parse_region(&region_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid region value `{region_text}` in addresses.region"
        ))
    })?;

    Ok(Some(Address {
        id: Some(id),
        street_address: row.get(format!("{alias_prefix}street_address").as_str())?,
        address2: row.get(format!("{alias_prefix}address2").as_str())?,
        city: row.get(format!("{alias_prefix}city").as_str())?,
        state: row.get(format!("{alias_prefix}state").as_str())?,
        postcode: row.get(format!("{alias_prefix}postcode").as_str())?,
        county: row.get(format!("{alias_prefix}county").as_str())?,
        region,
        country: row.get(format!("{alias_prefix}country").as_str())?,
    }))
}

pub(crate) fn opt_text(value: Option<&str>) -> Value {
    match value {
        Some(text) => Value::Text(text.to_string()),
        None => Value::Null,
    }
}

pub(crate) fn region_to_db(region: Region) -> &'static str {
    match region {
        Region::Northeast => "northeast",
        Region::Midwest => "midwest",
        Region::South => "south",
        Region::West => "west",
    }
}

pub(crate) fn parse_region(value: &str) -> Option<Region> {
    match value {
        "northeast" => Some(Region::Northeast),
        "midwest" => Some(Region::Midwest),
        "south" => Some(Region::South),
        "west" => Some(Region::West),
        _ => None,
    }
}
