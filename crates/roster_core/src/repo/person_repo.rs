//! People repository: SQL text and row mapping for `people`.
//!
//! # Responsibility
//! - Declare the person statements for all seven CRUD operations.
//! - Cascade unsaved home/business addresses before the person row is
//!   written and bind their identities as foreign keys.
//!
//! # Invariants
//! - `Person::validate()` runs before the cascade touches the store.
//! - Association columns are read through the `home_` / `biz_` aliases;
//!   NULL in an aliased id column means the association is absent.

use crate::model::address::Address;
use crate::model::person::Person;
use crate::repo::address_repo::{address_from_row, opt_text, AddressRepository};
use crate::repo::crud::{CrudRepository, EntityId, RepoError, RepoResult, RowMapping};
use crate::repo::sql::{CrudOperation, SqlSet};
use chrono::DateTime;
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use rust_decimal::Decimal;

const SAVE_PERSON_SQL: &str = "INSERT INTO people
    (first_name, last_name, dob, salary, email, home_address, biz_address)
    VALUES (?, ?, ?, ?, ?, ?, ?)";
const FIND_PERSON_BY_ID_SQL: &str = "SELECT
    p.id, p.first_name, p.last_name, p.dob, p.salary, p.email,
    home.id AS home_id, home.street_address AS home_street_address,
    home.address2 AS home_address2, home.city AS home_city,
    home.state AS home_state, home.postcode AS home_postcode,
    home.county AS home_county, home.region AS home_region,
    home.country AS home_country,
    biz.id AS biz_id, biz.street_address AS biz_street_address,
    biz.address2 AS biz_address2, biz.city AS biz_city,
    biz.state AS biz_state, biz.postcode AS biz_postcode,
    biz.county AS biz_county, biz.region AS biz_region,
    biz.country AS biz_country
    FROM people AS p
    LEFT OUTER JOIN addresses AS home ON p.home_address = home.id
    LEFT OUTER JOIN addresses AS biz ON p.biz_address = biz.id
    WHERE p.id = ?";
const FIND_ALL_PEOPLE_SQL: &str = "SELECT
    p.id, p.first_name, p.last_name, p.dob, p.salary, p.email,
    home.id AS home_id, home.street_address AS home_street_address,
    home.address2 AS home_address2, home.city AS home_city,
    home.state AS home_state, home.postcode AS home_postcode,
    home.county AS home_county, home.region AS home_region,
    home.country AS home_country,
    biz.id AS biz_id, biz.street_address AS biz_street_address,
    biz.address2 AS biz_address2, biz.city AS biz_city,
    biz.state AS biz_state, biz.postcode AS biz_postcode,
    biz.county AS biz_county, biz.region AS biz_region,
    biz.country AS biz_country
    FROM people AS p
    LEFT OUTER JOIN addresses AS home ON p.home_address = home.id
    LEFT OUTER JOIN addresses AS biz ON p.biz_address = biz.id";
const COUNT_PEOPLE_SQL: &str = "SELECT COUNT(*) FROM people";
const DELETE_PERSON_SQL: &str = "DELETE FROM people WHERE id = ?";
const DELETE_PEOPLE_IN_SQL: &str = "DELETE FROM people WHERE id IN (:ids)";
const UPDATE_PERSON_SQL: &str = "UPDATE people
    SET first_name = ?, last_name = ?, dob = ?, salary = ?, email = ?
    WHERE id = ?";

/// Row mapping for [`Person`], cascading to the address repository on the
/// same connection.
pub struct PersonMapping<'conn> {
    addresses: AddressRepository<'conn>,
}

impl RowMapping for PersonMapping<'_> {
    type Entity = Person;

    fn entity_name(&self) -> &'static str {
        "person"
    }

    fn save_dependencies(&self, entity: &mut Person) -> RepoResult<()> {
        entity.validate()?;
        self.save_address_if_unsaved(entity.home_address.as_mut())?;
        self.save_address_if_unsaved(entity.business_address.as_mut())?;
        Ok(())
    }

    fn save_params(&self, entity: &Person) -> RepoResult<Vec<Value>> {
        Ok(vec![
            Value::Text(entity.first_name.clone()),
            Value::Text(entity.last_name.clone()),
            Value::Integer(entity.dob.timestamp_millis()),
            salary_param(entity.salary.as_ref()),
            opt_text(entity.email.as_deref()),
            address_fk(entity.home_address.as_ref())?,
            address_fk(entity.business_address.as_ref())?,
        ])
    }

    fn update_params(&self, entity: &Person) -> RepoResult<Vec<Value>> {
        entity.validate()?;

        Ok(vec![
            Value::Text(entity.first_name.clone()),
            Value::Text(entity.last_name.clone()),
            Value::Integer(entity.dob.timestamp_millis()),
            salary_param(entity.salary.as_ref()),
            opt_text(entity.email.as_deref()),
        ])
    }

    fn entity_from_row(&self, row: &Row<'_>) -> RepoResult<Person> {
        let dob_ms: i64 = row.get("dob")?;
        let dob = DateTime::from_timestamp_millis(dob_ms).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "out-of-range dob timestamp `{dob_ms}` in people.dob"
            ))
        })?;

        let salary = match row.get::<_, Option<String>>("salary")? {
            Some(text) => Some(text.parse::<Decimal>().map_err(|_| {
                RepoError::InvalidData(format!("invalid salary value `{text}` in people.salary"))
            })?),
            None => None,
        };

        Ok(Person {
            id: Some(row.get("id")?),
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            dob,
            salary,
            email: row.get("email")?,
            home_address: address_from_row(row, "home_")?,
            business_address: address_from_row(row, "biz_")?,
        })
    }
}

impl PersonMapping<'_> {
    fn save_address_if_unsaved(&self, address: Option<&mut Address>) -> RepoResult<()> {
        if let Some(address) = address {
            if address.id.is_none() {
                self.addresses.save(address)?;
            }
        }
        Ok(())
    }
}

/// SQLite-backed people repository.
pub struct PersonRepository<'conn> {
    repo: CrudRepository<'conn, PersonMapping<'conn>>,
}

impl<'conn> PersonRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> RepoResult<Self> {
        let sql = SqlSet::new()
            .declare(CrudOperation::Save, SAVE_PERSON_SQL)?
            .declare(CrudOperation::FindById, FIND_PERSON_BY_ID_SQL)?
            .declare(CrudOperation::FindAll, FIND_ALL_PEOPLE_SQL)?
            .declare(CrudOperation::Count, COUNT_PEOPLE_SQL)?
            .declare(CrudOperation::DeleteOne, DELETE_PERSON_SQL)?
            .declare(CrudOperation::DeleteMany, DELETE_PEOPLE_IN_SQL)?
            .declare(CrudOperation::Update, UPDATE_PERSON_SQL)?;
        let mapping = PersonMapping {
            addresses: AddressRepository::new(conn)?,
        };

        Ok(Self {
            repo: CrudRepository::new(conn, mapping, sql),
        })
    }

    /// Persists a person, saving any unsaved address association first and
    /// stamping generated identities onto the person and its addresses.
    pub fn save(&self, person: &mut Person) -> RepoResult<()> {
        self.repo.save(person)
    }

    /// Looks up one person, with both address associations materialized.
    pub fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Person>> {
        self.repo.find_by_id(id)
    }

    /// Returns every person in row order.
    pub fn find_all(&self) -> RepoResult<Vec<Person>> {
        self.repo.find_all()
    }

    /// Returns the number of persisted people.
    pub fn count(&self) -> RepoResult<i64> {
        self.repo.count()
    }

    /// Deletes one saved person's row. Associated address rows stay.
    pub fn delete(&self, person: &Person) -> RepoResult<()> {
        self.repo.delete(person)
    }

    /// Deletes all given saved people in one statement.
    pub fn delete_many(&self, people: &[Person]) -> RepoResult<()> {
        self.repo.delete_many(people)
    }

    /// Rewrites a saved person's mutable columns (names, dob, salary,
    /// email). Address links are not touched by update.
    pub fn update(&self, person: &Person) -> RepoResult<()> {
        self.repo.update(person)
    }
}

fn salary_param(salary: Option<&Decimal>) -> Value {
    match salary {
        Some(amount) => Value::Text(amount.to_string()),
        None => Value::Null,
    }
}

fn address_fk(address: Option<&Address>) -> RepoResult<Value> {
    match address {
        Some(address) => {
            let id = address.id.ok_or(RepoError::MissingIdentity {
                entity: "address",
                operation: "bind_foreign_key",
            })?;
            Ok(Value::Integer(id))
        }
        None => Ok(Value::Null),
    }
}
