//! Generic CRUD engine over a caller-owned SQLite connection.
//!
//! # Responsibility
//! - Implement the seven CRUD operations once, parameterized over an
//!   entity type and its row mapping.
//! - Keep identity assignment on a single sanctioned path.
//!
//! # Invariants
//! - The engine is stateless between calls; the connection is owned by the
//!   caller for its whole lifetime and used one operation at a time.
//! - Dependent entities are persisted before their parent row is written.
//! - `delete_many` is the only operation that builds SQL by textual
//!   substitution; the substituted values are validated integers.

use crate::db::DbError;
use crate::model::ValidationError;
use crate::repo::sql::{CrudOperation, SqlSet};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned row identity: positive, opaque, never reused.
pub type EntityId = i64;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors raised by the engine and by concrete repositories.
#[derive(Debug)]
pub enum RepoError {
    /// Misconfigured repository: SQL missing or declared twice, or a
    /// malformed delete-many template. A programming error, never retried.
    Config(String),
    /// Operation requires a persisted identity but the entity has none.
    MissingIdentity {
        entity: &'static str,
        operation: &'static str,
    },
    /// Model invariant violated before any SQL was executed.
    Validation(ValidationError),
    /// A result row could not be converted into a domain entity.
    InvalidData(String),
    /// A primary-key lookup matched more than one row.
    AmbiguousId { id: EntityId, matches: usize },
    /// Update or delete matched no row for the given identity.
    NotFound(EntityId),
    /// Underlying SQLite/bootstrap error, propagated as-is.
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(message) => write!(f, "repository misconfigured: {message}"),
            Self::MissingIdentity { entity, operation } => {
                write!(f, "{operation} requires a saved {entity} with an identity")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::AmbiguousId { id, matches } => {
                write!(f, "identity {id} matched {matches} rows, expected at most one")
            }
            Self::NotFound(id) => write!(f, "no row found for identity {id}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Capability trait for entities with one store-assigned identity slot.
///
/// Implementing this trait is the only way an entity type can flow through
/// the engine, which makes the one-identity-per-type rule a compile-time
/// property. `assign_identity` exists for the engine's key stamping and
/// must not be called by application code.
pub trait Identified {
    fn identity(&self) -> Option<EntityId>;
    fn assign_identity(&mut self, id: EntityId);
}

/// Per-repository mapping between an entity and its SQL statements/rows.
///
/// Parameter vectors are positional and must match the declared SQL's `?`
/// placeholders in order.
pub trait RowMapping {
    type Entity: Identified;

    /// Label used in error messages.
    fn entity_name(&self) -> &'static str;

    /// Persists dependencies that must exist before the entity's own row,
    /// stamping their fresh identities into the entity so `save_params`
    /// can bind them as foreign keys. Runs inline, children before parent.
    fn save_dependencies(&self, _entity: &mut Self::Entity) -> RepoResult<()> {
        Ok(())
    }

    /// Positional parameters for the save statement. An absent association
    /// binds `Value::Null` at its foreign-key position.
    fn save_params(&self, entity: &Self::Entity) -> RepoResult<Vec<Value>>;

    /// Positional parameters for the update statement, mutable columns
    /// only. The engine appends the identity as the final parameter.
    fn update_params(&self, entity: &Self::Entity) -> RepoResult<Vec<Value>>;

    /// Rebuilds an entity, including joined associations, from one row.
    fn entity_from_row(&self, row: &Row<'_>) -> RepoResult<Self::Entity>;

    /// Code-fallback SQL for operations without a declared binding.
    fn default_sql(&self, _operation: CrudOperation) -> Option<&'static str> {
        None
    }
}

/// Literal token replaced by the comma-joined identity list in the
/// delete-many statement.
pub const DELETE_MANY_IDS_TOKEN: &str = ":ids";

/// The generic repository engine.
///
/// Concrete repositories wrap an instance of this with their own mapping
/// and declared SQL. One connection, one operation at a time; concurrent
/// use of the same connection must be serialized by the caller.
pub struct CrudRepository<'conn, M: RowMapping> {
    conn: &'conn Connection,
    mapping: M,
    sql: SqlSet,
}

impl<'conn, M: RowMapping> CrudRepository<'conn, M> {
    pub fn new(conn: &'conn Connection, mapping: M, sql: SqlSet) -> Self {
        Self { conn, mapping, sql }
    }

    fn sql_for(&self, operation: CrudOperation) -> RepoResult<&'static str> {
        self.sql
            .resolve(operation, |op| self.mapping.default_sql(op))
    }

    /// Persists an unsaved entity and stamps the generated identity onto
    /// it, cascading to unsaved dependencies first.
    ///
    /// When the insert reports no affected row the identity stays unset;
    /// callers can detect that through [`Identified::identity`].
    pub fn save(&self, entity: &mut M::Entity) -> RepoResult<()> {
        let sql = self.sql_for(CrudOperation::Save)?;
        self.mapping.save_dependencies(entity)?;
        let params = self.mapping.save_params(entity)?;

        let mut stmt = self.conn.prepare(sql)?;
        let affected = stmt.execute(params_from_iter(params))?;
        if affected > 0 {
            entity.assign_identity(self.conn.last_insert_rowid());
        }

        Ok(())
    }

    /// Looks up one entity by identity.
    ///
    /// Returns `Ok(None)` when no row matches. More than one matching row
    /// is reported as [`RepoError::AmbiguousId`] instead of silently
    /// picking one.
    pub fn find_by_id(&self, id: EntityId) -> RepoResult<Option<M::Entity>> {
        let sql = self.sql_for(CrudOperation::FindById)?;
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([id])?;

        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let entity = self.mapping.entity_from_row(row)?;

        let mut matches = 1usize;
        while rows.next()?.is_some() {
            matches += 1;
        }
        if matches > 1 {
            return Err(RepoError::AmbiguousId { id, matches });
        }

        Ok(Some(entity))
    }

    /// Returns all entities in underlying row order. No implied sort.
    pub fn find_all(&self) -> RepoResult<Vec<M::Entity>> {
        let sql = self.sql_for(CrudOperation::FindAll)?;
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;

        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(self.mapping.entity_from_row(row)?);
        }

        Ok(entities)
    }

    /// Returns the scalar of the first count row, or 0 when none.
    pub fn count(&self) -> RepoResult<i64> {
        let sql = self.sql_for(CrudOperation::Count)?;
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;

        match rows.next()? {
            Some(row) => Ok(row.get(0)?),
            None => Ok(0),
        }
    }

    /// Deletes the row backing a saved entity. The in-memory entity stays
    /// valid but orphaned; its identity is not cleared.
    pub fn delete(&self, entity: &M::Entity) -> RepoResult<()> {
        let id = entity.identity().ok_or(RepoError::MissingIdentity {
            entity: self.mapping.entity_name(),
            operation: "delete",
        })?;

        let sql = self.sql_for(CrudOperation::DeleteOne)?;
        let affected = self.conn.execute(sql, [id])?;
        if affected == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    /// Deletes the rows backing all given entities in one statement.
    ///
    /// The declared SQL must contain the literal `:ids` token, which is
    /// replaced by the comma-joined identity list. This textual
    /// substitution is deliberately confined to this operation; the
    /// substituted values are `i64` identities, nothing user-authored.
    pub fn delete_many(&self, entities: &[M::Entity]) -> RepoResult<()> {
        let sql = self.sql_for(CrudOperation::DeleteMany)?;
        if !sql.contains(DELETE_MANY_IDS_TOKEN) {
            return Err(RepoError::Config(format!(
                "delete_many SQL is missing the `{DELETE_MANY_IDS_TOKEN}` token"
            )));
        }

        let mut ids = Vec::with_capacity(entities.len());
        for entity in entities {
            ids.push(entity.identity().ok_or(RepoError::MissingIdentity {
                entity: self.mapping.entity_name(),
                operation: "delete_many",
            })?);
        }
        if ids.is_empty() {
            return Ok(());
        }

        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.conn
            .execute(&sql.replace(DELETE_MANY_IDS_TOKEN, &joined), [])?;

        Ok(())
    }

    /// Rewrites the mutable columns of a saved entity.
    pub fn update(&self, entity: &M::Entity) -> RepoResult<()> {
        let id = entity.identity().ok_or(RepoError::MissingIdentity {
            entity: self.mapping.entity_name(),
            operation: "update",
        })?;

        let sql = self.sql_for(CrudOperation::Update)?;
        let mut params = self.mapping.update_params(entity)?;
        params.push(Value::Integer(id));

        let mut stmt = self.conn.prepare(sql)?;
        let affected = stmt.execute(params_from_iter(params))?;
        if affected == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}
