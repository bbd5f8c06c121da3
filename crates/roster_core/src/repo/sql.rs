//! SQL statement declaration and resolution.
//!
//! # Responsibility
//! - Key every CRUD behavior by a closed operation enum.
//! - Hold the per-repository (operation -> SQL) declarations and resolve
//!   the statement text for a requested operation.
//!
//! # Invariants
//! - At most one declaration per operation; a duplicate fails at
//!   construction, never at resolution time.
//! - Resolution order is fixed: declared binding, then code fallback,
//!   then a configuration error.

use crate::repo::crud::{RepoError, RepoResult};

/// Selects which CRUD behavior's SQL to resolve. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudOperation {
    Save,
    FindById,
    FindAll,
    Count,
    DeleteOne,
    DeleteMany,
    Update,
}

impl CrudOperation {
    /// Stable name used in configuration error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::FindById => "find_by_id",
            Self::FindAll => "find_all",
            Self::Count => "count",
            Self::DeleteOne => "delete_one",
            Self::DeleteMany => "delete_many",
            Self::Update => "update",
        }
    }
}

/// Declared SQL statements for one concrete repository.
///
/// Assembled in the repository constructor so misconfiguration surfaces
/// before the first operation runs.
#[derive(Debug, Clone, Default)]
pub struct SqlSet {
    bindings: Vec<(CrudOperation, &'static str)>,
}

impl SqlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the SQL text for one operation.
    ///
    /// # Errors
    /// - `RepoError::Config` when the operation already has a declaration.
    pub fn declare(mut self, operation: CrudOperation, sql: &'static str) -> RepoResult<Self> {
        if self.lookup(operation).is_some() {
            return Err(RepoError::Config(format!(
                "duplicate SQL declaration for operation `{}`",
                operation.name()
            )));
        }
        self.bindings.push((operation, sql));
        Ok(self)
    }

    /// Returns the declared SQL for an operation, if any.
    pub fn lookup(&self, operation: CrudOperation) -> Option<&'static str> {
        self.bindings
            .iter()
            .find(|(declared, _)| *declared == operation)
            .map(|(_, sql)| *sql)
    }

    /// Resolves the SQL for an operation: declared binding first, then the
    /// repository-supplied fallback.
    ///
    /// # Errors
    /// - `RepoError::Config` when neither path yields SQL.
    pub fn resolve(
        &self,
        operation: CrudOperation,
        fallback: impl FnOnce(CrudOperation) -> Option<&'static str>,
    ) -> RepoResult<&'static str> {
        self.lookup(operation)
            .or_else(|| fallback(operation))
            .ok_or_else(|| {
                RepoError::Config(format!(
                    "no SQL declared for operation `{}`",
                    operation.name()
                ))
            })
    }
}
