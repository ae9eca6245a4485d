//! Store error model: domain failures plus annotated database failures.

use thiserror::Error;

use crewpay_core::DomainError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error surfaced by the persistence layer.
///
/// Database errors carry enough context (operation, invoice number, cycle id)
/// to diagnose without re-running the query.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{context}: {source}")]
    Database {
        context: String,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    /// Build a `map_err` adapter that annotates a database error with the
    /// operation it happened in.
    pub fn db(context: impl Into<String>) -> impl FnOnce(sqlx::Error) -> StoreError {
        let context = context.into();
        move |source| StoreError::Database { context, source }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        DomainError::not_found(msg).into()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::validation(msg).into()
    }
}

/// Translate a constraint violation on a delete into a validation error
/// naming the likely cause, instead of leaking the raw database error.
pub fn translate_delete_constraint(context: &str, source: sqlx::Error) -> StoreError {
    let is_constraint = source
        .as_database_error()
        .is_some_and(|db| {
            matches!(
                db.kind(),
                sqlx::error::ErrorKind::ForeignKeyViolation
                    | sqlx::error::ErrorKind::CheckViolation
            )
        });
    if is_constraint {
        StoreError::validation(format!(
            "cannot delete {context}: another record still references it"
        ))
    } else {
        StoreError::Database {
            context: format!("deleting {context}"),
            source,
        }
    }
}
