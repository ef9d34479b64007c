//! Error types for the query engine and the store capability.

use thiserror::Error;

/// Errors raised while building or evaluating a [`Query`](crate::Query).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// The comparison operator is not one of `<`, `<=`, `=`, `!=`, `>=`, `>`.
    #[error("\"{0}\" is not a valid filter operator")]
    InvalidOperator(String),

    /// The order specification is empty or names no field.
    #[error("invalid order specification: {0}")]
    InvalidOrder(String),

    /// A resolved field value could not be coerced to the filter's value type.
    #[error("cannot coerce field '{field}' from {from} to {to}")]
    TypeCoercion {
        /// Field being filtered.
        field: String,
        /// Type of the resolved value.
        from: &'static str,
        /// Type of the reference value.
        to: &'static str,
    },

    /// Two extracted sort keys have no defined ordering.
    #[error("cannot compare field '{field}': {left} vs {right}")]
    Comparison {
        /// Field being ordered on.
        field: String,
        /// Type of the left-hand key.
        left: &'static str,
        /// Type of the right-hand key.
        right: &'static str,
    },

    /// A query mapping could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors from store operations.
///
/// Decorator stores never wrap or rewrite inner-store errors; whatever the
/// leaf returns reaches the caller unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested key does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store does not support this operation.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A composite store was constructed with an unusable layout.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// A backend operation failed.
    #[error("storage error: {0}")]
    Internal(String),

    /// Query evaluation failed.
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl StoreError {
    /// Returns `true` for [`StoreError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
