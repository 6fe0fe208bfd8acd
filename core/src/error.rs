use thiserror::Error;

/// A defect in a registered entity schema. Never caused by client input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("invalid identifier '{name}' in entity {entity}")]
    InvalidIdentifier { entity: String, name: String },
    #[error("duplicate field '{field}' in entity {entity}")]
    DuplicateField { entity: String, field: String },
    #[error("duplicate relation '{relation}' in entity {entity}")]
    DuplicateRelation { entity: String, relation: String },
    #[error("primary key column '{column}' is not a declared field of {entity}")]
    UnknownKeyColumn { entity: String, column: String },
    #[error("relation '{relation}' of {entity} uses undeclared key column '{column}'")]
    UnknownRelationKey { entity: String, relation: String, column: String },
    #[error("computed field '{field}' of {entity}: {reason}")]
    InvalidComputed { entity: String, field: String, reason: &'static str },
    #[error("entity {entity} has no primary key")]
    MissingPrimaryKey { entity: String },
}

#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("entity {entity} has no primary key to project alongside joined relations")]
    MissingPrimaryKey { entity: String },
    #[error("Storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("query cancelled")]
    Cancelled,
    #[error("query timed out")]
    Timeout,
}

impl PaginationError {
    /// Server-side model defects, as opposed to runtime failures.
    pub fn is_configuration(&self) -> bool { matches!(self, PaginationError::Schema(_) | PaginationError::MissingPrimaryKey { .. }) }
}
