//! # Sieve
//!
//! Turns untrusted query-string parameters into a safe, schema-checked paginated query.
//!
//! ## Core Concepts
//!
//! - **Entity**: a Rust type that describes its table, fields, computed fields and relations once
//! - **Blacklist**: per-request exclusions of fields and relations, nestable along relation chains
//! - **Operator**: a `$`-prefixed symbol (`$eq`, `$contL`, `$between`, ...) mapped to a predicate builder
//! - **QueryPlan**: the backend-neutral statement a [`core::QueryExecutor`] renders and runs
//!
//! Anything the caller names that the schema does not know, or that a blacklist hides, is dropped rather
//! than reported. Only server-side misconfiguration surfaces as an error.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sieve::{Blacklist, CancellationToken, Entity, PaginationConfig, Paginator, SchemaBuilder, StorageKind};
//! use sieve::storage::sqlite::SqliteExecutor;
//!
//! struct Task;
//!
//! impl Entity for Task {
//!     const TABLE: &'static str = "tasks";
//!     fn describe(schema: &mut SchemaBuilder) {
//!         schema.primary_key(["id"]).field("id", StorageKind::Int(64)).field("name", StorageKind::Text);
//!     }
//! }
//!
//! let config = PaginationConfig::default();
//! let request = config.parse([("filter", "name|spec|$contL"), ("sort", "id:asc")]);
//! let paginator = Paginator::with_config(SqliteExecutor::open("tasks.db").await?, config);
//! let page = paginator.paginate::<Task>(&request, &Blacklist::default(), &CancellationToken::new()).await?;
//! println!("{} of {} rows", page.rows.len(), page.pagination.total_rows);
//! ```

pub use sieve_core as core;
pub use sieveql;

// Re-export commonly used types
pub use sieve_core::{
    error, operator,
    schema::{self, Blacklist, Entity, SchemaBuilder, SchemaRegistry},
    value::{DataType, ScalarType, StorageKind},
    CancellationToken, GroupingPolicy, OperatorRegistry, Page, PaginationConfig, PaginationError, PaginationResult, Paginator, QueryExecutor,
};
pub use sieveql::{PaginationRequest, SortDirection};

pub mod storage {
    #[cfg(feature = "sqlite")]
    pub use ::sieve_storage_sqlite as sqlite;
}
