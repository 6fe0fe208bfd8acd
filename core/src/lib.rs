//! Schema-aware filtering, sorting, searching and pagination over relational storage.
//!
//! Register entities through [`schema::Entity`], parse query parameters with
//! [`PaginationConfig::parse`] and hand the request to a [`Paginator`] wrapping a storage
//! [`QueryExecutor`].
pub mod config;
pub mod error;
pub mod grouping;
pub mod join;
pub mod operator;
pub mod paginate;
pub mod pipeline;
mod projection;
pub mod schema;
mod search;
mod sort;
pub mod value;

pub use config::PaginationConfig;
pub use error::{PaginationError, SchemaError};
pub use grouping::GroupingPolicy;
pub use operator::OperatorRegistry;
pub use paginate::{total_pages, Page, PaginationResult, Paginator, QueryExecutor};
pub use pipeline::{AppliedFilter, PlannedQuery, QueryPipeline};
pub use schema::{Blacklist, Entity, SchemaBuilder, SchemaRegistry};
pub use value::{CoercionError, DataType, ScalarType, StorageKind};

pub use sieveql;
pub use tokio_util::sync::CancellationToken;
