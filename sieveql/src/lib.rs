//! Request-side vocabulary of the sieve engine.
//!
//! `request` holds what a client asked for, `parser` turns query-string pairs into a request,
//! and `plan` is the backend-neutral query a storage executor renders.
pub mod parser;
pub mod plan;
pub mod request;
pub mod value;

pub use parser::{parse_params, storage_name, ParamParser};
pub use request::{Clause, PaginationRequest, SearchClause, SortClause, SortDirection};
pub use value::Value;
