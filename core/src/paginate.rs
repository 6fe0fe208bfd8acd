//! The pagination coordinator and the executor seam storage backends implement.
use crate::config::PaginationConfig;
use crate::error::PaginationError;
use crate::operator::OperatorRegistry;
use crate::pipeline::{AppliedFilter, PlannedQuery, QueryPipeline};
use crate::schema::{Blacklist, Entity, SchemaRegistry};
use async_trait::async_trait;
use serde::Serialize;
use sieveql::plan::QueryPlan;
use sieveql::{PaginationRequest, SortDirection};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs query plans against a store.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    type Row: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Number of rows matching `plan`'s joins and predicate.
    async fn count(&self, plan: &QueryPlan) -> Result<u64, Self::Error>;

    async fn fetch(&self, plan: &QueryPlan) -> Result<Vec<Self::Row>, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult {
    pub page: u64,
    pub page_size: u64,
    pub sort_column: String,
    pub sort_order: SortDirection,
    pub filters: Vec<AppliedFilter>,
    pub total_rows: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<R> {
    pub rows: Vec<R>,
    pub pagination: PaginationResult,
}

/// `ceil(total_rows / page_size)`, zero for an empty result.
pub fn total_pages(total_rows: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_rows.div_ceil(page_size)
}

pub struct Paginator<X: QueryExecutor> {
    executor: X,
    registry: Arc<SchemaRegistry>,
    operators: OperatorRegistry,
    config: PaginationConfig,
}

impl<X: QueryExecutor> Paginator<X> {
    pub fn new(executor: X) -> Self { Self::with_config(executor, PaginationConfig::default()) }

    pub fn with_config(executor: X, config: PaginationConfig) -> Self {
        let operators = OperatorRegistry::new(config.default_operator.clone());
        Self { executor, registry: SchemaRegistry::global(), operators, config }
    }

    /// Uses `registry` instead of the process-wide one.
    pub fn with_registry(mut self, registry: Arc<SchemaRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn executor(&self) -> &X { &self.executor }

    pub fn config(&self) -> &PaginationConfig { &self.config }

    pub fn registry(&self) -> &Arc<SchemaRegistry> { &self.registry }

    /// For registering custom operators.
    pub fn operators_mut(&mut self) -> &mut OperatorRegistry { &mut self.operators }

    /// Plans without executing.
    pub fn plan<T: Entity>(&self, request: &PaginationRequest, blacklist: &Blacklist) -> Result<PlannedQuery, PaginationError> {
        let root = self.registry.schema::<T>()?;
        QueryPipeline::new(root, blacklist, &self.registry, &self.operators, &self.config).plan(request)
    }

    /// Counts, then fetches the requested page. Both round-trips stop on `cancel` or the configured timeout.
    pub async fn paginate<T: Entity>(
        &self,
        request: &PaginationRequest,
        blacklist: &Blacklist,
        cancel: &CancellationToken,
    ) -> Result<Page<X::Row>, PaginationError> {
        let planned = self.plan::<T>(request, blacklist)?;

        let total_rows = self.round_trip(self.executor.count(&planned.count), cancel).await?;
        let rows = if planned.offset >= total_rows {
            debug!("paginate {}: offset {} is past {} rows, skipping fetch", planned.count.table, planned.offset, total_rows);
            Vec::new()
        } else {
            self.round_trip(self.executor.fetch(&planned.fetch), cancel).await?
        };

        let pagination = PaginationResult {
            page: planned.page,
            page_size: planned.page_size,
            sort_column: planned.sort_column,
            sort_order: planned.sort_order,
            filters: planned.filters,
            total_rows,
            total_pages: total_pages(total_rows, planned.page_size),
        };
        Ok(Page { rows, pagination })
    }

    async fn round_trip<T, F>(&self, query: F, cancel: &CancellationToken) -> Result<T, PaginationError>
    where F: Future<Output = Result<T, X::Error>> {
        let bounded = async {
            let result = match self.config.query_timeout() {
                Some(limit) => match tokio::time::timeout(limit, query).await {
                    Ok(result) => result,
                    Err(_) => return Err(PaginationError::Timeout),
                },
                None => query.await,
            };
            result.map_err(|e| PaginationError::Storage(Box::new(e)))
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PaginationError::Cancelled),
            result = bounded => result,
        }
    }
}
