//! Staged planning of one paginated request.
//!
//! Stages run in a fixed order: explicit joins, filters, search, sort, projection. Each takes the
//! plan built so far and returns an augmented one; joins accumulate across stages and are attached
//! last so projection sees every join a clause triggered.
use crate::config::PaginationConfig;
use crate::error::{PaginationError, SchemaError};
use crate::grouping::assemble;
use crate::join::JoinResolver;
use crate::operator::OperatorRegistry;
use crate::schema::{resolve, Blacklist, FieldDescriptor, SchemaDescriptor, SchemaRegistry};
use serde::Serialize;
use sieveql::plan::{ColumnExpr, Predicate, QueryPlan};
use sieveql::{Clause, PaginationRequest, SortDirection};
use std::sync::Arc;
use tracing::debug;

/// A filter clause that produced a predicate, echoed back in the pagination result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedFilter {
    pub column: String,
    pub values: Vec<String>,
}

/// Count and fetch plans for one request, with the paging figures they were built from.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedQuery {
    pub count: QueryPlan,
    pub fetch: QueryPlan,
    pub page: u64,
    pub page_size: u64,
    pub offset: u64,
    pub sort_column: String,
    pub sort_order: SortDirection,
    pub filters: Vec<AppliedFilter>,
}

pub struct QueryPipeline<'a> {
    pub(crate) root: Arc<SchemaDescriptor>,
    pub(crate) blacklist: &'a Blacklist,
    registry: &'a SchemaRegistry,
    operators: &'a OperatorRegistry,
    pub(crate) config: &'a PaginationConfig,
    pub(crate) joins: JoinResolver<'a>,
    applied: Vec<AppliedFilter>,
    /// First sort key that made it into ORDER BY.
    pub(crate) sorted: Option<(String, SortDirection)>,
}

impl<'a> QueryPipeline<'a> {
    pub fn new(
        root: Arc<SchemaDescriptor>,
        blacklist: &'a Blacklist,
        registry: &'a SchemaRegistry,
        operators: &'a OperatorRegistry,
        config: &'a PaginationConfig,
    ) -> Self {
        let joins = JoinResolver::new(Arc::clone(&root), registry);
        Self { root, blacklist, registry, operators, config, joins, applied: Vec::new(), sorted: None }
    }

    pub fn plan(mut self, request: &PaginationRequest) -> Result<PlannedQuery, PaginationError> {
        let page = self.config.page(request.page);
        let page_size = self.config.page_size(request.page_size);
        let offset = page.saturating_sub(1).saturating_mul(page_size);
        let default_direction = request.sort_order.unwrap_or(self.config.default_sort_order);

        let plan = QueryPlan::new(self.root.table());
        let plan = self.apply_joins(plan, &request.joins)?;
        let plan = self.apply_filters(plan, &request.filter_clauses, &request.or_clauses)?;
        let plan = self.apply_search(plan, request.search.as_ref())?;
        let plan = self.apply_sort(plan, &request.sort_clauses, default_direction)?;
        let plan = self.apply_projection(plan, request.fields.as_deref())?;
        let plan = plan.with_joins(self.joins.into_joins());
        let (sort_column, sort_order) = self.sorted.unwrap_or_else(|| (self.config.default_sort_column.clone(), default_direction));

        Ok(PlannedQuery { count: plan.count_only(), fetch: plan.paged(page_size, offset), page, page_size, offset, sort_column, sort_order, filters: self.applied })
    }

    /// Relation chains requested through `join`, joined whether or not a clause references them.
    pub fn apply_joins(&mut self, plan: QueryPlan, paths: &[String]) -> Result<QueryPlan, PaginationError> {
        for path in paths {
            if path.split('.').any(str::is_empty) || !self.blacklist.permits_chain(path) {
                debug!("join '{}': not permitted", path);
                continue;
            }
            let checkpoint = self.joins.checkpoint();
            if self.joins.resolve_join(path)?.is_none() {
                self.joins.rollback(checkpoint);
            }
        }
        Ok(plan)
    }

    pub fn apply_filters(&mut self, plan: QueryPlan, filter: &[Clause], or: &[Clause]) -> Result<QueryPlan, PaginationError> {
        let policy = self.config.grouping;
        let predicate = assemble(filter, or, policy, |clause| self.build_clause(clause, true))?;
        Ok(plan.and_where(predicate))
    }

    /// Builds one clause's predicate. Joins it triggered are undone when it yields none.
    pub(crate) fn build_clause(&mut self, clause: &Clause, echo: bool) -> Result<Option<Predicate>, SchemaError> {
        let checkpoint = self.joins.checkpoint();
        let Some((field, expr)) = self.locate(&clause.field_path)? else {
            self.joins.rollback(checkpoint);
            return Ok(None);
        };
        if !field.data_type.is_supported() {
            debug!("clause on '{}': unsupported data type", clause.field_path);
            self.joins.rollback(checkpoint);
            return Ok(None);
        }
        let predicate = self.operators.build(clause, &expr, field.data_type);
        if predicate.is_none() {
            self.joins.rollback(checkpoint);
        } else if echo {
            self.applied.push(AppliedFilter { column: clause.field_path.clone(), values: clause.args.clone() });
        }
        Ok(predicate)
    }

    /// Resolves `path` and joins its relation chain.
    pub(crate) fn locate(&mut self, path: &str) -> Result<Option<(FieldDescriptor, ColumnExpr)>, SchemaError> {
        let Some(resolved) = resolve(path, &self.root, self.blacklist, self.registry)? else {
            return Ok(None);
        };
        let Some(alias) = self.joins.resolve_join(&resolved.join_path)? else {
            return Ok(None);
        };
        let expr = resolved.field.expr(&alias);
        Ok(Some((resolved.field, expr)))
    }
}
