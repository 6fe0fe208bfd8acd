use crate::error::PaginationError;
use crate::pipeline::QueryPipeline;
use sieveql::plan::{OrderByItem, QueryPlan};
use sieveql::{SortClause, SortDirection};
use tracing::debug;

impl QueryPipeline<'_> {
    /// Orders by each resolvable clause, or by the configured default column when none were requested
    /// or none resolved. Clauses without a direction take `direction`.
    pub fn apply_sort(&mut self, plan: QueryPlan, clauses: &[SortClause], direction: SortDirection) -> Result<QueryPlan, PaginationError> {
        let mut order_by = self.order_by(clauses, direction)?;
        if order_by.is_empty() {
            if !clauses.is_empty() {
                debug!("sort: no clause applied, falling back to '{}'", self.config.default_sort_column);
            }
            order_by = self.order_by(&[SortClause::new(self.config.default_sort_column.clone(), None)], direction)?;
        }
        Ok(plan.with_order_by(order_by))
    }

    fn order_by(&mut self, clauses: &[SortClause], direction: SortDirection) -> Result<Vec<OrderByItem>, PaginationError> {
        let mut order_by = Vec::with_capacity(clauses.len());
        for clause in clauses {
            let checkpoint = self.joins.checkpoint();
            match self.locate(&clause.field_path)? {
                Some((field, expr)) if field.data_type.is_supported() => {
                    let direction = clause.direction.unwrap_or(direction);
                    self.sorted.get_or_insert_with(|| (clause.field_path.clone(), direction));
                    order_by.push(OrderByItem { expr, direction });
                }
                Some(_) => {
                    debug!("sort '{}': unsupported data type", clause.field_path);
                    self.joins.rollback(checkpoint);
                }
                None => self.joins.rollback(checkpoint),
            }
        }
        Ok(order_by)
    }
}
