use crate::error::PaginationError;
use crate::pipeline::QueryPipeline;
use sieveql::plan::{Predicate, QueryPlan};
use sieveql::{Clause, SearchClause};
use tracing::debug;

impl QueryPipeline<'_> {
    /// ANDs one OR group matching the query against each search field.
    pub fn apply_search(&mut self, plan: QueryPlan, search: Option<&SearchClause>) -> Result<QueryPlan, PaginationError> {
        let Some(search) = search.filter(|s| !s.query.is_empty()) else {
            return Ok(plan);
        };
        let operator = search.operator.clone().unwrap_or_else(|| self.config.search_operator.clone());
        let fields = if search.fields.is_empty() { self.searchable_fields() } else { search.fields.clone() };

        let mut terms = Vec::new();
        for field_path in fields {
            let clause = Clause::new(field_path, [search.query.as_str()]).with_operator(operator.as_str());
            terms.extend(self.build_clause(&clause, false)?);
        }
        if terms.is_empty() {
            debug!("search '{}': no searchable field accepted '{}'", search.query, operator);
        }
        Ok(plan.and_where(Predicate::or(terms)))
    }

    fn searchable_fields(&self) -> Vec<String> {
        self.root.fields().filter(|f| f.data_type.is_supported() && !self.blacklist.excludes_field(&f.column)).map(|f| f.column.clone()).collect()
    }
}
