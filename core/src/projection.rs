use crate::error::PaginationError;
use crate::pipeline::QueryPipeline;
use sieveql::plan::{Projection, QueryPlan, SelectItem};
use tracing::debug;

impl QueryPipeline<'_> {
    /// Selects the requested fields, or every visible root field when `fields` is `None`.
    ///
    /// Requested fields are aliased by their path. Once any join is active the root's primary key and
    /// to-one foreign keys are selected too, so related rows can be hydrated.
    pub fn apply_projection(&mut self, plan: QueryPlan, fields: Option<&[String]>) -> Result<QueryPlan, PaginationError> {
        let mut items: Vec<SelectItem> = Vec::new();
        match fields {
            Some(requested) => {
                for path in requested {
                    let checkpoint = self.joins.checkpoint();
                    match self.locate(path)? {
                        Some((_, expr)) => push_unique(&mut items, SelectItem { expr, alias: path.clone() }),
                        None => {
                            debug!("projection: skipping '{}'", path);
                            self.joins.rollback(checkpoint);
                        }
                    }
                }
                if self.joins.is_active() {
                    let root = &self.root;
                    if root.primary_key().is_empty() {
                        return Err(PaginationError::MissingPrimaryKey { entity: root.table().to_owned() });
                    }
                    let keys = root.primary_key().iter().chain(root.to_one_relations().map(|r| &r.foreign_key));
                    for column in keys {
                        if let Some(field) = root.field(column) {
                            push_unique(&mut items, SelectItem { expr: field.expr(root.table()), alias: column.clone() });
                        }
                    }
                }
            }
            None => {
                for field in self.root.fields().filter(|f| !self.blacklist.excludes_field(&f.column)) {
                    items.push(SelectItem { expr: field.expr(self.root.table()), alias: field.column.clone() });
                }
            }
        }

        let projection = if items.is_empty() { Projection::Placeholder } else { Projection::Columns(items) };
        Ok(plan.with_projection(projection))
    }
}

fn push_unique(items: &mut Vec<SelectItem>, item: SelectItem) {
    if !items.iter().any(|existing| existing.alias == item.alias) {
        items.push(item);
    }
}
