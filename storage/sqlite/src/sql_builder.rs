//! SQL builder for SQLite queries
//!
//! Renders a [`QueryPlan`] into one SQLite statement. Values are always bound as `?` parameters.

use sieveql::plan::{
    quote_ident, ArrayMatchMode, ColumnExpr, ComparisonOperator, Join, OrderByItem, Predicate, Projection, QueryPlan, SubstringPosition,
};
use sieveql::Value;
use thiserror::Error;

use crate::error::SqliteError;
use crate::value::SqliteValue;

#[derive(Debug, Error, Clone)]
pub enum SqlGenerationError {
    #[error("Empty identifier in {0}")]
    EmptyIdentifier(&'static str),
}

impl From<SqlGenerationError> for SqliteError {
    fn from(err: SqlGenerationError) -> Self { SqliteError::SqlGeneration(err.to_string()) }
}

#[derive(Clone, Copy, PartialEq)]
enum Parent {
    Top,
    And,
    Or,
}

#[derive(Default)]
pub struct SqlBuilder {
    sql: String,
    params: Vec<rusqlite::types::Value>,
}

impl SqlBuilder {
    pub fn new() -> Self { Self::default() }

    /// `SELECT <projection> FROM <table> <joins> WHERE <predicate> [ORDER BY ..] [LIMIT .. OFFSET ..]`
    pub fn select(plan: &QueryPlan) -> Result<Self, SqlGenerationError> {
        let mut builder = Self::new();
        builder.push_sql("SELECT ");
        builder.projection(&plan.projection)?;
        builder.from_clause(plan)?;
        builder.order_by(&plan.order_by)?;
        builder.limit_offset(plan.limit, plan.offset);
        Ok(builder)
    }

    /// `SELECT COUNT(*)` over the plan's joins and predicate. Projection, ordering and paging are ignored.
    pub fn count(plan: &QueryPlan) -> Result<Self, SqlGenerationError> {
        let mut builder = Self::new();
        builder.push_sql("SELECT COUNT(*)");
        builder.from_clause(plan)?;
        Ok(builder)
    }

    pub fn build(self) -> (String, Vec<rusqlite::types::Value>) { (self.sql, self.params) }

    fn push_sql(&mut self, s: &str) { self.sql.push_str(s); }

    fn push_param(&mut self, value: &Value) -> &'static str {
        self.params.push(SqliteValue::from(value).to_sql());
        "?"
    }

    fn from_clause(&mut self, plan: &QueryPlan) -> Result<(), SqlGenerationError> {
        self.push_sql(" FROM ");
        self.push_sql(&ident(&plan.table, "table")?);
        for join in &plan.joins {
            self.join(join)?;
        }
        self.push_sql(" WHERE ");
        self.predicate(&plan.predicate, Parent::Top)
    }

    fn join(&mut self, join: &Join) -> Result<(), SqlGenerationError> {
        let alias = ident(&join.alias, "join alias")?;
        self.push_sql(&format!(
            " LEFT JOIN {} AS {} ON {}.{} = {}.{}",
            ident(&join.table, "join table")?,
            alias,
            alias,
            ident(&join.target_column, "join column")?,
            ident(&join.host, "join host")?,
            ident(&join.host_column, "join column")?,
        ));
        Ok(())
    }

    fn projection(&mut self, projection: &Projection) -> Result<(), SqlGenerationError> {
        match projection {
            Projection::Placeholder => self.push_sql("1"),
            Projection::Columns(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.push_sql(", ");
                    }
                    let expr = column(&item.expr)?;
                    self.push_sql(&format!("{} AS {}", expr, ident(&item.alias, "column alias")?));
                }
            }
        }
        Ok(())
    }

    fn order_by(&mut self, items: &[OrderByItem]) -> Result<(), SqlGenerationError> {
        for (i, item) in items.iter().enumerate() {
            self.push_sql(if i == 0 { " ORDER BY " } else { ", " });
            let expr = column(&item.expr)?;
            self.push_sql(&format!("{} {}", expr, item.direction.as_sql()));
        }
        Ok(())
    }

    fn limit_offset(&mut self, limit: Option<u64>, offset: Option<u64>) {
        match (limit, offset) {
            (Some(limit), Some(offset)) => self.push_sql(&format!(" LIMIT {} OFFSET {}", limit, offset)),
            (Some(limit), None) => self.push_sql(&format!(" LIMIT {}", limit)),
            (None, Some(offset)) => self.push_sql(&format!(" LIMIT -1 OFFSET {}", offset)),
            (None, None) => {}
        }
    }

    fn predicate(&mut self, predicate: &Predicate, parent: Parent) -> Result<(), SqlGenerationError> {
        match predicate {
            Predicate::True => self.push_sql("1=1"),
            Predicate::Compare { expr, operator, value, case_insensitive } => {
                let lhs = operand(expr, *case_insensitive)?;
                let param = self.push_param(value);
                let rhs = if *case_insensitive { format!("LOWER({})", param) } else { param.to_string() };
                self.push_sql(&format!("{} {} {}", lhs, comparison_op_to_sql(operator), rhs));
            }
            Predicate::Substring { expr, needle, position, negated, case_insensitive } => {
                let lhs = operand(expr, *case_insensitive)?;
                let needle_sql = if *case_insensitive { "LOWER(?)" } else { "?" };
                let needle = Value::Text(needle.clone());
                match position {
                    SubstringPosition::Anywhere => {
                        self.push_param(&needle);
                        self.push_sql(&format!("instr({}, {}) {}", lhs, needle_sql, if *negated { "= 0" } else { "> 0" }));
                    }
                    SubstringPosition::Start => {
                        self.push_param(&needle);
                        self.push_sql(&format!("instr({}, {}) {}", lhs, needle_sql, if *negated { "<> 1" } else { "= 1" }));
                    }
                    SubstringPosition::End => {
                        self.push_param(&needle);
                        self.push_param(&needle);
                        self.push_sql(&format!(
                            "substr({}, length({}) - length({}) + 1) {} {}",
                            lhs,
                            lhs,
                            needle_sql,
                            if *negated { "<>" } else { "=" },
                            needle_sql
                        ));
                    }
                }
            }
            Predicate::In { expr, values, negated, case_insensitive } => {
                if values.is_empty() {
                    self.push_sql(if *negated { "1=1" } else { "1=0" });
                    return Ok(());
                }
                let lhs = operand(expr, *case_insensitive)?;
                let placeholders = values
                    .iter()
                    .map(|value| {
                        let param = self.push_param(value);
                        if *case_insensitive {
                            format!("LOWER({})", param)
                        } else {
                            param.to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                self.push_sql(&format!("{} {} ({})", lhs, if *negated { "NOT IN" } else { "IN" }, placeholders));
            }
            Predicate::Between { expr, low, high } => {
                let lhs = column(expr)?;
                self.push_param(low);
                self.push_param(high);
                self.push_sql(&format!("{} BETWEEN ? AND ?", lhs));
            }
            Predicate::IsNull { expr, negated } => {
                let lhs = column(expr)?;
                self.push_sql(&format!("{} {}", lhs, if *negated { "IS NOT NULL" } else { "IS NULL" }));
            }
            Predicate::ArrayMatch { expr, values, mode } => {
                let joiner = match mode {
                    ArrayMatchMode::All => " AND ",
                    ArrayMatchMode::Any => " OR ",
                };
                if values.is_empty() {
                    self.push_sql(if *mode == ArrayMatchMode::All { "1=1" } else { "1=0" });
                    return Ok(());
                }
                let array = column(expr)?;
                let exists = values
                    .iter()
                    .map(|value| {
                        self.push_param(value);
                        format!("EXISTS (SELECT 1 FROM json_each({}) WHERE json_each.value = ?)", array)
                    })
                    .collect::<Vec<_>>()
                    .join(joiner);
                self.push_sql(&format!("({})", exists));
            }
            Predicate::And(terms) => {
                if terms.is_empty() {
                    self.push_sql("1=1");
                    return Ok(());
                }
                let wrap = parent == Parent::Or;
                if wrap {
                    self.push_sql("(");
                }
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        self.push_sql(" AND ");
                    }
                    self.predicate(term, Parent::And)?;
                }
                if wrap {
                    self.push_sql(")");
                }
            }
            Predicate::Or(terms) => {
                if terms.is_empty() {
                    self.push_sql("1=0");
                    return Ok(());
                }
                self.push_sql("(");
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        self.push_sql(" OR ");
                    }
                    self.predicate(term, Parent::Or)?;
                }
                self.push_sql(")");
            }
        }
        Ok(())
    }
}

fn ident(name: &str, what: &'static str) -> Result<String, SqlGenerationError> {
    if name.is_empty() {
        return Err(SqlGenerationError::EmptyIdentifier(what));
    }
    Ok(quote_ident(name))
}

fn column(expr: &ColumnExpr) -> Result<String, SqlGenerationError> {
    match expr {
        ColumnExpr::Column { table, column } => Ok(format!("{}.{}", ident(table, "table")?, ident(column, "column")?)),
        ColumnExpr::Computed { sql } if sql.trim().is_empty() => Err(SqlGenerationError::EmptyIdentifier("computed field")),
        ColumnExpr::Computed { sql } => Ok(format!("({})", sql)),
    }
}

fn operand(expr: &ColumnExpr, case_insensitive: bool) -> Result<String, SqlGenerationError> {
    let column = column(expr)?;
    Ok(if case_insensitive { format!("LOWER({})", column) } else { column })
}

fn comparison_op_to_sql(op: &ComparisonOperator) -> &'static str {
    match op {
        ComparisonOperator::Equal => "=",
        ComparisonOperator::NotEqual => "<>",
        ComparisonOperator::GreaterThan => ">",
        ComparisonOperator::GreaterThanOrEqual => ">=",
        ComparisonOperator::LessThan => "<",
        ComparisonOperator::LessThanOrEqual => "<=",
    }
}
