//! Backend-neutral query plan.
//!
//! Pipeline stages take a [`QueryPlan`] and return an augmented one; storage executors render it.
use crate::request::SortDirection;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Double-quotes an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String { format!("\"{}\"", name.replace('"', "\"\"")) }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnExpr {
    /// `"table"."column"`, where `table` is the alias the column is hosted on.
    Column { table: String, column: String },
    /// Server-authored SQL with the table placeholder already substituted.
    Computed { sql: String },
}

impl ColumnExpr {
    pub fn column(table: impl Into<String>, column: impl Into<String>) -> Self { ColumnExpr::Column { table: table.into(), column: column.into() } }
    pub fn computed(sql: impl Into<String>) -> Self { ColumnExpr::Computed { sql: sql.into() } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Equal,              // =
    NotEqual,           // <>
    GreaterThan,        // >
    GreaterThanOrEqual, // >=
    LessThan,           // <
    LessThanOrEqual,    // <=
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubstringPosition {
    Anywhere,
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrayMatchMode {
    /// Every value is an element of the array.
    All,
    /// At least one value is an element of the array.
    Any,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    True,
    Compare { expr: ColumnExpr, operator: ComparisonOperator, value: Value, case_insensitive: bool },
    Substring { expr: ColumnExpr, needle: String, position: SubstringPosition, negated: bool, case_insensitive: bool },
    In { expr: ColumnExpr, values: Vec<Value>, negated: bool, case_insensitive: bool },
    Between { expr: ColumnExpr, low: Value, high: Value },
    IsNull { expr: ColumnExpr, negated: bool },
    ArrayMatch { expr: ColumnExpr, values: Vec<Value>, mode: ArrayMatchMode },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Conjunction that drops `True` terms, splices nested conjunctions and collapses a single term.
    pub fn and(predicates: Vec<Predicate>) -> Predicate {
        let mut terms = Vec::with_capacity(predicates.len());
        for predicate in predicates {
            match predicate {
                Predicate::True => {}
                Predicate::And(inner) => terms.extend(inner),
                other => terms.push(other),
            }
        }
        match terms.len() {
            0 => Predicate::True,
            1 => terms.remove(0),
            _ => Predicate::And(terms),
        }
    }

    /// Disjunction that collapses a single term. An empty disjunction imposes nothing and yields `True`.
    pub fn or(mut predicates: Vec<Predicate>) -> Predicate {
        if predicates.iter().any(Predicate::is_true) {
            return Predicate::True;
        }
        match predicates.len() {
            0 => Predicate::True,
            1 => predicates.remove(0),
            _ => Predicate::Or(predicates),
        }
    }

    pub fn is_true(&self) -> bool { matches!(self, Predicate::True) }
}

/// `LEFT JOIN table AS alias ON alias.target_column = host.host_column`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    /// Relation chain this join completes, e.g. `project.owner`.
    pub path: String,
    pub table: String,
    pub alias: String,
    pub host: String,
    pub host_column: String,
    pub target_column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectItem {
    pub expr: ColumnExpr,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    Columns(Vec<SelectItem>),
    /// A literal constant keeping the statement valid when nothing is selectable.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByItem {
    pub expr: ColumnExpr,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub table: String,
    pub projection: Projection,
    pub joins: Vec<Join>,
    pub predicate: Predicate,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl QueryPlan {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            projection: Projection::Placeholder,
            joins: Vec::new(),
            predicate: Predicate::True,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn with_joins(self, joins: Vec<Join>) -> Self { Self { joins, ..self } }

    /// ANDs `predicate` onto the existing one.
    pub fn and_where(self, predicate: Predicate) -> Self {
        let predicate = Predicate::and(vec![self.predicate.clone(), predicate]);
        Self { predicate, ..self }
    }

    pub fn with_projection(self, projection: Projection) -> Self { Self { projection, ..self } }

    pub fn with_order_by(self, order_by: Vec<OrderByItem>) -> Self { Self { order_by, ..self } }

    pub fn paged(self, limit: u64, offset: u64) -> Self { Self { limit: Some(limit), offset: Some(offset), ..self } }

    /// The same rows without projection, ordering or paging, for counting.
    pub fn count_only(&self) -> Self {
        Self {
            table: self.table.clone(),
            projection: Projection::Placeholder,
            joins: self.joins.clone(),
            predicate: self.predicate.clone(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn join(&self, path: &str) -> Option<&Join> { self.joins.iter().find(|j| j.path == path) }
}
