use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[default]
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortDirection {
    /// Case-insensitive `asc` / `desc`.
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if s.trim().eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_sql()) }
}

/// One field/operator/arguments unit, before it is resolved against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// Dotted path in storage naming, e.g. `project.owner.name`.
    pub field_path: String,
    /// `None` when the client omitted the operator.
    pub operator: Option<String>,
    pub args: Vec<String>,
    /// OR-combine with the preceding raw value of the same group instead of AND.
    pub combine_with_or: bool,
    /// Extra column of a multi-column raw value, OR-combined with the earlier columns of that value.
    pub alternative: bool,
}

impl Clause {
    pub fn new(field_path: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { field_path: field_path.into(), operator: None, args: args.into_iter().map(Into::into).collect(), combine_with_or: false, alternative: false }
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn or(mut self) -> Self {
        self.combine_with_or = true;
        self
    }

    pub fn alternative(mut self) -> Self {
        self.alternative = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortClause {
    pub field_path: String,
    /// `None` defers to the request's `sortOrder`, then to the configured default.
    pub direction: Option<SortDirection>,
}

impl SortClause {
    pub fn new(field_path: impl Into<String>, direction: Option<SortDirection>) -> Self { Self { field_path: field_path.into(), direction } }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchClause {
    pub query: String,
    /// Empty means every searchable field of the root entity.
    pub fields: Vec<String>,
    pub operator: Option<String>,
}

impl SearchClause {
    pub fn new(query: impl Into<String>) -> Self { Self { query: query.into(), fields: Vec::new(), operator: None } }
}

/// Everything a client asked for in one paginated listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationRequest {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub filter_clauses: Vec<Clause>,
    pub or_clauses: Vec<Clause>,
    pub sort_clauses: Vec<SortClause>,
    pub sort_order: Option<SortDirection>,
    pub search: Option<SearchClause>,
    /// `None` selects every visible field.
    pub fields: Option<Vec<String>>,
    pub joins: Vec<String>,
}

impl PaginationRequest {
    pub fn new() -> Self { Self::default() }

    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn filter(mut self, clause: Clause) -> Self {
        self.filter_clauses.push(clause);
        self
    }

    pub fn or(mut self, clause: Clause) -> Self {
        self.or_clauses.push(clause.or());
        self
    }

    pub fn sort(mut self, field_path: impl Into<String>, direction: Option<SortDirection>) -> Self {
        self.sort_clauses.push(SortClause::new(field_path, direction));
        self
    }

    pub fn sort_order(mut self, direction: SortDirection) -> Self {
        self.sort_order = Some(direction);
        self
    }

    pub fn search(mut self, search: SearchClause) -> Self {
        self.search = Some(search);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn join(mut self, path: impl Into<String>) -> Self {
        self.joins.push(path.into());
        self
    }
}
