//! Query-string parameters to [`PaginationRequest`].
//!
//! Parsing is permissive: malformed values are logged at debug level and skipped, never rejected.
use crate::request::{Clause, PaginationRequest, SearchClause, SortClause, SortDirection};
use convert_case::{Case, Casing};
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_COMBINED_FILTER_OPERATOR: &str = "$cont";

#[derive(Debug, Clone)]
pub struct ParamParser {
    combined_filter_operator: String,
}

impl Default for ParamParser {
    fn default() -> Self { Self { combined_filter_operator: DEFAULT_COMBINED_FILTER_OPERATOR.to_owned() } }
}

impl ParamParser {
    pub fn new() -> Self { Self::default() }

    /// Operator applied to the legacy `combinedFilter` key.
    pub fn with_combined_filter_operator(mut self, operator: impl Into<String>) -> Self {
        self.combined_filter_operator = operator.into();
        self
    }

    pub fn parse<I, K, V>(&self, params: I) -> PaginationRequest
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = PaginationRequest::default();
        let mut page = None;
        let mut page_number = None;
        let mut per_page = None;
        let mut page_size = None;
        let mut search_query: Option<String> = None;
        let mut search_fields = Vec::new();
        let mut search_operator = None;

        for (key, value) in params {
            let value = value.as_ref();
            match key.as_ref() {
                "filter" | "filter[]" => request.filter_clauses.extend(parse_filter(value, false)),
                "or" | "or[]" => request.or_clauses.extend(parse_filter(value, true)),
                "combinedFilter" => request.filter_clauses.extend(self.parse_combined_filter(value)),
                "sort" | "sortColumn" => request.sort_clauses.extend(parse_sort(value)),
                "sortOrder" => match SortDirection::parse(value) {
                    Some(direction) => request.sort_order = Some(direction),
                    None => debug!("ignoring sortOrder '{}'", value),
                },
                "page" => page = parse_count("page", value),
                "pageNumber" => page_number = parse_count("pageNumber", value),
                "perPage" => per_page = parse_count("perPage", value),
                "pageSize" => page_size = parse_count("pageSize", value),
                "fields" => request.fields.get_or_insert_with(Vec::new).extend(split_columns(value)),
                "search" if !value.is_empty() => search_query = Some(value.to_owned()),
                "search" => {}
                "searchFields" => search_fields.extend(split_columns(value)),
                "searchOperator" if !value.trim().is_empty() => search_operator = Some(value.trim().to_owned()),
                "join" => request.joins.extend(split_columns(value)),
                other => debug!("ignoring unknown parameter '{}'", other),
            }
        }

        request.page = page.or(page_number);
        request.page_size = per_page.or(page_size);
        request.search = search_query.map(|query| SearchClause { query, fields: search_fields, operator: search_operator });
        request
    }

    pub fn parse_map(&self, params: &HashMap<String, Vec<String>>) -> PaginationRequest {
        self.parse(params.iter().flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value.as_str()))))
    }

    /// `col1,col2:value`, value taken whole.
    fn parse_combined_filter(&self, raw: &str) -> Vec<Clause> {
        match raw.split_once(':') {
            Some((_, "")) | None => {
                debug!("dropping malformed combinedFilter '{}'", raw);
                Vec::new()
            }
            Some((columns, value)) => expand(columns, Some(self.combined_filter_operator.clone()), vec![value.to_owned()], false),
        }
    }
}

/// Parses with the default [`ParamParser`].
pub fn parse_params<I, K, V>(params: I) -> PaginationRequest
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    ParamParser::default().parse(params)
}

/// Parses one `col[,col2]|v1[,v2][|$op]` value. Every column after the first is an alternative to the ones before it.
pub fn parse_filter(raw: &str, combine_with_or: bool) -> Vec<Clause> {
    let parts: Vec<&str> = raw.split('|').collect();
    let (columns, values, operator) = match parts.as_slice() {
        [] | [_] => {
            debug!("dropping malformed filter '{}'", raw);
            return Vec::new();
        }
        [columns, values] => (*columns, (*values).to_owned(), None),
        [columns, middle @ .., operator] => (*columns, middle.join("|"), Some(operator.trim()).filter(|o| !o.is_empty()).map(str::to_owned)),
    };
    expand(columns, operator, split_values(&values), combine_with_or)
}

fn expand(columns: &str, operator: Option<String>, args: Vec<String>, combine_with_or: bool) -> Vec<Clause> {
    split_columns(columns)
        .into_iter()
        .enumerate()
        .map(|(i, field_path)| Clause { field_path, operator: operator.clone(), args: args.clone(), combine_with_or, alternative: i > 0 })
        .collect()
}

fn split_values(raw: &str) -> Vec<String> {
    let inner = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')).unwrap_or(raw);
    if inner.is_empty() {
        return Vec::new();
    }
    inner.split(',').map(str::to_owned).collect()
}

fn parse_sort(raw: &str) -> Vec<SortClause> {
    raw.split(',')
        .filter_map(|entry| {
            let (column, direction) = match entry.split_once(':') {
                Some((column, direction)) => {
                    let parsed = SortDirection::parse(direction);
                    if parsed.is_none() {
                        debug!("ignoring sort direction '{}' for '{}'", direction, column);
                    }
                    (column, parsed)
                }
                None => (entry, None),
            };
            let column = column.trim();
            (!column.is_empty()).then(|| SortClause::new(storage_name(column), direction))
        })
        .collect()
}

fn parse_count(key: &str, raw: &str) -> Option<u64> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            debug!("ignoring {} '{}'", key, raw);
            None
        }
    }
}

/// Comma-separated column list, trimmed and converted to storage naming.
pub fn split_columns(raw: &str) -> Vec<String> { raw.split(',').map(str::trim).filter(|c| !c.is_empty()).map(storage_name).collect() }

/// Converts each dotted segment to snake_case: `project.ownerId` becomes `project.owner_id`.
pub fn storage_name(path: &str) -> String {
    path.split('.')
        .map(|segment| {
            let segment = segment.trim();
            if segment.chars().any(char::is_uppercase) {
                segment.to_case(Case::Snake)
            } else {
                segment.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}
