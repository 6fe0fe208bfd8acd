use crate::grouping::GroupingPolicy;
use crate::operator;
use serde::{Deserialize, Serialize};
use sieveql::{PaginationRequest, ParamParser, SortDirection};
use std::time::Duration;

/// Engine defaults, loadable from the host's configuration with camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationConfig {
    pub default_page: u64,
    pub default_page_size: u64,
    /// Requested page sizes above this are clamped.
    pub max_page_size: u64,
    pub default_sort_column: String,
    pub default_sort_order: SortDirection,
    /// Stands in for omitted or unknown operators on text-like fields.
    pub default_operator: String,
    pub search_operator: String,
    pub combined_filter_operator: String,
    pub grouping: GroupingPolicy,
    /// Limit on each storage round-trip.
    pub query_timeout_ms: Option<u64>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 1000,
            default_sort_column: "created_at".to_owned(),
            default_sort_order: SortDirection::Desc,
            default_operator: operator::CONTAINS.to_owned(),
            search_operator: operator::CONTAINS.to_owned(),
            combined_filter_operator: operator::CONTAINS.to_owned(),
            grouping: GroupingPolicy::FlattenMixed,
            query_timeout_ms: None,
        }
    }
}

impl PaginationConfig {
    pub fn new() -> Self { Self::default() }

    pub fn with_default_page_size(mut self, page_size: u64) -> Self {
        self.default_page_size = page_size;
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: u64) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    pub fn with_default_sort(mut self, column: impl Into<String>, order: SortDirection) -> Self {
        self.default_sort_column = column.into();
        self.default_sort_order = order;
        self
    }

    pub fn with_default_operator(mut self, symbol: impl Into<String>) -> Self {
        self.default_operator = symbol.into();
        self
    }

    pub fn with_search_operator(mut self, symbol: impl Into<String>) -> Self {
        self.search_operator = symbol.into();
        self
    }

    pub fn with_combined_filter_operator(mut self, symbol: impl Into<String>) -> Self {
        self.combined_filter_operator = symbol.into();
        self
    }

    pub fn with_grouping(mut self, grouping: GroupingPolicy) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn query_timeout(&self) -> Option<Duration> { self.query_timeout_ms.map(Duration::from_millis) }

    /// Requested page, or the default for a missing or zero page.
    pub fn page(&self, requested: Option<u64>) -> u64 { requested.filter(|p| *p > 0).unwrap_or(self.default_page).max(1) }

    /// Requested page size, or the default, clamped to `1..=max_page_size`.
    pub fn page_size(&self, requested: Option<u64>) -> u64 {
        requested.filter(|s| *s > 0).unwrap_or(self.default_page_size).clamp(1, self.max_page_size.max(1))
    }

    /// Query-string parser honouring `combined_filter_operator`.
    pub fn parser(&self) -> ParamParser { ParamParser::new().with_combined_filter_operator(self.combined_filter_operator.clone()) }

    pub fn parse<I, K, V>(&self, params: I) -> PaginationRequest
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.parser().parse(params)
    }
}
