use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// Deny-list of fields and relations, nested per relation.
///
/// Paths that touch an excluded field or relation resolve to nothing, so clauses naming them are
/// dropped as if absent. A relation without a child blacklist is unrestricted below that point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Blacklist {
    excluded_fields: HashSet<String>,
    excluded_relations: HashSet<String>,
    children: HashMap<String, Blacklist>,
    /// No relation may be traversed from this level.
    is_final: bool,
}

impl Blacklist {
    pub fn new() -> Self { Self::default() }

    pub fn exclude_field(mut self, column: impl Into<String>) -> Self {
        self.excluded_fields.insert(column.into());
        self
    }

    pub fn exclude_fields<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_fields.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn exclude_relation(mut self, relation: impl Into<String>) -> Self {
        self.excluded_relations.insert(relation.into());
        self
    }

    /// Restrictions applying once `relation` has been traversed.
    pub fn with_child(mut self, relation: impl Into<String>, child: Blacklist) -> Self {
        self.children.insert(relation.into(), child);
        self
    }

    pub fn finalized(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn excludes_field(&self, column: &str) -> bool { self.excluded_fields.contains(column) }

    pub fn excludes_relation(&self, relation: &str) -> bool { self.excluded_relations.contains(relation) }

    pub fn child(&self, relation: &str) -> Option<&Blacklist> { self.children.get(relation) }

    pub fn is_final(&self) -> bool { self.is_final }

    /// Whether every relation of a dotted chain may be traversed.
    pub fn permits_chain(&self, chain: &str) -> bool {
        let mut level = Some(self);
        for segment in chain.split('.') {
            match level {
                Some(current) if current.is_final() || current.excludes_relation(segment) => return false,
                Some(current) => level = current.child(segment),
                None => break,
            }
        }
        true
    }
}
