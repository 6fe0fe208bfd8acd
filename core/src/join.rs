use crate::error::SchemaError;
use crate::schema::{RelationKind, SchemaDescriptor, SchemaRegistry};
use sieveql::plan::Join;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-request join bookkeeping: each relation chain is joined at most once.
pub struct JoinResolver<'r> {
    root: Arc<SchemaDescriptor>,
    registry: &'r SchemaRegistry,
    joins: Vec<Join>,
    resolved: HashMap<String, (String, Arc<SchemaDescriptor>)>,
}

impl<'r> JoinResolver<'r> {
    pub fn new(root: Arc<SchemaDescriptor>, registry: &'r SchemaRegistry) -> Self { Self { root, registry, joins: Vec::new(), resolved: HashMap::new() } }

    /// Alias hosting fields at the end of `join_path`, joining every missing hop.
    /// `Ok(None)` if a hop is not a to-one relation.
    pub fn resolve_join(&mut self, join_path: &str) -> Result<Option<String>, SchemaError> {
        if join_path.is_empty() {
            return Ok(Some(self.root.table().to_owned()));
        }
        if let Some((alias, _)) = self.resolved.get(join_path) {
            return Ok(Some(alias.clone()));
        }

        let mut host_alias = self.root.table().to_owned();
        let mut host = Arc::clone(&self.root);
        let mut prefix = String::new();
        for segment in join_path.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);
            if let Some((alias, schema)) = self.resolved.get(&prefix) {
                host_alias = alias.clone();
                host = Arc::clone(schema);
                continue;
            }

            let Some(relation) = host.relation(segment).filter(|r| r.kind == RelationKind::ToOne) else {
                debug!("join '{}': '{}' is not a to-one relation of {}", join_path, segment, host.table());
                return Ok(None);
            };
            let target = self.registry.get(&relation.target)?;
            let target_column = match &relation.references {
                Some(column) => column.clone(),
                None => target.primary_key().first().cloned().ok_or_else(|| SchemaError::MissingPrimaryKey { entity: target.table().to_owned() })?,
            };
            let alias = self.alias_for(&prefix, segment);
            debug!("join '{}': {} AS {} ON {}.{} = {}.{}", prefix, target.table(), alias, alias, target_column, host_alias, relation.foreign_key);
            self.joins.push(Join {
                path: prefix.clone(),
                table: target.table().to_owned(),
                alias: alias.clone(),
                host: host_alias,
                host_column: relation.foreign_key.clone(),
                target_column,
            });
            self.resolved.insert(prefix.clone(), (alias.clone(), Arc::clone(&target)));
            host_alias = alias;
            host = target;
        }
        Ok(Some(host_alias))
    }

    fn alias_for(&self, path: &str, segment: &str) -> String {
        let taken = |alias: &str| alias == self.root.table() || self.joins.iter().any(|j| j.alias == alias);
        if !taken(segment) {
            return segment.to_owned();
        }
        let mut alias = path.replace('.', "__");
        let mut n = 1;
        while taken(&alias) {
            n += 1;
            alias = format!("{}_{}", path.replace('.', "__"), n);
        }
        warn!("join alias '{}' already in use, aliasing '{}' as '{}'", segment, path, alias);
        alias
    }

    pub fn is_active(&self) -> bool { !self.joins.is_empty() }

    pub fn joins(&self) -> &[Join] { &self.joins }

    /// Marks the current join count so joins added afterwards can be undone.
    pub fn checkpoint(&self) -> usize { self.joins.len() }

    /// Drops joins added after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: usize) {
        for join in self.joins.drain(checkpoint..) {
            self.resolved.remove(&join.path);
        }
    }

    pub fn into_joins(self) -> Vec<Join> { self.joins }
}
