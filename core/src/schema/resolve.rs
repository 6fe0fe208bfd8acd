use super::{Blacklist, FieldDescriptor, RelationKind, SchemaDescriptor, SchemaRegistry};
use crate::error::SchemaError;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub field: FieldDescriptor,
    /// Last relation segment traversed, or the root table.
    pub host_table: String,
    /// Relation chain consumed, empty for root fields.
    pub join_path: String,
}

/// Resolves a dotted field path against `root`.
///
/// `Ok(None)` means the path is not addressable: unknown, blacklisted, through a to-many relation,
/// or below a final blacklist. Errors only come from building a related entity's schema.
pub fn resolve(path: &str, root: &Arc<SchemaDescriptor>, blacklist: &Blacklist, registry: &SchemaRegistry) -> Result<Option<ResolvedField>, SchemaError> {
    if path.split('.').any(str::is_empty) {
        debug!("resolve '{}': empty path segment", path);
        return Ok(None);
    }
    let (chain, leaf) = path.rsplit_once('.').unwrap_or(("", path));

    let mut schema = Arc::clone(root);
    let mut level = Some(blacklist);
    if !chain.is_empty() {
        for segment in chain.split('.') {
            if let Some(current) = level {
                if current.is_final() || current.excludes_relation(segment) {
                    debug!("resolve '{}': relation '{}' is blacklisted", path, segment);
                    return Ok(None);
                }
            }
            let Some(relation) = schema.relation(segment) else {
                debug!("resolve '{}': {} has no relation '{}'", path, schema.table(), segment);
                return Ok(None);
            };
            if relation.kind != RelationKind::ToOne {
                debug!("resolve '{}': '{}' is a to-many relation", path, segment);
                return Ok(None);
            }
            let target = registry.get(&relation.target)?;
            level = level.and_then(|current| current.child(segment));
            schema = target;
        }
    }

    if level.is_some_and(|current| current.excludes_field(leaf)) {
        debug!("resolve '{}': field '{}' is blacklisted", path, leaf);
        return Ok(None);
    }
    let Some(field) = schema.field(leaf) else {
        debug!("resolve '{}': {} has no field '{}'", path, schema.table(), leaf);
        return Ok(None);
    };

    let host_table = if chain.is_empty() { root.table() } else { chain.rsplit('.').next().unwrap_or(chain) };
    Ok(Some(ResolvedField { field: field.clone(), host_table: host_table.to_owned(), join_path: chain.to_owned() }))
}
