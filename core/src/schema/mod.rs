//! Entity schemas: what can be filtered, sorted, searched and projected, and how relations join.
//!
//! Entities describe themselves once through [`Entity::describe`]; the resulting [`SchemaDescriptor`]
//! is validated, cached in a [`SchemaRegistry`] and shared for the life of the process.
mod blacklist;
mod builder;
mod registry;
mod resolve;

pub use blacklist::Blacklist;
pub use builder::SchemaBuilder;
pub use registry::SchemaRegistry;
pub use resolve::{resolve, ResolvedField};

use crate::error::SchemaError;
use crate::value::{DataType, StorageKind};
use indexmap::IndexMap;
use sieveql::plan::{quote_ident, ColumnExpr};
use std::any::TypeId;
use std::fmt;

/// Token in a computed expression replaced by the quoted alias of the hosting table.
pub const TABLE_PLACEHOLDER: &str = "{table}";

/// A type listed by the engine.
pub trait Entity: 'static {
    const TABLE: &'static str;

    fn describe(schema: &mut SchemaBuilder);
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub column: String,
    pub storage: StorageKind,
    pub data_type: DataType,
    pub is_array: bool,
    /// SQL expression containing [`TABLE_PLACEHOLDER`], selected in place of a column.
    pub computed: Option<String>,
    pub entity: &'static str,
}

impl FieldDescriptor {
    pub fn is_computed(&self) -> bool { self.computed.is_some() }

    /// Expression for this field when its entity is joined as `alias`.
    pub fn expr(&self, alias: &str) -> ColumnExpr {
        match &self.computed {
            Some(sql) => ColumnExpr::computed(sql.replace(TABLE_PLACEHOLDER, &quote_ident(alias))),
            None => ColumnExpr::column(alias, &self.column),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    ToOne,
    /// Never joined: joining would multiply rows and break counts.
    ToMany,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationDescriptor {
    pub name: String,
    pub kind: RelationKind,
    pub target: EntityRef,
    /// To-one: column on this entity. To-many: column on the target.
    pub foreign_key: String,
    /// Column the foreign key points at; the referenced entity's first primary-key column when `None`.
    pub references: Option<String>,
}

/// Type-erased handle on an [`Entity`], enough to build its schema lazily.
#[derive(Clone, Copy)]
pub struct EntityRef {
    type_id: TypeId,
    table: &'static str,
    describe: fn(&mut SchemaBuilder),
}

impl EntityRef {
    pub fn of<T: Entity>() -> Self { Self { type_id: TypeId::of::<T>(), table: T::TABLE, describe: T::describe } }

    pub fn type_id(&self) -> TypeId { self.type_id }

    pub fn table(&self) -> &'static str { self.table }

    pub(crate) fn build(&self) -> Result<SchemaDescriptor, SchemaError> {
        let mut builder = SchemaBuilder::new(self.table);
        (self.describe)(&mut builder);
        builder.build()
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool { self.type_id == other.type_id }
}

impl Eq for EntityRef {}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.debug_tuple("EntityRef").field(&self.table).finish() }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    table: &'static str,
    primary_key: Vec<String>,
    fields: IndexMap<String, FieldDescriptor>,
    relations: IndexMap<String, RelationDescriptor>,
}

impl SchemaDescriptor {
    pub(crate) fn new(
        table: &'static str,
        primary_key: Vec<String>,
        fields: IndexMap<String, FieldDescriptor>,
        relations: IndexMap<String, RelationDescriptor>,
    ) -> Self {
        Self { table, primary_key, fields, relations }
    }

    pub fn table(&self) -> &'static str { self.table }

    pub fn primary_key(&self) -> &[String] { &self.primary_key }

    /// Looks a field up by storage column name.
    pub fn field(&self, column: &str) -> Option<&FieldDescriptor> { self.fields.get(column) }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> { self.fields.values() }

    pub fn relation(&self, name: &str) -> Option<&RelationDescriptor> { self.relations.get(name) }

    pub fn relations(&self) -> impl Iterator<Item = &RelationDescriptor> { self.relations.values() }

    pub fn to_one_relations(&self) -> impl Iterator<Item = &RelationDescriptor> { self.relations.values().filter(|r| r.kind == RelationKind::ToOne) }
}
