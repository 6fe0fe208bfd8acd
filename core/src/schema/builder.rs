use super::{Entity, EntityRef, FieldDescriptor, RelationDescriptor, RelationKind, SchemaDescriptor, TABLE_PLACEHOLDER};
use crate::error::SchemaError;
use crate::value::{DataType, ScalarType, StorageKind};
use indexmap::IndexMap;

/// Collects an entity's fields and relations; [`SchemaBuilder::build`] validates them.
pub struct SchemaBuilder {
    table: &'static str,
    primary_key: Vec<String>,
    fields: Vec<FieldDescriptor>,
    relations: Vec<RelationDescriptor>,
}

impl SchemaBuilder {
    pub fn new(table: &'static str) -> Self { Self { table, primary_key: Vec::new(), fields: Vec::new(), relations: Vec::new() } }

    pub fn primary_key<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// A column whose type is inferred from its storage kind.
    pub fn field(&mut self, column: &str, storage: StorageKind) -> &mut Self { self.push(column, column, storage, None, false, None) }

    /// A column exposed under a different field name.
    pub fn field_as(&mut self, name: &str, column: &str, storage: StorageKind) -> &mut Self { self.push(name, column, storage, None, false, None) }

    /// A column with an explicit data type overriding the inferred one.
    pub fn typed(&mut self, column: &str, storage: StorageKind, data_type: ScalarType) -> &mut Self {
        self.push(column, column, storage, Some(data_type), false, None)
    }

    /// A JSON array column whose elements are stored as `element`.
    pub fn array(&mut self, column: &str, element: StorageKind) -> &mut Self { self.push(column, column, element, None, true, None) }

    /// A server-authored expression selected as `name`. It must reference [`TABLE_PLACEHOLDER`].
    pub fn computed(&mut self, name: &str, expression: &str, storage: StorageKind) -> &mut Self {
        self.push(name, name, storage, None, false, Some(expression.to_owned()))
    }

    /// Joinable relation through `foreign_key` on this entity, referencing the target's primary key.
    pub fn to_one<T: Entity>(&mut self, name: &str, foreign_key: &str) -> &mut Self { self.relate::<T>(name, RelationKind::ToOne, foreign_key, None) }

    pub fn to_one_referencing<T: Entity>(&mut self, name: &str, foreign_key: &str, references: &str) -> &mut Self {
        self.relate::<T>(name, RelationKind::ToOne, foreign_key, Some(references))
    }

    /// Relation through `foreign_key` on the target. Recorded but never traversed.
    pub fn to_many<T: Entity>(&mut self, name: &str, foreign_key: &str) -> &mut Self { self.relate::<T>(name, RelationKind::ToMany, foreign_key, None) }

    fn push(
        &mut self,
        name: &str,
        column: &str,
        storage: StorageKind,
        data_type: Option<ScalarType>,
        is_array: bool,
        computed: Option<String>,
    ) -> &mut Self {
        self.fields.push(FieldDescriptor {
            name: name.to_owned(),
            column: column.to_owned(),
            storage,
            data_type: DataType::resolve(data_type, storage, is_array),
            is_array,
            computed,
            entity: self.table,
        });
        self
    }

    fn relate<T: Entity>(&mut self, name: &str, kind: RelationKind, foreign_key: &str, references: Option<&str>) -> &mut Self {
        self.relations.push(RelationDescriptor {
            name: name.to_owned(),
            kind,
            target: EntityRef::of::<T>(),
            foreign_key: foreign_key.to_owned(),
            references: references.map(str::to_owned),
        });
        self
    }

    pub fn build(self) -> Result<SchemaDescriptor, SchemaError> {
        let entity = self.table;
        check_identifier(entity, entity)?;

        let mut fields: IndexMap<String, FieldDescriptor> = IndexMap::with_capacity(self.fields.len());
        for field in self.fields {
            check_identifier(entity, &field.name)?;
            check_identifier(entity, &field.column)?;
            if let Some(expression) = &field.computed {
                validate_computed(expression).map_err(|reason| SchemaError::InvalidComputed {
                    entity: entity.to_owned(),
                    field: field.name.clone(),
                    reason,
                })?;
            }
            if fields.contains_key(&field.column) {
                return Err(SchemaError::DuplicateField { entity: entity.to_owned(), field: field.column });
            }
            fields.insert(field.column.clone(), field);
        }

        let is_stored = |column: &str| fields.get(column).is_some_and(|f| !f.is_computed());
        for column in &self.primary_key {
            if !is_stored(column) {
                return Err(SchemaError::UnknownKeyColumn { entity: entity.to_owned(), column: column.clone() });
            }
        }

        let mut relations: IndexMap<String, RelationDescriptor> = IndexMap::with_capacity(self.relations.len());
        for relation in self.relations {
            check_identifier(entity, &relation.name)?;
            check_identifier(entity, &relation.foreign_key)?;
            if let Some(references) = &relation.references {
                check_identifier(entity, references)?;
            }
            if relation.kind == RelationKind::ToOne && !is_stored(&relation.foreign_key) {
                return Err(SchemaError::UnknownRelationKey {
                    entity: entity.to_owned(),
                    relation: relation.name,
                    column: relation.foreign_key,
                });
            }
            if relations.contains_key(&relation.name) {
                return Err(SchemaError::DuplicateRelation { entity: entity.to_owned(), relation: relation.name });
            }
            relations.insert(relation.name.clone(), relation);
        }

        Ok(SchemaDescriptor::new(entity, self.primary_key, fields, relations))
    }
}

fn check_identifier(entity: &str, name: &str) -> Result<(), SchemaError> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c == '_' || c.is_ascii_alphabetic()) && chars.all(|c| c == '_' || c.is_ascii_alphanumeric());
    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier { entity: entity.to_owned(), name: name.to_owned() })
    }
}

/// Structural checks on a computed expression. Comment tokens are refused even inside literals.
pub fn validate_computed(expression: &str) -> Result<(), &'static str> {
    if !expression.contains(TABLE_PLACEHOLDER) {
        return Err("expression must reference the {table} placeholder");
    }
    if expression.contains("--") || expression.contains("/*") {
        return Err("comments are not allowed");
    }
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for c in expression.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                ';' => return Err("statement separators are not allowed"),
                '(' => depth += 1,
                ')' => depth = depth.checked_sub(1).ok_or("unbalanced parentheses")?,
                _ => {}
            },
        }
    }
    if quote.is_some() {
        return Err("unterminated quoted literal or identifier");
    }
    if depth != 0 {
        return Err("unbalanced parentheses");
    }
    Ok(())
}
