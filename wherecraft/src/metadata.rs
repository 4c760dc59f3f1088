// Entity metadata consumed by the translator: field descriptors and name-based lookup

use heck::ToUpperCamelCase;
use std::fmt;

use crate::{FilterError, FilterResult};

/// Declared semantic type of an entity field
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Uuid,
    /// RFC 3339 timestamp with offset
    DateTime,
    Decimal,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Uuid => "uuid",
            Self::DateTime => "datetime",
            Self::Decimal => "decimal",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub column: String,
    pub field_type: FieldType,
    pub primary_key: bool,
}

impl FieldDescriptor {
    /// Create a regular field whose column has the same name
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            field_type,
            primary_key: false,
        }
    }

    /// Create the identifying field
    pub fn primary(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            primary_key: true,
            ..Self::new(name, field_type)
        }
    }

    /// Map the field onto a differently named column
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }
}

/// Metadata of a single entity. Exactly one field is the primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    name: String,
    table_name: String,
    fields: Vec<FieldDescriptor>,
    primary_key_index: usize,
}

impl EntityMetadata {
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        fields: Vec<FieldDescriptor>,
    ) -> FilterResult<Self> {
        let name = name.into();
        let table_name = table_name.into();

        if table_name.is_empty() {
            return Err(FilterError::invalid_metadata(name, "table name is empty"));
        }

        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|other| other.name == field.name) {
                return Err(FilterError::invalid_metadata(
                    name,
                    format!("field '{}' is declared twice", field.name),
                ));
            }
        }

        let mut primary = fields.iter().enumerate().filter(|(_, f)| f.primary_key);
        let primary_key_index = match (primary.next(), primary.next()) {
            (Some((index, _)), None) => index,
            (None, _) => {
                return Err(FilterError::invalid_metadata(
                    name,
                    "no primary key field found",
                ))
            }
            (Some(_), Some(_)) => {
                return Err(FilterError::invalid_metadata(
                    name,
                    "multiple primary key fields found, exactly one is required",
                ))
            }
        };

        Ok(Self {
            name,
            table_name,
            fields,
            primary_key_index,
        })
    }

    pub fn builder(name: impl Into<String>, table_name: impl Into<String>) -> EntityMetadataBuilder {
        EntityMetadataBuilder {
            name: name.into(),
            table_name: table_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn primary_key(&self) -> &FieldDescriptor {
        &self.fields[self.primary_key_index]
    }

    /// Look a field up by name, falling back to its column name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.fields.iter().find(|f| f.column == name))
    }
}

pub struct EntityMetadataBuilder {
    name: String,
    table_name: String,
    fields: Vec<FieldDescriptor>,
}

impl EntityMetadataBuilder {
    pub fn primary_key(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FieldDescriptor::primary(name, field_type));
        self
    }

    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FieldDescriptor::new(name, field_type));
        self
    }

    pub fn descriptor(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.push(descriptor);
        self
    }

    pub fn build(self) -> FilterResult<EntityMetadata> {
        EntityMetadata::new(self.name, self.table_name, self.fields)
    }
}

/// Registry of entity metadata with namespace-aware name resolution
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    entities: Vec<EntityMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, metadata: EntityMetadata) -> FilterResult<()> {
        if self.entities.iter().any(|m| m.name == metadata.name) {
            return Err(FilterError::invalid_metadata(
                metadata.name,
                "entity is already registered",
            ));
        }
        self.entities.push(metadata);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, entity_name: &str) -> Option<&EntityMetadata> {
        // Try exact match first
        if let Some(meta) = self.find_by_name(entity_name) {
            return Some(meta);
        }

        // "blog::User" -> "User"
        let bare = match entity_name.rfind("::") {
            Some(pos) => &entity_name[pos + 2..],
            None => entity_name,
        };
        if let Some(meta) = self.find_by_name(bare) {
            return Some(meta);
        }

        // "user_profile" -> "UserProfile"
        if let Some(meta) = self.find_by_name(&bare.to_upper_camel_case()) {
            return Some(meta);
        }

        self.entities.iter().find(|meta| meta.table_name == bare)
    }

    fn find_by_name(&self, name: &str) -> Option<&EntityMetadata> {
        self.entities.iter().find(|meta| meta.name == name)
    }
}
