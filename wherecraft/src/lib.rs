//! Translate JSON filter expressions into parameterized SQL predicates.
//!
//! ```ignore
//! let meta = EntityMetadata::builder("User", "user")
//!     .primary_key("id", FieldType::String)
//!     .field("name", FieldType::String)
//!     .build()?;
//! let compiled = Translator::new(TranslatorConfig::for_backend(DbBackend::Postgres))
//!     .translate(&json!({ "$not": { "id": "1" } }), &meta)?;
//! assert_eq!(compiled.sql(), r#"NOT ("user"."id" = $1)"#);
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod metadata;
pub mod sql;
pub mod translate;
mod value;

pub use config::{MismatchPolicy, PlaceholderStyle, Qualifier, TranslatorConfig};
pub use error::{FilterError, FilterResult};
pub use filter::{CompareOp, FilterExpression, Predicate};
pub use metadata::{EntityMetadata, EntityMetadataBuilder, FieldDescriptor, FieldType, MetadataRegistry};
pub use sql::CompiledPredicate;
pub use translate::{translate, Translator};

// Re-export so callers can build expressions and bind results without extra deps
pub use sea_orm;
pub use serde_json;
