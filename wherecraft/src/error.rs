//! Error types for filter translation
//! Every variant is raised before any SQL text is produced

/// Crate-wide result alias
pub type FilterResult<T> = std::result::Result<T, FilterError>;

/// Typed translation errors that can be converted into `sea_orm::DbErr`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("FilterError::UnknownField: entity='{entity}' field='{field}'")]
    UnknownField { entity: String, field: String },

    #[error("FilterError::AmbiguousOperator: operator='{operator}' reason='{reason}'")]
    AmbiguousOperator { operator: String, reason: String },

    #[error("FilterError::TypeMismatch: field='{field}' expected='{expected}' actual='{actual}'")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("FilterError::InvalidMetadata: entity='{entity}' message='{message}'")]
    InvalidMetadata { entity: String, message: String },

    #[error("FilterError::UnknownEntity: entity='{entity}'")]
    UnknownEntity { entity: String },

    #[error("FilterError::InvalidConfiguration: component='{component}' message='{message}'")]
    InvalidConfiguration { component: String, message: String },
}

impl From<FilterError> for sea_orm::DbErr {
    fn from(err: FilterError) -> Self {
        sea_orm::DbErr::Custom(err.to_string())
    }
}

impl FilterError {
    /// Create an unknown field error
    pub fn unknown_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Create an ambiguous operator error
    pub fn ambiguous_operator(operator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AmbiguousOperator {
            operator: operator.into(),
            reason: reason.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_metadata(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            entity: entity.into(),
            message: message.into(),
        }
    }

    pub fn unknown_entity(entity: impl Into<String>) -> Self {
        Self::UnknownEntity {
            entity: entity.into(),
        }
    }

    pub fn invalid_configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownField { entity, field } => {
                format!("Field '{}' does not exist on {}.", field, entity)
            }
            Self::AmbiguousOperator { operator, reason } => {
                format!("Invalid use of '{}': {}", operator, reason)
            }
            Self::TypeMismatch {
                field,
                expected,
                actual,
            } => {
                format!(
                    "Field '{}' has invalid type: expected {}, got {}",
                    field, expected, actual
                )
            }
            Self::InvalidMetadata { entity, message } => {
                format!("Invalid metadata for {}: {}", entity, message)
            }
            Self::UnknownEntity { entity } => {
                format!(
                    "No metadata registered for entity '{}'. Please ensure the entity is registered.",
                    entity
                )
            }
            Self::InvalidConfiguration { component, message } => {
                format!("Invalid configuration for {}: {}", component, message)
            }
        }
    }
}
