use sea_orm::DbBackend;
use serde::Deserialize;

use crate::{FilterError, FilterResult};

/// How bound parameters are spelled in the generated SQL
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `?`
    #[default]
    QuestionMark,
    /// `$1`, `$2`, ...
    Dollar,
    /// `:p1`, `:p2`, ...
    Named,
}

impl PlaceholderStyle {
    /// The style the given sea-orm backend expects
    pub fn for_backend(backend: DbBackend) -> Self {
        match backend {
            DbBackend::Postgres => Self::Dollar,
            _ => Self::QuestionMark,
        }
    }

    /// Render the placeholder for a 1-based parameter position
    pub fn placeholder(&self, position: usize) -> String {
        match self {
            Self::QuestionMark => "?".to_string(),
            Self::Dollar => format!("${}", position),
            Self::Named => format!(":p{}", position),
        }
    }
}

/// What to do with a literal whose runtime kind differs from the field's declared type
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
    #[default]
    Reject,
    Coerce,
}

/// Prefix applied to column references
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    /// The entity table name
    #[default]
    Table,
    /// A query alias such as `u0`
    Alias(String),
    None,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslatorConfig {
    pub placeholder: PlaceholderStyle,
    pub mismatch: MismatchPolicy,
    pub quote_identifiers: bool,
    pub qualifier: Qualifier,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            placeholder: PlaceholderStyle::default(),
            mismatch: MismatchPolicy::default(),
            quote_identifiers: true,
            qualifier: Qualifier::default(),
        }
    }
}

impl TranslatorConfig {
    pub fn from_json_str(raw: &str) -> FilterResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| FilterError::invalid_configuration("TranslatorConfig", e.to_string()))
    }

    /// Defaults with the placeholder style of the given backend
    pub fn for_backend(backend: DbBackend) -> Self {
        Self::default().with_placeholder(PlaceholderStyle::for_backend(backend))
    }

    pub fn with_placeholder(mut self, placeholder: PlaceholderStyle) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn with_mismatch_policy(mut self, mismatch: MismatchPolicy) -> Self {
        self.mismatch = mismatch;
        self
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = qualifier;
        self
    }

    pub fn with_quoted_identifiers(mut self, quote: bool) -> Self {
        self.quote_identifiers = quote;
        self
    }
}
