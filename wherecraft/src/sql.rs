use sea_orm::sea_query::{Condition, Expr};
use sea_orm::Value;
use std::fmt;

use crate::{FilterError, FilterResult, PlaceholderStyle};

/// Quote an identifier, doubling embedded quotes
pub fn ident(name: &str) -> String {
    let escaped = name.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

enum Piece {
    Sql(String),
    Bind(Value),
}

/// Accumulates SQL text and bound values; placeholders are numbered on `finish`
#[derive(Default)]
pub(crate) struct SqlWriter {
    pieces: Vec<Piece>,
}

impl SqlWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_sql(&mut self, sql: impl Into<String>) {
        self.pieces.push(Piece::Sql(sql.into()));
    }

    pub(crate) fn bind(&mut self, value: Value) {
        self.pieces.push(Piece::Bind(value));
    }

    pub(crate) fn finish(self, style: PlaceholderStyle) -> CompiledPredicate {
        let mut sql = String::new();
        let mut params = Vec::new();
        for piece in self.pieces {
            match piece {
                Piece::Sql(s) => sql.push_str(&s),
                Piece::Bind(v) => {
                    params.push(v);
                    sql.push_str(&style.placeholder(params.len()));
                }
            }
        }
        CompiledPredicate { sql, params, style }
    }
}

/// A parameterized WHERE fragment. `params` are in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPredicate {
    sql: String,
    params: Vec<Value>,
    style: PlaceholderStyle,
}

impl CompiledPredicate {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn placeholder_style(&self) -> PlaceholderStyle {
        self.style
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    /// Wrap the fragment as a sea-query condition for `Select::filter`.
    /// sea-query rewrites `?` for the target backend, so only that style is accepted.
    pub fn into_condition(self) -> FilterResult<Condition> {
        if self.style != PlaceholderStyle::QuestionMark {
            return Err(FilterError::invalid_configuration(
                "CompiledPredicate",
                format!(
                    "into_condition requires question mark placeholders, got {:?}",
                    self.style
                ),
            ));
        }
        Ok(Condition::all().add(Expr::cust_with_values(self.sql, self.params)))
    }
}

impl fmt::Display for CompiledPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
