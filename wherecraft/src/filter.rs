//! Filter expressions and their normalized form
//!
//! A filter expression is a JSON object. Field keys map to a literal (implicit
//! `$eq`), an array (implicit `$in`), `null` (`IS NULL`) or an operator map such
//! as `{"$gte": 18, "$lt": 65}`. The logical keys are `$and`, `$or` (arrays of
//! expressions) and `$not` (an expression). Keys of one object are a
//! conjunction in key order.
//!
//! [`Normalizer`] turns that into a [`Predicate`] tree where every leaf is an
//! explicit comparison with an already bound value. Rendering only ever sees
//! the normalized tree, so `{"id": "1"}` and `{"id": {"$eq": "1"}}` are
//! indistinguishable from that point on, at any depth.

use sea_orm::Value;
use serde_json::{Map, Value as JsonValue};

use crate::value::{bind_literal, is_scalar, json_kind};
use crate::{EntityMetadata, FieldDescriptor, FieldType, FilterError, FilterResult, MismatchPolicy};

/// A filter expression as supplied by the caller
pub type FilterExpression = JsonValue;

/// Comparison operators with a single scalar operand
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
}

impl CompareOp {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "$eq" => Some(Self::Eq),
            "$ne" => Some(Self::Ne),
            "$gt" => Some(Self::Gt),
            "$gte" => Some(Self::Gte),
            "$lt" => Some(Self::Lt),
            "$lte" => Some(Self::Lte),
            "$like" => Some(Self::Like),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Like => "$like",
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
        }
    }
}

/// Normalized predicate tree. Columns are unqualified column names.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: String,
        op: CompareOp,
        value: Value,
    },
    In {
        column: String,
        values: Vec<Value>,
        negated: bool,
    },
    Null {
        column: String,
        negated: bool,
    },
    /// Empty conjunction matches every row
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    fn all(mut parts: Vec<Predicate>) -> Self {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Predicate::And(parts)
        }
    }

    fn any(mut parts: Vec<Predicate>) -> Self {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Predicate::Or(parts)
        }
    }
}

pub(crate) struct Normalizer<'a> {
    meta: &'a EntityMetadata,
    policy: MismatchPolicy,
}

impl<'a> Normalizer<'a> {
    pub(crate) fn new(meta: &'a EntityMetadata, policy: MismatchPolicy) -> Self {
        Self { meta, policy }
    }

    /// The root may be empty; nested expressions may not
    pub(crate) fn normalize(&self, expr: &JsonValue) -> FilterResult<Predicate> {
        match expr {
            JsonValue::Object(map) if map.is_empty() => Ok(Predicate::And(Vec::new())),
            JsonValue::Object(map) => self.expression(map, "$and"),
            other => Err(FilterError::ambiguous_operator(
                "$and",
                format!("filter expression must be an object, got {}", json_kind(other)),
            )),
        }
    }

    fn expression(&self, map: &Map<String, JsonValue>, context: &str) -> FilterResult<Predicate> {
        if map.is_empty() {
            return Err(FilterError::ambiguous_operator(
                context,
                "nested expression is empty",
            ));
        }

        let mut parts = Vec::with_capacity(map.len());
        for (key, value) in map {
            let part = match key.as_str() {
                "$and" => Predicate::all(self.expression_list(key, value)?),
                "$or" => Predicate::any(self.expression_list(key, value)?),
                "$not" => Predicate::Not(Box::new(self.nested(key, value)?)),
                op if op.starts_with('$') => {
                    return Err(FilterError::ambiguous_operator(
                        op,
                        "unknown logical operator, comparison operators must be nested under a field",
                    ))
                }
                field => self.field(field, value)?,
            };
            log::trace!("normalized '{}' on {}: {:?}", key, self.meta.name(), part);
            parts.push(part);
        }

        Ok(Predicate::all(parts))
    }

    fn nested(&self, op: &str, value: &JsonValue) -> FilterResult<Predicate> {
        match value {
            JsonValue::Object(map) => self.expression(map, op),
            other => Err(FilterError::ambiguous_operator(
                op,
                format!("expects an object, got {}", json_kind(other)),
            )),
        }
    }

    fn expression_list(&self, op: &str, value: &JsonValue) -> FilterResult<Vec<Predicate>> {
        match value {
            JsonValue::Array(items) if items.is_empty() => Err(FilterError::ambiguous_operator(
                op,
                "expects at least one expression",
            )),
            JsonValue::Array(items) => items.iter().map(|item| self.nested(op, item)).collect(),
            other => Err(FilterError::ambiguous_operator(
                op,
                format!("expects an array of expressions, got {}", json_kind(other)),
            )),
        }
    }

    fn field(&self, name: &str, value: &JsonValue) -> FilterResult<Predicate> {
        let field = self
            .meta
            .field(name)
            .ok_or_else(|| FilterError::unknown_field(self.meta.name(), name))?;

        match value {
            JsonValue::Object(ops) => self.operators(field, ops),
            JsonValue::Array(_) => self.membership(field, "$in", value, false),
            _ => self.compare(field, CompareOp::Eq, value),
        }
    }

    fn operators(
        &self,
        field: &FieldDescriptor,
        ops: &Map<String, JsonValue>,
    ) -> FilterResult<Predicate> {
        if ops.is_empty() {
            return Err(FilterError::ambiguous_operator(
                field.name.as_str(),
                "operator map is empty",
            ));
        }

        let mut parts = Vec::with_capacity(ops.len());
        for (key, operand) in ops {
            let part = match key.as_str() {
                "$in" => self.membership(field, key, operand, false)?,
                "$nin" => self.membership(field, key, operand, true)?,
                op => match CompareOp::from_key(op) {
                    Some(op) => self.compare(field, op, operand)?,
                    None if op.starts_with('$') => {
                        return Err(FilterError::ambiguous_operator(
                            op,
                            format!("unknown comparison operator on field '{}'", field.name),
                        ))
                    }
                    None => {
                        return Err(FilterError::ambiguous_operator(
                            op,
                            format!("expected a comparison operator on field '{}'", field.name),
                        ))
                    }
                },
            };
            parts.push(part);
        }

        Ok(Predicate::all(parts))
    }

    fn compare(
        &self,
        field: &FieldDescriptor,
        op: CompareOp,
        operand: &JsonValue,
    ) -> FilterResult<Predicate> {
        let column = field.column.clone();

        if operand.is_null() {
            return match op {
                CompareOp::Eq => Ok(Predicate::Null {
                    column,
                    negated: false,
                }),
                CompareOp::Ne => Ok(Predicate::Null {
                    column,
                    negated: true,
                }),
                _ => Err(FilterError::ambiguous_operator(
                    op.key(),
                    "null is only valid with $eq and $ne",
                )),
            };
        }

        if !is_scalar(operand) {
            return Err(FilterError::ambiguous_operator(
                op.key(),
                format!(
                    "expects a scalar operand for field '{}', got {}",
                    field.name,
                    json_kind(operand)
                ),
            ));
        }

        if op == CompareOp::Like && field.field_type != FieldType::String {
            return Err(FilterError::ambiguous_operator(
                op.key(),
                format!(
                    "only valid on string fields, '{}' is {}",
                    field.name, field.field_type
                ),
            ));
        }

        Ok(Predicate::Compare {
            column,
            op,
            value: bind_literal(field, operand, self.policy)?,
        })
    }

    fn membership(
        &self,
        field: &FieldDescriptor,
        op: &str,
        operand: &JsonValue,
        negated: bool,
    ) -> FilterResult<Predicate> {
        let items = operand.as_array().ok_or_else(|| {
            FilterError::ambiguous_operator(
                op,
                format!("expects an array, got {}", json_kind(operand)),
            )
        })?;

        let values = items
            .iter()
            .map(|item| {
                if is_scalar(item) {
                    bind_literal(field, item, self.policy)
                } else {
                    Err(FilterError::ambiguous_operator(
                        op,
                        format!("list items must be scalars, got {}", json_kind(item)),
                    ))
                }
            })
            .collect::<FilterResult<Vec<_>>>()?;

        Ok(Predicate::In {
            column: field.column.clone(),
            values,
            negated,
        })
    }
}
