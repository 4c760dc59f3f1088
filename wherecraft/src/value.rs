//! Literal binding
//!
//! Turns a JSON literal into the `sea_orm::Value` bound for a field, checking it
//! against the field's declared type. Under [`MismatchPolicy::Reject`] only the
//! natural JSON kind of each type is accepted; under [`MismatchPolicy::Coerce`]
//! the literal is converted first and a conversion that cannot succeed is still
//! a type mismatch. No branch here looks at whether the field is the primary key.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use sea_orm::Value;
use serde_json::Value as JsonValue;
use std::str::FromStr;
use uuid::Uuid;

use crate::{FieldDescriptor, FieldType, FilterError, FilterResult, MismatchPolicy};

/// Name of a JSON literal's kind as reported in type mismatch errors
pub(crate) fn json_kind(literal: &JsonValue) -> &'static str {
    match literal {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

pub(crate) fn is_scalar(literal: &JsonValue) -> bool {
    matches!(
        literal,
        JsonValue::Bool(_) | JsonValue::Number(_) | JsonValue::String(_)
    )
}

/// Bind a non-null scalar literal for `field`
pub(crate) fn bind_literal(
    field: &FieldDescriptor,
    literal: &JsonValue,
    policy: MismatchPolicy,
) -> FilterResult<Value> {
    let mismatch = || {
        FilterError::type_mismatch(
            field.name.as_str(),
            field.field_type.as_str(),
            json_kind(literal),
        )
    };
    let coerce = policy == MismatchPolicy::Coerce;

    let value = match (field.field_type, literal) {
        (FieldType::String, JsonValue::String(s)) => Value::from(s.clone()),
        (FieldType::String, JsonValue::Number(n)) if coerce => Value::from(n.to_string()),
        (FieldType::String, JsonValue::Bool(b)) if coerce => Value::from(b.to_string()),

        (FieldType::Integer, JsonValue::Number(n)) => match n.as_i64() {
            Some(i) => Value::from(i),
            None => match n.as_f64() {
                Some(f) if coerce && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Value::from(f as i64)
                }
                _ => return Err(mismatch()),
            },
        },
        (FieldType::Integer, JsonValue::String(s)) if coerce => {
            Value::from(i64::from_str(s.trim()).map_err(|_| mismatch())?)
        }

        (FieldType::Float, JsonValue::Number(n)) => Value::from(n.as_f64().ok_or_else(mismatch)?),
        (FieldType::Float, JsonValue::String(s)) if coerce => {
            let parsed = f64::from_str(s.trim()).ok().filter(|f| f.is_finite());
            Value::from(parsed.ok_or_else(mismatch)?)
        }

        (FieldType::Boolean, JsonValue::Bool(b)) => Value::from(*b),
        (FieldType::Boolean, JsonValue::String(s)) if coerce => match s.as_str() {
            "true" => Value::from(true),
            "false" => Value::from(false),
            _ => return Err(mismatch()),
        },
        (FieldType::Boolean, JsonValue::Number(n)) if coerce => match n.as_i64() {
            Some(0) => Value::from(false),
            Some(1) => Value::from(true),
            _ => return Err(mismatch()),
        },

        (FieldType::Uuid, JsonValue::String(s)) => {
            Value::from(Uuid::parse_str(s).map_err(|_| mismatch())?)
        }

        (FieldType::DateTime, JsonValue::String(s)) => Value::from(
            DateTime::<FixedOffset>::parse_from_rfc3339(s).map_err(|_| mismatch())?,
        ),

        (FieldType::Decimal, JsonValue::Number(n)) => {
            Value::from(Decimal::from_str(&n.to_string()).map_err(|_| mismatch())?)
        }
        (FieldType::Decimal, JsonValue::String(s)) if coerce => {
            Value::from(Decimal::from_str(s.trim()).map_err(|_| mismatch())?)
        }

        _ => return Err(mismatch()),
    };

    Ok(value)
}
