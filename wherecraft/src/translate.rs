use crate::filter::Normalizer;
use crate::sql::{ident, SqlWriter};
use crate::{
    CompiledPredicate, EntityMetadata, FilterError, FilterExpression, FilterResult,
    MetadataRegistry, Predicate, Qualifier, TranslatorConfig,
};

/// Translates filter expressions into parameterized WHERE fragments.
///
/// Translation is a pure function of the expression, the entity metadata and
/// the configuration, so one translator can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    config: TranslatorConfig,
}

impl Translator {
    pub fn new(config: TranslatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Parse and type-check an expression without rendering it
    pub fn normalize(
        &self,
        expr: &FilterExpression,
        meta: &EntityMetadata,
    ) -> FilterResult<Predicate> {
        Normalizer::new(meta, self.config.mismatch)
            .normalize(expr)
            .inspect_err(|err| {
                log::debug!("rejected filter for entity '{}': {}", meta.name(), err);
            })
    }

    pub fn translate(
        &self,
        expr: &FilterExpression,
        meta: &EntityMetadata,
    ) -> FilterResult<CompiledPredicate> {
        let predicate = self.normalize(expr, meta)?;
        let compiled = self.compile(&predicate, meta);
        log::debug!(
            "translated filter for entity '{}': {} ({} params)",
            meta.name(),
            compiled.sql(),
            compiled.params().len()
        );
        Ok(compiled)
    }

    /// Look the entity up in `registry`, then translate
    pub fn translate_for(
        &self,
        entity_name: &str,
        expr: &FilterExpression,
        registry: &MetadataRegistry,
    ) -> FilterResult<CompiledPredicate> {
        let meta = registry
            .get(entity_name)
            .ok_or_else(|| FilterError::unknown_entity(entity_name))?;
        self.translate(expr, meta)
    }

    /// Render an already normalized predicate
    pub fn compile(&self, predicate: &Predicate, meta: &EntityMetadata) -> CompiledPredicate {
        let qualifier = match &self.config.qualifier {
            Qualifier::Table => Some(meta.table_name()),
            Qualifier::Alias(alias) => Some(alias.as_str()),
            Qualifier::None => None,
        };
        let mut writer = SqlWriter::new();
        self.write(&mut writer, predicate, qualifier);
        writer.finish(self.config.placeholder)
    }

    fn write(&self, w: &mut SqlWriter, predicate: &Predicate, qualifier: Option<&str>) {
        match predicate {
            Predicate::Compare { column, op, value } => {
                w.push_sql(format!("{} {} ", self.column(qualifier, column), op.sql()));
                w.bind(value.clone());
            }
            Predicate::In {
                values, negated, ..
            } if values.is_empty() => {
                w.push_sql(if *negated { "1 = 1" } else { "1 = 0" });
            }
            Predicate::In {
                column,
                values,
                negated,
            } => {
                let keyword = if *negated { "NOT IN" } else { "IN" };
                w.push_sql(format!("{} {} (", self.column(qualifier, column), keyword));
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        w.push_sql(", ");
                    }
                    w.bind(value.clone());
                }
                w.push_sql(")");
            }
            Predicate::Null { column, negated } => {
                let keyword = if *negated { "IS NOT NULL" } else { "IS NULL" };
                w.push_sql(format!("{} {}", self.column(qualifier, column), keyword));
            }
            Predicate::And(parts) => self.write_group(w, parts, " AND ", "1 = 1", qualifier),
            Predicate::Or(parts) => self.write_group(w, parts, " OR ", "1 = 0", qualifier),
            Predicate::Not(inner) => {
                w.push_sql("NOT (");
                self.write(w, inner, qualifier);
                w.push_sql(")");
            }
        }
    }

    fn write_group(
        &self,
        w: &mut SqlWriter,
        parts: &[Predicate],
        separator: &str,
        empty: &str,
        qualifier: Option<&str>,
    ) {
        match parts {
            [] => w.push_sql(empty),
            [only] => self.write(w, only, qualifier),
            _ => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        w.push_sql(separator);
                    }
                    if is_compound(part) {
                        w.push_sql("(");
                        self.write(w, part, qualifier);
                        w.push_sql(")");
                    } else {
                        self.write(w, part, qualifier);
                    }
                }
            }
        }
    }

    fn column(&self, qualifier: Option<&str>, column: &str) -> String {
        let quote = |name: &str| {
            if self.config.quote_identifiers {
                ident(name)
            } else {
                name.to_string()
            }
        };
        match qualifier {
            Some(q) => format!("{}.{}", quote(q), quote(column)),
            None => quote(column),
        }
    }
}

/// Whether the predicate renders as a bare AND/OR chain. A one-element group
/// renders as its child, so look through it.
fn is_compound(predicate: &Predicate) -> bool {
    match predicate {
        Predicate::And(parts) | Predicate::Or(parts) => match parts.as_slice() {
            [only] => is_compound(only),
            parts => parts.len() > 1,
        },
        _ => false,
    }
}

/// Translate with the default configuration
pub fn translate(
    expr: &FilterExpression,
    meta: &EntityMetadata,
) -> FilterResult<CompiledPredicate> {
    Translator::default().translate(expr, meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldType, MismatchPolicy, PlaceholderStyle};
    use sea_orm::Value;
    use serde_json::json;

    fn user() -> EntityMetadata {
        EntityMetadata::builder("User", "user")
            .primary_key("id", FieldType::String)
            .field("name", FieldType::String)
            .field("email", FieldType::String)
            .field("age", FieldType::Integer)
            .build()
            .unwrap()
    }

    fn dollar() -> Translator {
        Translator::new(TranslatorConfig::default().with_placeholder(PlaceholderStyle::Dollar))
    }

    #[test]
    fn negated_primary_key_equality() {
        let compiled = dollar().translate(&json!({ "$not": { "id": "1" } }), &user()).unwrap();
        assert_eq!(compiled.sql(), r#"NOT ("user"."id" = $1)"#);
        assert_eq!(compiled.params(), &[Value::from("1".to_string())]);
    }

    #[test]
    fn explicit_and_implicit_equality_compile_identically() {
        let meta = user();
        let t = dollar();
        let implicit = t.translate(&json!({ "$not": { "id": "1" } }), &meta).unwrap();
        let explicit = t
            .translate(&json!({ "$not": { "id": { "$eq": "1" } } }), &meta)
            .unwrap();
        assert_eq!(implicit, explicit);
    }

    #[test]
    fn negation_wraps_the_unnegated_fragment() {
        let meta = user();
        let t = dollar();
        let inner = json!({ "name": "Bar", "$or": [{ "age": { "$gt": 30 } }, { "email": null }] });
        let plain = t.translate(&inner, &meta).unwrap();
        let negated = t.translate(&json!({ "$not": inner }), &meta).unwrap();

        assert_eq!(
            plain.sql(),
            r#""user"."name" = $1 AND ("user"."age" > $2 OR "user"."email" IS NULL)"#
        );
        assert_eq!(negated.sql(), format!("NOT ({})", plain.sql()));
        assert_eq!(negated.params(), plain.params());
    }

    #[test]
    fn primary_key_and_other_fields_share_the_same_shape() {
        let meta = user();
        let t = dollar();
        let by_id = t.translate(&json!({ "$not": { "id": "Bar" } }), &meta).unwrap();
        let by_name = t.translate(&json!({ "$not": { "name": "Bar" } }), &meta).unwrap();
        assert_eq!(by_id.sql().replace("\"id\"", "\"name\""), by_name.sql());
        assert_eq!(by_id.params(), by_name.params());
    }

    #[test]
    fn numeric_literal_for_string_key() {
        let meta = user();
        let err = dollar().translate(&json!({ "$not": { "id": 1 } }), &meta).unwrap_err();
        assert_eq!(err, FilterError::type_mismatch("id", "string", "number"));

        let coercing = Translator::new(
            TranslatorConfig::default()
                .with_placeholder(PlaceholderStyle::Dollar)
                .with_mismatch_policy(MismatchPolicy::Coerce),
        );
        let coerced = coercing.translate(&json!({ "$not": { "id": 1 } }), &meta).unwrap();
        let expected = coercing.translate(&json!({ "$not": { "id": "1" } }), &meta).unwrap();
        assert_eq!(coerced, expected);
    }

    #[test]
    fn membership_and_null_rendering() {
        let meta = user();
        let t = dollar();
        let compiled = t
            .translate(
                &json!({ "id": { "$in": ["1", "2"], "$nin": ["3"] }, "email": { "$ne": null } }),
                &meta,
            )
            .unwrap();
        assert_eq!(
            compiled.sql(),
            r#"("user"."id" IN ($1, $2) AND "user"."id" NOT IN ($3)) AND "user"."email" IS NOT NULL"#
        );
        assert_eq!(compiled.params().len(), 3);

        let empty_in = t.translate(&json!({ "id": [] }), &meta).unwrap();
        assert_eq!(empty_in.sql(), "1 = 0");
        assert!(empty_in.params().is_empty());

        let empty_nin = t.translate(&json!({ "id": { "$nin": [] } }), &meta).unwrap();
        assert_eq!(empty_nin.sql(), "1 = 1");
    }

    #[test]
    fn empty_root_matches_everything() {
        let compiled = translate(&json!({}), &user()).unwrap();
        assert_eq!(compiled.sql(), "1 = 1");
        assert!(compiled.params().is_empty());
    }

    #[test]
    fn qualifier_and_quoting_options() {
        let meta = user();
        let aliased = Translator::new(
            TranslatorConfig::default()
                .with_placeholder(PlaceholderStyle::Dollar)
                .with_qualifier(Qualifier::Alias("u0".into())),
        );
        assert_eq!(
            aliased.translate(&json!({ "$not": { "id": "1" } }), &meta).unwrap().sql(),
            r#"NOT ("u0"."id" = $1)"#
        );

        let bare = Translator::new(
            TranslatorConfig::default()
                .with_qualifier(Qualifier::None)
                .with_quoted_identifiers(false),
        );
        assert_eq!(
            bare.translate(&json!({ "name": { "$like": "B%" } }), &meta).unwrap().sql(),
            "name LIKE ?"
        );
    }

    #[test]
    fn uses_column_names() {
        let meta = EntityMetadata::builder("User", "users")
            .descriptor(crate::FieldDescriptor::primary("userId", FieldType::Integer).with_column("user_id"))
            .build()
            .unwrap();
        let compiled = dollar().translate(&json!({ "$not": { "userId": 7 } }), &meta).unwrap();
        assert_eq!(compiled.sql(), r#"NOT ("users"."user_id" = $1)"#);
    }

    #[test]
    fn named_placeholders_follow_appearance_order() {
        let t = Translator::new(TranslatorConfig::default().with_placeholder(PlaceholderStyle::Named));
        let compiled = t
            .translate(
                &json!({ "$or": [{ "name": "a" }, { "$not": { "age": { "$lte": 3 } } }] }),
                &user(),
            )
            .unwrap();
        assert_eq!(
            compiled.sql(),
            r#""user"."name" = :p1 OR NOT ("user"."age" <= :p2)"#
        );
        assert_eq!(
            compiled.params(),
            &[Value::from("a".to_string()), Value::from(3i64)]
        );
    }

    #[test]
    fn translate_for_resolves_registry() {
        let mut registry = MetadataRegistry::new();
        registry.register(user()).unwrap();
        let t = Translator::default();

        let compiled = t
            .translate_for("app::User", &json!({ "name": "Bar" }), &registry)
            .unwrap();
        assert_eq!(compiled.sql(), r#""user"."name" = ?"#);

        let err = t.translate_for("Post", &json!({}), &registry).unwrap_err();
        assert_eq!(err, FilterError::unknown_entity("Post"));
    }

    #[test]
    fn single_item_and_keeps_inner_or_grouped() {
        let compiled = dollar()
            .translate(
                &json!({ "$and": [{ "$or": [{ "id": "1" }, { "id": "2" }] }], "name": "zzz" }),
                &user(),
            )
            .unwrap();
        assert_eq!(
            compiled.sql(),
            r#"("user"."id" = $1 OR "user"."id" = $2) AND "user"."name" = $3"#
        );
    }

    #[test]
    fn hand_built_single_item_groups_are_parenthesized() {
        let eq = |column: &str, v: &str| Predicate::Compare {
            column: column.into(),
            op: crate::CompareOp::Eq,
            value: Value::from(v.to_string()),
        };
        let predicate = Predicate::And(vec![
            Predicate::And(vec![Predicate::Or(vec![eq("id", "1"), eq("id", "2")])]),
            eq("name", "zzz"),
        ]);
        assert_eq!(
            dollar().compile(&predicate, &user()).sql(),
            r#"("user"."id" = $1 OR "user"."id" = $2) AND "user"."name" = $3"#
        );
    }

    #[test]
    fn translator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Translator>();
        assert_send_sync::<EntityMetadata>();
        assert_send_sync::<CompiledPredicate>();
    }
}
