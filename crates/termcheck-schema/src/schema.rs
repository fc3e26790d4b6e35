//! # Schemas
//!
//! A [`Schema`] maps field keys to [`Rule`]s and carries two level-scoped
//! directives:
//!
//! - **defaults**: values filled in for keys absent from the input at this
//!   level. Defaults are validated like any other input. A nested level
//!   whose input is empty gets none of them.
//! - **mandatory**: keys that must be present once defaults are applied,
//!   checked in declared order.
//!
//! Neither directive reaches into nested levels: a nested schema declares
//! its own.
//!
//! ## Key resolution
//!
//! [`Schema::rule_for`] treats symbolic and textual keys as
//! interchangeable, but never creates a symbol to do so. A textual key only
//! matches a symbolic field if that symbol already exists.
//!
//! ## Composition
//!
//! Schemas are immutable once built. Fragments authored in different places
//! combine with [`merge`]; [`add_defaults`] and [`add_mandatory`] are
//! shorthands for merging a fragment that carries only a directive.

use termcheck_core::{Key, Symbol, Term};

use crate::rule::Rule;

/// A declarative description of one level of input.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(Key, Rule)>,
    defaults: Vec<(Key, Term)>,
    mandatory: Option<Vec<Key>>,
}

impl Schema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rule for a symbolic field.
    pub fn field(self, name: &str, rule: impl Into<Rule>) -> Self {
        self.field_key(Key::sym(name), rule)
    }

    /// Add or replace the rule for a field under an explicit key.
    pub fn field_key(mut self, key: Key, rule: impl Into<Rule>) -> Self {
        self.fields.retain(|(k, _)| !k.same_name(&key));
        self.fields.push((key, rule.into()));
        self
    }

    /// Add or replace a default value.
    pub fn default_value(mut self, name: &str, value: Term) -> Self {
        let key = Key::sym(name);
        self.defaults.retain(|(k, _)| !k.same_name(&key));
        self.defaults.push((key, value));
        self
    }

    /// Declare mandatory fields, replacing any earlier declaration.
    pub fn mandatory<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.mandatory = Some(dedup_keys(names.into_iter().map(Key::sym)));
        self
    }

    /// The rule for `key`, tolerating either key representation.
    ///
    /// Returns `None` when no rule matches; this is "unknown key", not an
    /// error.
    pub fn rule_for(&self, key: &Key) -> Option<&Rule> {
        let lookup = |k: &Key| self.fields.iter().find(|(fk, _)| fk == k).map(|(_, r)| r);
        if let Some(rule) = lookup(key) {
            return Some(rule);
        }
        match key {
            Key::Sym(sym) => lookup(&Key::Text(sym.as_str().to_string())),
            Key::Text(text) => Symbol::existing(text).and_then(|sym| lookup(&Key::Sym(sym))),
        }
    }

    /// Field rules in declaration order.
    pub fn fields(&self) -> &[(Key, Rule)] {
        &self.fields
    }

    /// Default values in declaration order.
    pub fn defaults(&self) -> &[(Key, Term)] {
        &self.defaults
    }

    /// Mandatory keys in declaration order.
    pub fn mandatory_keys(&self) -> &[Key] {
        self.mandatory.as_deref().unwrap_or(&[])
    }
}

fn dedup_keys(keys: impl IntoIterator<Item = Key>) -> Vec<Key> {
    let mut out: Vec<Key> = Vec::new();
    for key in keys {
        if !out.iter().any(|k| k.same_name(&key)) {
            out.push(key);
        }
    }
    out
}

/// Deep-merge two schema fragments.
///
/// For a key present in both, if both sides are mappings (nested schemas,
/// or `Map` default values) they merge recursively; otherwise the value
/// from `update` replaces the one in `base`. Keys only in `base` keep their
/// position; new keys from `update` are appended.
///
/// The mandatory list is a plain value under this rule: a fragment that
/// declares one replaces the base's list.
pub fn merge(update: &Schema, base: &Schema) -> Schema {
    let mut fields = base.fields.clone();
    for (key, rule) in &update.fields {
        match fields.iter_mut().find(|(k, _)| k.same_name(key)) {
            Some((_, existing)) => {
                *existing = match (&*existing, rule) {
                    (Rule::Nested(b), Rule::Nested(u)) => Rule::Nested(merge(u, b)),
                    _ => rule.clone(),
                };
            }
            None => fields.push((key.clone(), rule.clone())),
        }
    }

    Schema {
        fields,
        defaults: merge_pairs(&update.defaults, &base.defaults),
        mandatory: update.mandatory.clone().or_else(|| base.mandatory.clone()),
    }
}

/// Deep-merge two terms: maps merge key by key, anything else is replaced.
pub fn merge_terms(update: &Term, base: &Term) -> Term {
    match (update, base) {
        (Term::Map(u), Term::Map(b)) => Term::Map(merge_pairs(u, b)),
        _ => update.clone(),
    }
}

fn merge_pairs(update: &[(Key, Term)], base: &[(Key, Term)]) -> Vec<(Key, Term)> {
    let mut out = base.to_vec();
    for (key, value) in update {
        match out.iter_mut().find(|(k, _)| k.same_name(key)) {
            Some((_, existing)) => *existing = merge_terms(value, existing),
            None => out.push((key.clone(), value.clone())),
        }
    }
    out
}

/// Merge `defaults` into the schema's defaults.
pub fn add_defaults(defaults: impl IntoIterator<Item = (Key, Term)>, schema: &Schema) -> Schema {
    let fragment = Schema {
        defaults: defaults.into_iter().collect(),
        ..Schema::default()
    };
    merge(&fragment, schema)
}

/// Set the schema's mandatory keys.
pub fn add_mandatory(keys: impl IntoIterator<Item = Key>, schema: &Schema) -> Schema {
    let fragment = Schema {
        mandatory: Some(dedup_keys(keys)),
        ..Schema::default()
    };
    merge(&fragment, schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::TypeTag;

    fn is_type(rule: Option<&Rule>, tag: TypeTag) -> bool {
        matches!(rule, Some(Rule::Type(t)) if *t == tag)
    }

    // ---- resolution ----

    #[test]
    fn test_symbolic_key_finds_textual_field() {
        let schema = Schema::new().field_key(Key::text("schema_text_field"), TypeTag::Integer);
        assert!(is_type(schema.rule_for(&Key::sym("schema_text_field")), TypeTag::Integer));
    }

    #[test]
    fn test_textual_key_finds_symbolic_field() {
        let schema = Schema::new().field("port", TypeTag::Port);
        assert!(is_type(schema.rule_for(&Key::text("port")), TypeTag::Port));
        assert!(is_type(schema.rule_for(&Key::sym("port")), TypeTag::Port));
    }

    #[test]
    fn test_unknown_text_key_does_not_create_symbol() {
        let schema = Schema::new().field("known", TypeTag::Any);
        assert!(schema.rule_for(&Key::text("schema_never_seen_key")).is_none());
        assert!(Symbol::existing("schema_never_seen_key").is_none());
    }

    #[test]
    fn test_field_replaces_same_name() {
        let schema = Schema::new()
            .field_key(Key::text("a"), TypeTag::Integer)
            .field("a", TypeTag::Binary);
        assert_eq!(schema.fields().len(), 1);
        assert!(is_type(schema.rule_for(&Key::text("a")), TypeTag::Binary));
    }

    // ---- merge ----

    #[test]
    fn test_merge_update_wins_for_plain_rules() {
        let base = Schema::new().field("a", TypeTag::Integer).field("b", TypeTag::Binary);
        let update = Schema::new().field("a", TypeTag::Float).field("c", TypeTag::Any);
        let merged = merge(&update, &base);
        let names: Vec<&str> = merged.fields().iter().map(|(k, _)| k.name()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(is_type(merged.rule_for(&Key::sym("a")), TypeTag::Float));
    }

    #[test]
    fn test_merge_recurses_into_nested_schemas() {
        let base = Schema::new().field(
            "db",
            Schema::new().field("host", TypeTag::Host).default_value("port", Term::Int(5432)),
        );
        let update = Schema::new().field("db", Schema::new().mandatory(["host"]));
        let merged = merge(&update, &base);
        match merged.rule_for(&Key::sym("db")) {
            Some(Rule::Nested(db)) => {
                assert!(is_type(db.rule_for(&Key::sym("host")), TypeTag::Host));
                assert_eq!(db.defaults(), &[(Key::sym("port"), Term::Int(5432))]);
                assert_eq!(db.mandatory_keys(), &[Key::sym("host")]);
            }
            other => panic!("expected nested rule, got {other:?}"),
        }
    }

    #[test]
    fn test_merge_nested_over_plain_replaces() {
        let base = Schema::new().field("db", TypeTag::Any);
        let update = Schema::new().field("db", Schema::new().field("host", TypeTag::Host));
        assert!(matches!(
            merge(&update, &base).rule_for(&Key::sym("db")),
            Some(Rule::Nested(_))
        ));
    }

    #[test]
    fn test_add_defaults_deep_merges_maps() {
        let base = Schema::new().default_value(
            "tls",
            Term::map([(Key::sym("verify"), Term::Bool(true)), (Key::sym("depth"), Term::Int(1))]),
        );
        let merged = add_defaults(
            [(Key::sym("tls"), Term::map([(Key::sym("depth"), Term::Int(3))]))],
            &base,
        );
        assert_eq!(
            merged.defaults(),
            &[(
                Key::sym("tls"),
                Term::map([(Key::sym("verify"), Term::Bool(true)), (Key::sym("depth"), Term::Int(3))])
            )]
        );
    }

    #[test]
    fn test_add_mandatory_replaces_list() {
        let base = Schema::new().mandatory(["a"]);
        let merged = add_mandatory([Key::sym("b"), Key::sym("b")], &base);
        assert_eq!(merged.mandatory_keys(), &[Key::sym("b")]);
    }

    #[test]
    fn test_merge_keeps_base_directives_when_update_has_none() {
        let base = Schema::new().mandatory(["a"]).default_value("a", Term::Int(1));
        let merged = merge(&Schema::new().field("z", TypeTag::Any), &base);
        assert_eq!(merged.mandatory_keys(), &[Key::sym("a")]);
        assert_eq!(merged.defaults().len(), 1);
    }
}
