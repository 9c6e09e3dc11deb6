pub mod directive;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::schema::TypeRef;

/// Values beginning with this prefix reference a session variable that the
/// server substitutes at request time.
pub const SESSION_VARIABLE_PREFIX: &str = "x-hasura";

/// A value pinned onto an argument (or a nested input field) of a root field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PresetValue {
    Boolean(bool),
    Number(Number),
    String(String),
    List(Vec<PresetValue>),
    Object(BTreeMap<String, PresetValue>),
}

impl PresetValue {
    pub fn string(value: impl Into<String>) -> Self {
        PresetValue::String(value.into())
    }

    pub fn int(value: i64) -> Self {
        PresetValue::Number(value.into())
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, PresetValue)>) -> Self {
        PresetValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_session_variable(&self) -> bool {
        match self {
            PresetValue::String(value) => is_session_variable(value),
            _ => false,
        }
    }

    /// Empty strings, lists and objects carry no preset.
    pub fn is_empty(&self) -> bool {
        match self {
            PresetValue::String(value) => value.trim().is_empty(),
            PresetValue::List(items) => items.is_empty(),
            PresetValue::Object(entries) => entries.is_empty(),
            PresetValue::Boolean(_) | PresetValue::Number(_) => false,
        }
    }

    /// Turns raw editor input into a preset value. Numeric text typed into an
    /// `Int` or `Float` argument becomes a number; everything else stays text.
    pub fn coerce_input(text: &str, target: &TypeRef) -> Self {
        let trimmed = text.trim();

        match target.named_type() {
            "Int" => trimmed
                .parse::<i64>()
                .map(PresetValue::int)
                .unwrap_or_else(|_| PresetValue::string(text)),
            "Float" => trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(PresetValue::Number)
                .unwrap_or_else(|| PresetValue::string(text)),
            _ => PresetValue::string(text),
        }
    }
}

impl From<&str> for PresetValue {
    fn from(value: &str) -> Self {
        PresetValue::string(value)
    }
}

impl From<i64> for PresetValue {
    fn from(value: i64) -> Self {
        PresetValue::int(value)
    }
}

impl From<bool> for PresetValue {
    fn from(value: bool) -> Self {
        PresetValue::Boolean(value)
    }
}

pub fn is_session_variable(value: &str) -> bool {
    value
        .get(..SESSION_VARIABLE_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(SESSION_VARIABLE_PREFIX))
}

pub type FieldPresets = BTreeMap<String, PresetValue>;

/// Presets of every root field: `field name -> argument name -> value`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgTree(BTreeMap<String, FieldPresets>);

impl ArgTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn field(&self, field: &str) -> Option<&FieldPresets> {
        self.0.get(field)
    }

    pub fn get(&self, field: &str, argument: &str) -> Option<&PresetValue> {
        self.0.get(field).and_then(|args| args.get(argument))
    }

    pub fn set(
        &mut self,
        field: impl Into<String>,
        argument: impl Into<String>,
        value: PresetValue,
    ) -> Option<PresetValue> {
        self.0
            .entry(field.into())
            .or_default()
            .insert(argument.into(), value)
    }

    /// Removes one preset. A field left without presets is removed too.
    pub fn remove(&mut self, field: &str, argument: &str) -> Option<PresetValue> {
        let args = self.0.get_mut(field)?;
        let removed = args.remove(argument);

        if args.is_empty() {
            self.0.remove(field);
        }

        removed
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldPresets)> {
        self.0.iter()
    }
}

impl FromIterator<(String, FieldPresets)> for ArgTree {
    fn from_iter<I: IntoIterator<Item = (String, FieldPresets)>>(iter: I) -> Self {
        ArgTree(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn session_variables() {
        assert!(is_session_variable("x-hasura-user-id"));
        assert!(is_session_variable("X-Hasura-Role"));
        assert!(!is_session_variable("x-has"));
        assert!(!is_session_variable("user-id"));
        assert!(PresetValue::string("x-hasura-org").is_session_variable());
        assert!(!PresetValue::int(1).is_session_variable());
    }

    #[test]
    fn emptiness() {
        assert!(PresetValue::string("  ").is_empty());
        assert!(PresetValue::List(vec![]).is_empty());
        assert!(PresetValue::object(Vec::<(String, PresetValue)>::new()).is_empty());
        assert!(!PresetValue::int(0).is_empty());
        assert!(!PresetValue::Boolean(false).is_empty());
    }

    #[test]
    fn coerces_numeric_input_for_numeric_arguments() {
        let int = TypeRef::non_null(TypeRef::named("Int"));
        assert_eq!(PresetValue::coerce_input("42", &int), PresetValue::int(42));
        assert_eq!(
            PresetValue::coerce_input("x-hasura-user-id", &int),
            PresetValue::string("x-hasura-user-id")
        );
        let float = TypeRef::named("Float");
        assert_eq!(
            PresetValue::coerce_input("2.5", &float),
            PresetValue::Number(Number::from_f64(2.5).unwrap())
        );
        let string = TypeRef::named("String");
        assert_eq!(PresetValue::coerce_input("42", &string), PresetValue::string("42"));
    }

    #[test]
    fn json_shape_is_a_plain_key_value_tree() {
        let tree: ArgTree = serde_json::from_str(
            r#"{ "users": { "limit": 10, "where": { "id": { "_eq": "x-hasura-user-id" } } } }"#,
        )
        .unwrap();

        assert_eq!(tree.get("users", "limit"), Some(&PresetValue::int(10)));
        assert_eq!(
            tree.get("users", "where"),
            Some(&PresetValue::object([(
                "id",
                PresetValue::object([("_eq", PresetValue::string("x-hasura-user-id"))])
            )]))
        );
        assert_eq!(
            serde_json::to_string(&tree).unwrap(),
            r#"{"users":{"limit":10,"where":{"id":{"_eq":"x-hasura-user-id"}}}}"#
        );
    }

    #[test]
    fn editing() {
        let mut tree = ArgTree::new();
        tree.set("users", "limit", PresetValue::int(5));
        tree.set("users", "offset", PresetValue::int(0));
        assert_eq!(tree.len(), 1);

        assert_eq!(tree.remove("users", "limit"), Some(PresetValue::int(5)));
        assert!(!tree.is_empty());
        tree.remove("users", "offset");
        assert!(tree.is_empty());
        assert_eq!(tree.remove("users", "offset"), None);
    }
}
