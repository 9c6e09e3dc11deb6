use std::collections::BTreeMap;

use graphql_parser::query::Text;
use graphql_parser::schema::{Directive, Value};
use serde_json::Number;

use super::PresetValue;

/// Declarations a strict SDL validator needs before it accepts `@preset`.
pub const PRESET_PRELUDE: &str = r#"scalar PresetValue

directive @preset(
  value: PresetValue
) on INPUT_FIELD_DEFINITION | ARGUMENT_DEFINITION
"#;

pub fn with_preset_prelude(sdl: &str) -> String {
    format!("{}\n{}", PRESET_PRELUDE, sdl)
}

// directive @preset(value: PresetValue) on INPUT_FIELD_DEFINITION | ARGUMENT_DEFINITION
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PresetDirective {
    pub value: Option<PresetValue>,
}

impl PresetDirective {
    pub const NAME: &str = "preset";
    pub const VALUE_ARGUMENT: &str = "value";

    pub fn is<'a, T: Text<'a>>(directive: &Directive<'a, T>) -> bool {
        directive.name.as_ref() == Self::NAME
    }

    pub fn find<'a, 'd, T: Text<'a>>(
        directives: &'d [Directive<'a, T>],
    ) -> Option<&'d Directive<'a, T>> {
        directives.iter().find(|d| Self::is(*d))
    }
}

impl<'a, T: Text<'a>> From<&Directive<'a, T>> for PresetDirective {
    /// Reads the first argument (conventionally `value`). A string that holds
    /// a JSON object is decoded as JSON.
    fn from(directive: &Directive<'a, T>) -> Self {
        let value = directive
            .arguments
            .first()
            .and_then(|(_, value)| preset_value_from_ast(value))
            .map(decode_json_string);

        Self { value }
    }
}

/// Converts a GraphQL constant into a preset value. `null` (and anything
/// that is not a constant) yields `None`.
pub fn preset_value_from_ast<'a, T: Text<'a>>(value: &Value<'a, T>) -> Option<PresetValue> {
    match value {
        Value::Int(number) => number.as_i64().map(PresetValue::int),
        Value::Float(float) => Number::from_f64(*float).map(PresetValue::Number),
        Value::String(string) => Some(PresetValue::String(string.clone())),
        Value::Boolean(boolean) => Some(PresetValue::Boolean(*boolean)),
        Value::Enum(name) => Some(PresetValue::String(name.as_ref().to_string())),
        Value::Null | Value::Variable(_) => None,
        Value::List(items) => {
            let items: Vec<_> = items.iter().filter_map(preset_value_from_ast).collect();

            (!items.is_empty()).then_some(PresetValue::List(items))
        }
        Value::Object(fields) => {
            let fields: BTreeMap<_, _> = fields
                .iter()
                .filter_map(|(key, value)| {
                    preset_value_from_ast(value).map(|v| (key.as_ref().to_string(), v))
                })
                .collect();

            (!fields.is_empty()).then_some(PresetValue::Object(fields))
        }
    }
}

/// List-looking strings stay text: on a list argument the serializer reads
/// them as list syntax, elsewhere they are plain strings.
fn decode_json_string(value: PresetValue) -> PresetValue {
    if let PresetValue::String(text) = &value {
        if looks_like_json_object(text) {
            if let Ok(decoded @ PresetValue::Object(_)) = serde_json::from_str::<PresetValue>(text)
            {
                return decoded;
            }
        }
    }

    value
}

fn looks_like_json_object(text: &str) -> bool {
    let text = text.trim();

    text.starts_with('{') && text.ends_with('}')
}

#[cfg(test)]
mod tests {
    use graphql_parser::schema::{Definition, TypeDefinition};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::utils::parsing::safe_parse_schema;

    fn first_argument_directive(sdl: &str) -> PresetDirective {
        let doc = safe_parse_schema(sdl).unwrap();
        let Some(Definition::TypeDefinition(TypeDefinition::Object(obj))) =
            doc.definitions.first()
        else {
            panic!("expected an object type");
        };
        let directive = PresetDirective::find(&obj.fields[0].arguments[0].directives)
            .expect("missing @preset");

        PresetDirective::from(directive)
    }

    #[test]
    fn reads_scalars() {
        let directive =
            first_argument_directive("type query_root { f(a: Int @preset(value: 10)): Int }");
        assert_eq!(directive.value, Some(PresetValue::int(10)));

        let directive = first_argument_directive(
            r#"type query_root { f(a: String @preset(value: "x-hasura-user-id")): Int }"#,
        );
        assert_eq!(directive.value, Some(PresetValue::string("x-hasura-user-id")));

        let directive =
            first_argument_directive("type query_root { f(a: Role @preset(value: ADMIN)): Int }");
        assert_eq!(directive.value, Some(PresetValue::string("ADMIN")));
    }

    #[test]
    fn reads_nested_objects_and_lists() {
        let directive = first_argument_directive(
            r#"type query_root { f(where: W @preset(value: {id: {_in: [1, 2]}, name: null})): Int }"#,
        );

        assert_eq!(
            directive.value,
            Some(PresetValue::object([(
                "id",
                PresetValue::object([(
                    "_in",
                    PresetValue::List(vec![PresetValue::int(1), PresetValue::int(2)])
                )])
            )]))
        );
    }

    #[test]
    fn decodes_json_encoded_strings() {
        let directive = first_argument_directive(
            r#"type query_root { f(where: W @preset(value: "{\"id\": {\"_eq\": 1}}")): Int }"#,
        );

        assert_eq!(
            directive.value,
            Some(PresetValue::object([(
                "id",
                PresetValue::object([("_eq", PresetValue::int(1))])
            )]))
        );
    }

    #[test]
    fn keeps_plain_strings_that_are_not_json() {
        let directive = first_argument_directive(
            r#"type query_root { f(a: String @preset(value: "{not json}")): Int }"#,
        );
        assert_eq!(directive.value, Some(PresetValue::string("{not json}")));

        let directive =
            first_argument_directive(r#"type query_root { f(a: String @preset(value: "123")): Int }"#);
        assert_eq!(directive.value, Some(PresetValue::string("123")));

        let directive = first_argument_directive(
            r#"type query_root { f(a: String @preset(value: "[1, 2]")): Int }"#,
        );
        assert_eq!(directive.value, Some(PresetValue::string("[1, 2]")));
    }

    #[test]
    fn null_is_absent() {
        let directive =
            first_argument_directive("type query_root { f(a: Int @preset(value: null)): Int }");
        assert_eq!(directive.value, None);
    }

    #[test]
    fn prelude_parses() {
        let sdl = with_preset_prelude("type query_root { a: Int }");
        assert!(safe_parse_schema(&sdl).is_ok());
        assert!(sdl.starts_with("scalar PresetValue"));
    }
}
