use std::collections::BTreeMap;

use graphql_parser::schema::{Definition, TypeDefinition, Value};
use serde_json::Number;
use tracing::{debug, trace};

use super::{DropReason, DroppedPreset};
use crate::preset::directive::{preset_value_from_ast, PresetDirective};
use crate::preset::PresetValue;
use crate::schema::{InputObjectType, InputValueDefinition, RemoteSchema, TypeRef};
use crate::utils::parsing::safe_parse_schema;

/// How the input object behind an argument was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildPath {
    /// The argument is typed directly with the input object.
    Fields,
    /// The input object sits under non-null / list wrappers.
    OfType,
}

/// The fields of the input object an argument (or input field) accepts.
#[derive(Debug, Clone, Copy)]
pub struct ChildArguments<'a> {
    pub children: &'a [InputValueDefinition],
    pub children_type: &'a InputObjectType,
    pub path: ChildPath,
}

/// Descends through non-null / list wrappers to the input object's fields.
/// Scalars and enums have no children.
pub fn child_arguments<'a>(
    schema: &'a RemoteSchema,
    value_type: &TypeRef,
) -> Option<ChildArguments<'a>> {
    match value_type {
        TypeRef::Named(name) => schema.input_object(name).map(|input| ChildArguments {
            children: &input.fields,
            children_type: input,
            path: ChildPath::Fields,
        }),
        TypeRef::NonNull(inner) | TypeRef::List(inner) => {
            child_arguments(schema, inner).map(|children| ChildArguments {
                path: ChildPath::OfType,
                ..children
            })
        }
    }
}

/// Renders one argument preset as an SDL literal. `None` means the preset
/// must be omitted.
pub fn serialize_preset(
    schema: &RemoteSchema,
    value: &PresetValue,
    argument: &InputValueDefinition,
) -> Option<String> {
    PresetSerializer::new(schema).serialize_argument(&argument.name, value, argument)
}

pub(crate) struct PresetSerializer<'a> {
    schema: &'a RemoteSchema,
    dropped: Vec<DroppedPreset>,
}

impl<'a> PresetSerializer<'a> {
    pub fn new(schema: &'a RemoteSchema) -> Self {
        Self {
            schema,
            dropped: Vec::new(),
        }
    }

    pub fn into_dropped(self) -> Vec<DroppedPreset> {
        self.dropped
    }

    pub fn serialize_argument(
        &mut self,
        path: &str,
        value: &PresetValue,
        argument: &InputValueDefinition,
    ) -> Option<String> {
        self.serialize_value(path, value, &argument.value_type)
    }

    fn serialize_value(
        &mut self,
        path: &str,
        value: &PresetValue,
        value_type: &TypeRef,
    ) -> Option<String> {
        if value.is_empty() {
            self.drop(path, DropReason::EmptyValue);
            return None;
        }

        match value {
            PresetValue::Object(entries) => self.serialize_object(path, entries, value_type),
            PresetValue::List(items) => self.serialize_list(path, items, value_type),
            PresetValue::Number(number) => self.serialize_number(path, number),
            PresetValue::String(text) if value_type.is_list() && is_array_literal(text) => {
                self.serialize_list_text(path, text, value_type)
            }
            leaf => Some(self.serialize_leaf(leaf, value_type)),
        }
    }

    fn serialize_object(
        &mut self,
        path: &str,
        entries: &BTreeMap<String, PresetValue>,
        value_type: &TypeRef,
    ) -> Option<String> {
        let Some(ChildArguments {
            children,
            children_type,
            path: reached_through,
        }) = child_arguments(self.schema, value_type)
        else {
            self.drop(path, DropReason::NotAnInputObject);
            return None;
        };

        trace!(
            path,
            input = %children_type.name,
            fields = children.len(),
            via = ?reached_through,
            "serializing nested preset"
        );

        let mut rendered = Vec::with_capacity(entries.len());

        for (key, value) in entries {
            let child_path = format!("{}.{}", path, key);

            let Some(child) = children_type.field(key) else {
                self.drop(&child_path, DropReason::UnknownInputField);
                continue;
            };

            if let Some(serialized) = self.serialize_value(&child_path, value, &child.value_type)
            {
                rendered.push(format!("{}: {}", key, serialized));
            }
        }

        if rendered.is_empty() {
            return None;
        }

        Some(format!("{{{}}}", rendered.join(", ")))
    }

    fn serialize_list(
        &mut self,
        path: &str,
        items: &[PresetValue],
        value_type: &TypeRef,
    ) -> Option<String> {
        let Some(item_type) = value_type.list_item() else {
            self.drop(path, DropReason::NotAList);
            return None;
        };

        let rendered: Vec<String> = items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                self.serialize_value(&format!("{}[{}]", path, index), item, item_type)
            })
            .collect();

        if rendered.is_empty() {
            return None;
        }

        Some(format!("[{}]", rendered.join(", ")))
    }

    /// GraphQL integers are signed 64-bit here; anything wider has no literal
    /// the parser would read back.
    fn serialize_number(&mut self, path: &str, number: &Number) -> Option<String> {
        if number.is_i64() || number.is_f64() {
            return Some(number.to_string());
        }

        self.drop(path, DropReason::NumberOutOfRange);
        None
    }

    /// List syntax typed as text is re-rendered item by item, so malformed
    /// text never reaches the SDL.
    fn serialize_list_text(
        &mut self,
        path: &str,
        text: &str,
        value_type: &TypeRef,
    ) -> Option<String> {
        match parse_list_literal(text) {
            Some(items) if items.is_empty() => {
                self.drop(path, DropReason::EmptyValue);
                None
            }
            Some(items) => self.serialize_list(path, &items, value_type),
            None => {
                self.drop(path, DropReason::MalformedListLiteral);
                None
            }
        }
    }

    fn serialize_leaf(&self, value: &PresetValue, value_type: &TypeRef) -> String {
        match value {
            PresetValue::String(text)
                if !value.is_session_variable()
                    && self.schema.is_enum(value_type.named_type())
                    && is_enum_literal(text) =>
            {
                text.clone()
            }
            PresetValue::Number(number) => number.to_string(),
            PresetValue::Boolean(boolean) => boolean.to_string(),
            PresetValue::String(text) => quote_string(text),
            PresetValue::List(_) | PresetValue::Object(_) => String::new(),
        }
    }

    fn drop(&mut self, path: &str, reason: DropReason) {
        debug!(path, ?reason, "dropping preset");
        self.dropped.push(DroppedPreset {
            path: path.to_string(),
            reason,
        });
    }
}

/// A name that can stand unquoted as an enum value.
fn is_enum_literal(text: &str) -> bool {
    let mut chars = text.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic());

    starts_well
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        && !matches!(text, "true" | "false" | "null")
}

/// Text the editor already wrote in list syntax, e.g. `[1, 2]`.
fn is_array_literal(text: &str) -> bool {
    let text = text.trim();

    text.len() >= 2 && text.starts_with('[') && text.ends_with(']')
}

/// Reads list syntax as a GraphQL constant list, falling back to JSON
/// (`[{"id": 1}]`). `None` when neither accepts it.
fn parse_list_literal(text: &str) -> Option<Vec<PresetValue>> {
    parse_graphql_list(text).or_else(|| match serde_json::from_str::<PresetValue>(text) {
        Ok(PresetValue::List(items)) => Some(items),
        _ => None,
    })
}

fn parse_graphql_list(text: &str) -> Option<Vec<PresetValue>> {
    let stub = format!(
        "type stub {{ f(a: [Int] @{}({}: {})): Int }}",
        PresetDirective::NAME,
        PresetDirective::VALUE_ARGUMENT,
        text
    );
    let document = safe_parse_schema(&stub).ok()?;

    // Text that closes the stub early parses into more than one member.
    let [Definition::TypeDefinition(TypeDefinition::Object(object))] =
        document.definitions.as_slice()
    else {
        return None;
    };
    let [field] = object.fields.as_slice() else {
        return None;
    };
    let [argument] = field.arguments.as_slice() else {
        return None;
    };
    let [directive] = argument.directives.as_slice() else {
        return None;
    };
    let [(_, value @ Value::List(_))] = directive.arguments.as_slice() else {
        return None;
    };

    match preset_value_from_ast(value) {
        Some(PresetValue::List(items)) => Some(items),
        _ => Some(Vec::new()),
    }
}

fn quote_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');

    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04X}", c as u32)),
            c => quoted.push(c),
        }
    }

    quoted.push('"');
    quoted
}
