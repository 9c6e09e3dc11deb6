use graphql_parser::query::Text;
use graphql_parser::schema::{self as input, Definition, Document};
use tracing::{debug, instrument};

use super::{
    EnumType, FieldDefinition, InputObjectType, InputValueDefinition, ObjectType, RemoteSchema,
    ScalarType, SchemaError, TypeDefinition, TypeRef, UnionType, MUTATION_ROOT, QUERY_ROOT,
    SUBSCRIPTION_ROOT,
};
use crate::utils::parsing::safe_parse_schema;

impl RemoteSchema {
    /// Parses SDL text (a remote schema, or a saved permission schema).
    pub fn from_sdl(sdl: &str) -> Result<Self, SchemaError> {
        let document = safe_parse_schema(sdl)?;

        Ok(Self::from_document(&document))
    }

    #[instrument(level = "trace", skip(document), name = "remote_schema_from_document")]
    pub fn from_document<'a, T: Text<'a>>(document: &Document<'a, T>) -> Self {
        let mut types = Vec::new();
        let mut schema_definition = None;

        for definition in &document.definitions {
            match definition {
                Definition::SchemaDefinition(schema) => schema_definition = Some(schema),
                Definition::TypeDefinition(type_def) => types.push(convert_type(type_def)),
                Definition::TypeExtension(_) => {
                    debug!("ignoring type extension in schema document");
                }
                Definition::DirectiveDefinition(_) => {}
            }
        }

        let has_type = |name: &str| types.iter().any(|t: &TypeDefinition| t.name() == name);
        let pick_root = |declared: Option<String>, defaults: [&str; 2]| {
            declared.or_else(|| {
                defaults
                    .into_iter()
                    .find(|name| has_type(name))
                    .map(str::to_string)
            })
        };

        let declared = |name: Option<&T::Value>| name.map(|name| name.as_ref().to_string());

        let query_type = pick_root(
            declared(schema_definition.and_then(|s| s.query.as_ref())),
            ["Query", QUERY_ROOT],
        );
        let mutation_type = pick_root(
            declared(schema_definition.and_then(|s| s.mutation.as_ref())),
            ["Mutation", MUTATION_ROOT],
        );
        let subscription_type = pick_root(
            declared(schema_definition.and_then(|s| s.subscription.as_ref())),
            ["Subscription", SUBSCRIPTION_ROOT],
        );

        RemoteSchema::new(types, query_type, mutation_type, subscription_type)
    }
}

fn convert_input_value<'a, T: Text<'a>>(value: &input::InputValue<'a, T>) -> InputValueDefinition {
    InputValueDefinition {
        name: value.name.as_ref().to_string(),
        value_type: TypeRef::from(&value.value_type),
        default_value: value.default_value.as_ref().map(|v| v.to_string()),
    }
}

fn convert_field<'a, T: Text<'a>>(field: &input::Field<'a, T>) -> FieldDefinition {
    FieldDefinition {
        name: field.name.as_ref().to_string(),
        field_type: TypeRef::from(&field.field_type),
        arguments: field.arguments.iter().map(convert_input_value).collect(),
    }
}

fn convert_type<'a, T: Text<'a>>(type_def: &input::TypeDefinition<'a, T>) -> TypeDefinition {
    match type_def {
        input::TypeDefinition::Scalar(scalar) => TypeDefinition::Scalar(ScalarType {
            name: scalar.name.as_ref().to_string(),
        }),
        input::TypeDefinition::Object(object) => TypeDefinition::Object(ObjectType {
            name: object.name.as_ref().to_string(),
            fields: object.fields.iter().map(convert_field).collect(),
        }),
        input::TypeDefinition::Interface(interface) => TypeDefinition::Interface(ObjectType {
            name: interface.name.as_ref().to_string(),
            fields: interface.fields.iter().map(convert_field).collect(),
        }),
        input::TypeDefinition::Union(union) => TypeDefinition::Union(UnionType {
            name: union.name.as_ref().to_string(),
            members: union.types.iter().map(|t| t.as_ref().to_string()).collect(),
        }),
        input::TypeDefinition::Enum(enum_type) => TypeDefinition::Enum(EnumType {
            name: enum_type.name.as_ref().to_string(),
            values: enum_type
                .values
                .iter()
                .map(|v| v.name.as_ref().to_string())
                .collect(),
        }),
        input::TypeDefinition::InputObject(input) => TypeDefinition::InputObject(InputObjectType {
            name: input.name.as_ref().to_string(),
            fields: input.fields.iter().map(convert_input_value).collect(),
        }),
    }
}
