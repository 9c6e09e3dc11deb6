use tracing::instrument;

use super::{
    EnumType, FieldDefinition, InputObjectType, InputValueDefinition, ObjectType, RemoteSchema,
    ScalarType, SchemaError, TypeDefinition, TypeRef, UnionType,
};
use crate::introspection::{
    IntrospectionField, IntrospectionInputValue, IntrospectionQuery, IntrospectionType,
    IntrospectionTypeRef,
};

impl From<&IntrospectionTypeRef> for TypeRef {
    fn from(value: &IntrospectionTypeRef) -> Self {
        match value {
            IntrospectionTypeRef::List { of_type } => TypeRef::list(of_type.as_ref().into()),
            IntrospectionTypeRef::NonNull { of_type } => TypeRef::non_null(of_type.as_ref().into()),
            IntrospectionTypeRef::Scalar(named)
            | IntrospectionTypeRef::Object(named)
            | IntrospectionTypeRef::Interface(named)
            | IntrospectionTypeRef::Union(named)
            | IntrospectionTypeRef::Enum(named)
            | IntrospectionTypeRef::InputObject(named) => TypeRef::Named(named.name.clone()),
        }
    }
}

impl From<&IntrospectionInputValue> for InputValueDefinition {
    fn from(value: &IntrospectionInputValue) -> Self {
        InputValueDefinition {
            name: value.name.clone(),
            value_type: (&value.type_ref).into(),
            default_value: value.default_value.clone(),
        }
    }
}

impl From<&IntrospectionField> for FieldDefinition {
    fn from(field: &IntrospectionField) -> Self {
        FieldDefinition {
            name: field.name.clone(),
            field_type: (&field.type_ref).into(),
            arguments: field.args.iter().map(Into::into).collect(),
        }
    }
}

impl From<&IntrospectionType> for TypeDefinition {
    fn from(value: &IntrospectionType) -> Self {
        match value {
            IntrospectionType::Scalar(scalar) => TypeDefinition::Scalar(ScalarType {
                name: scalar.name.clone(),
            }),
            IntrospectionType::Object(object) => TypeDefinition::Object(ObjectType {
                name: object.name.clone(),
                fields: object.fields.iter().map(Into::into).collect(),
            }),
            IntrospectionType::Interface(interface) => TypeDefinition::Interface(ObjectType {
                name: interface.name.clone(),
                fields: interface.fields.iter().map(Into::into).collect(),
            }),
            IntrospectionType::Union(union) => TypeDefinition::Union(UnionType {
                name: union.name.clone(),
                members: union.possible_types.iter().map(|t| t.name.clone()).collect(),
            }),
            IntrospectionType::Enum(enum_type) => TypeDefinition::Enum(EnumType {
                name: enum_type.name.clone(),
                values: enum_type.enum_values.iter().map(|v| v.name.clone()).collect(),
            }),
            IntrospectionType::InputObject(input) => TypeDefinition::InputObject(InputObjectType {
                name: input.name.clone(),
                fields: input.input_fields.iter().map(Into::into).collect(),
            }),
        }
    }
}

impl RemoteSchema {
    #[instrument(level = "trace", skip(introspection), name = "remote_schema_from_introspection")]
    pub fn from_introspection(introspection: &IntrospectionQuery) -> Self {
        let schema = &introspection.schema;

        RemoteSchema::new(
            schema.types.iter().map(TypeDefinition::from),
            schema.query_type.as_ref().map(|t| t.name.clone()),
            schema.mutation_type.as_ref().map(|t| t.name.clone()),
            schema.subscription_type.as_ref().map(|t| t.name.clone()),
        )
    }

    /// Decodes an introspection JSON document (optionally wrapped in `data`).
    pub fn from_introspection_json(json: &str) -> Result<Self, SchemaError> {
        let introspection = IntrospectionQuery::from_json(json)?;

        Ok(Self::from_introspection(&introspection))
    }
}
