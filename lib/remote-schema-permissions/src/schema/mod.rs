mod from_introspection;
mod from_sdl;
pub mod type_ref;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use type_ref::TypeRef;

pub static BUILTIN_SCALARS: [&str; 5] = ["Boolean", "Float", "String", "Int", "ID"];

/// Root type names used by permission SDL documents.
pub const QUERY_ROOT: &str = "query_root";
pub const MUTATION_ROOT: &str = "mutation_root";
pub const SUBSCRIPTION_ROOT: &str = "subscription_root";

pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

/// Names starting with `__` belong to the introspection system.
pub fn is_introspection_type(name: &str) -> bool {
    name.starts_with("__")
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to parse schema SDL: {0}")]
    SdlParse(#[from] graphql_parser::schema::ParseError),
    #[error("failed to decode introspection result: {0}")]
    Introspection(#[from] serde_json::Error),
    #[error("root type '{0}' is not defined in the schema")]
    MissingRootType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootOperation {
    Query,
    Mutation,
}

impl RootOperation {
    /// The name this root carries in permission SDL.
    pub fn permission_root_name(&self) -> &'static str {
        match self {
            RootOperation::Query => QUERY_ROOT,
            RootOperation::Mutation => MUTATION_ROOT,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            RootOperation::Query => "query",
            RootOperation::Mutation => "mutation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputValueDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: TypeRef,
    #[serde(default)]
    pub arguments: Vec<InputValueDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectType {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

impl ObjectType {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputObjectType {
    pub name: String,
    pub fields: Vec<InputValueDefinition>,
}

impl InputObjectType {
    pub fn field(&self, name: &str) -> Option<&InputValueDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarType {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionType {
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeDefinition {
    Scalar(ScalarType),
    Object(ObjectType),
    Interface(ObjectType),
    Union(UnionType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Scalar(scalar) => &scalar.name,
            TypeDefinition::Object(object) | TypeDefinition::Interface(object) => &object.name,
            TypeDefinition::Union(union) => &union.name,
            TypeDefinition::Enum(enum_type) => &enum_type.name,
            TypeDefinition::InputObject(input) => &input.name,
        }
    }

    /// Names of the members an editor can toggle: fields, input fields or enum values.
    pub fn member_names(&self) -> Vec<&str> {
        match self {
            TypeDefinition::Object(object) | TypeDefinition::Interface(object) => {
                object.fields.iter().map(|f| f.name.as_str()).collect()
            }
            TypeDefinition::InputObject(input) => {
                input.fields.iter().map(|f| f.name.as_str()).collect()
            }
            TypeDefinition::Enum(enum_type) => {
                enum_type.values.iter().map(String::as_str).collect()
            }
            TypeDefinition::Scalar(_) | TypeDefinition::Union(_) => vec![],
        }
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.member_names().contains(&name)
    }
}

/// The type system of a remote GraphQL service, or of a saved permission
/// schema for one role. Type order is the order of the source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSchema {
    types: IndexMap<String, TypeDefinition>,
    query_type: Option<String>,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
}

impl RemoteSchema {
    pub fn new(
        types: impl IntoIterator<Item = TypeDefinition>,
        query_type: Option<String>,
        mutation_type: Option<String>,
        subscription_type: Option<String>,
    ) -> Self {
        Self {
            types: types
                .into_iter()
                .map(|def| (def.name().to_string(), def))
                .collect(),
            query_type,
            mutation_type,
            subscription_type,
        }
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub fn type_by_name(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn contains_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn input_object(&self, name: &str) -> Option<&InputObjectType> {
        match self.types.get(name) {
            Some(TypeDefinition::InputObject(input)) => Some(input),
            _ => None,
        }
    }

    pub fn is_enum(&self, name: &str) -> bool {
        matches!(self.types.get(name), Some(TypeDefinition::Enum(_)))
    }

    pub fn query_type_name(&self) -> Option<&str> {
        self.query_type.as_deref()
    }

    pub fn mutation_type_name(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn subscription_type_name(&self) -> Option<&str> {
        self.subscription_type.as_deref()
    }

    pub fn root_type_name(&self, operation: RootOperation) -> Option<&str> {
        match operation {
            RootOperation::Query => self.query_type_name(),
            RootOperation::Mutation => self.mutation_type_name(),
        }
    }

    /// The object type backing a root operation, if the schema declares one.
    pub fn root_type(&self, operation: RootOperation) -> Option<&ObjectType> {
        let name = self.root_type_name(operation)?;

        match self.types.get(name) {
            Some(TypeDefinition::Object(object)) => Some(object),
            _ => None,
        }
    }

    pub fn require_root_type(&self, operation: RootOperation) -> Result<&ObjectType, SchemaError> {
        self.root_type(operation).ok_or_else(|| {
            SchemaError::MissingRootType(
                self.root_type_name(operation)
                    .unwrap_or(operation.keyword())
                    .to_string(),
            )
        })
    }

    /// `true` for the declared roots and for the conventional
    /// `query_root` / `mutation_root` / `subscription_root` names.
    pub fn is_root_type(&self, name: &str) -> bool {
        [QUERY_ROOT, MUTATION_ROOT, SUBSCRIPTION_ROOT].contains(&name)
            || self.query_type_name() == Some(name)
            || self.mutation_type_name() == Some(name)
            || self.subscription_type_name() == Some(name)
    }
}
