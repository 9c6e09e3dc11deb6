//! Serde model of a standard introspection query result (`{ __schema { ... } }`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IntrospectionQuery {
    #[serde(rename = "__schema")]
    pub schema: IntrospectionSchema,
}

/// Accepts both a bare `{"__schema": ...}` object and a full GraphQL
/// response envelope (`{"data": {"__schema": ...}}`).
#[derive(Deserialize)]
#[serde(untagged)]
enum IntrospectionEnvelope {
    Response { data: IntrospectionQuery },
    Bare(IntrospectionQuery),
}

impl IntrospectionQuery {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let envelope: IntrospectionEnvelope = serde_json::from_str(json)?;

        Ok(match envelope {
            IntrospectionEnvelope::Response { data } => data,
            IntrospectionEnvelope::Bare(query) => query,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionSchema {
    pub query_type: Option<IntrospectionNamedTypeRef>,
    #[serde(default)]
    pub mutation_type: Option<IntrospectionNamedTypeRef>,
    #[serde(default)]
    pub subscription_type: Option<IntrospectionNamedTypeRef>,
    pub types: Vec<IntrospectionType>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IntrospectionNamedTypeRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind")]
pub enum IntrospectionType {
    #[serde(rename = "SCALAR")]
    Scalar(IntrospectionScalarType),
    #[serde(rename = "OBJECT")]
    Object(IntrospectionObjectType),
    #[serde(rename = "INTERFACE")]
    Interface(IntrospectionObjectType),
    #[serde(rename = "UNION")]
    Union(IntrospectionUnionType),
    #[serde(rename = "ENUM")]
    Enum(IntrospectionEnumType),
    #[serde(rename = "INPUT_OBJECT")]
    InputObject(IntrospectionInputObjectType),
}

impl IntrospectionType {
    pub fn name(&self) -> &str {
        match self {
            IntrospectionType::Scalar(t) => &t.name,
            IntrospectionType::Object(t) | IntrospectionType::Interface(t) => &t.name,
            IntrospectionType::Union(t) => &t.name,
            IntrospectionType::Enum(t) => &t.name,
            IntrospectionType::InputObject(t) => &t.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IntrospectionScalarType {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IntrospectionObjectType {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<IntrospectionField>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionUnionType {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub possible_types: Vec<IntrospectionNamedTypeRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionEnumType {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enum_values: Vec<IntrospectionEnumValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionInputObjectType {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub input_fields: Vec<IntrospectionInputValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IntrospectionEnumValue {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IntrospectionField {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub args: Vec<IntrospectionInputValue>,
    #[serde(rename = "type")]
    pub type_ref: IntrospectionTypeRef,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionInputValue {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: IntrospectionTypeRef,
    #[serde(default)]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind")]
pub enum IntrospectionTypeRef {
    #[serde(rename = "LIST")]
    List {
        #[serde(rename = "ofType")]
        of_type: Box<IntrospectionTypeRef>,
    },
    #[serde(rename = "NON_NULL")]
    NonNull {
        #[serde(rename = "ofType")]
        of_type: Box<IntrospectionTypeRef>,
    },
    #[serde(rename = "SCALAR")]
    Scalar(IntrospectionNamedTypeRef),
    #[serde(rename = "OBJECT")]
    Object(IntrospectionNamedTypeRef),
    #[serde(rename = "INTERFACE")]
    Interface(IntrospectionNamedTypeRef),
    #[serde(rename = "UNION")]
    Union(IntrospectionNamedTypeRef),
    #[serde(rename = "ENUM")]
    Enum(IntrospectionNamedTypeRef),
    #[serde(rename = "INPUT_OBJECT")]
    InputObject(IntrospectionNamedTypeRef),
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wrapped_type_refs() {
        let json = r#"{
          "__schema": {
            "queryType": { "name": "query_root" },
            "mutationType": null,
            "subscriptionType": null,
            "types": [
              {
                "kind": "OBJECT",
                "name": "query_root",
                "description": null,
                "fields": [
                  {
                    "name": "users",
                    "args": [],
                    "type": {
                      "kind": "NON_NULL", "name": null,
                      "ofType": { "kind": "LIST", "name": null,
                        "ofType": { "kind": "OBJECT", "name": "users", "ofType": null } }
                    }
                  }
                ],
                "inputFields": null,
                "interfaces": [],
                "enumValues": null,
                "possibleTypes": null
              }
            ]
          }
        }"#;

        let query = IntrospectionQuery::from_json(json).unwrap();
        let IntrospectionType::Object(root) = &query.schema.types[0] else {
            panic!("expected an object type");
        };
        assert_eq!(root.fields[0].name, "users");
        assert!(matches!(
            root.fields[0].type_ref,
            IntrospectionTypeRef::NonNull { .. }
        ));
    }

    #[test]
    fn accepts_response_envelope() {
        let json = r#"{ "data": { "__schema": {
            "queryType": { "name": "Query" },
            "types": [ { "kind": "SCALAR", "name": "Date" } ]
        } } }"#;

        let query = IntrospectionQuery::from_json(json).unwrap();
        assert_eq!(query.schema.types[0].name(), "Date");
        assert!(query.schema.mutation_type.is_none());
    }

    #[test]
    fn rejects_garbage() {
        assert!(IntrospectionQuery::from_json(r#"{"nope": true}"#).is_err());
    }
}
