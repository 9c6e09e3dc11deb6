use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::schema::{
    is_builtin_scalar, is_introspection_type, InputValueDefinition, RemoteSchema, RootOperation,
    TypeDefinition,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorKind {
    Type,
    Input,
    Enum,
    Scalar,
}

impl DescriptorKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            DescriptorKind::Type => "type",
            DescriptorKind::Input => "input",
            DescriptorKind::Enum => "enum",
            DescriptorKind::Scalar => "scalar",
        }
    }
}

impl Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One toggleable member: a field, an input field, an enum value, or the
/// single synthetic member standing for a whole scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub checked: bool,
    /// Rendered return type (`[users!]!`), for object and input fields.
    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// Argument definitions, only for root fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<IndexMap<String, InputValueDefinition>>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, checked: bool) -> Self {
        Self {
            name: name.into(),
            checked,
            return_type: None,
            args: None,
        }
    }
}

/// The editable row of one schema type. Serialized as
/// `{name, typeName, children}`, the kind travelling in the `name` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "TypeDescriptorRow", try_from = "TypeDescriptorRow")]
pub struct TypeDescriptor {
    pub kind: DescriptorKind,
    pub type_name: String,
    pub children: Vec<FieldDescriptor>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeDescriptorRow {
    name: String,
    type_name: String,
    children: Vec<FieldDescriptor>,
}

impl From<TypeDescriptor> for TypeDescriptorRow {
    fn from(descriptor: TypeDescriptor) -> Self {
        Self {
            name: descriptor.name(),
            type_name: descriptor.type_name,
            children: descriptor.children,
        }
    }
}

impl TryFrom<TypeDescriptorRow> for TypeDescriptor {
    type Error = String;

    fn try_from(row: TypeDescriptorRow) -> Result<Self, Self::Error> {
        let keyword = row.name.split_whitespace().next().unwrap_or_default();
        let kind = [
            DescriptorKind::Type,
            DescriptorKind::Input,
            DescriptorKind::Enum,
            DescriptorKind::Scalar,
        ]
        .into_iter()
        .find(|kind| kind.keyword() == keyword)
        .ok_or_else(|| format!("unknown type descriptor tag \"{}\"", row.name))?;

        Ok(TypeDescriptor::new(kind, row.type_name, row.children))
    }
}

impl TypeDescriptor {
    pub fn new(
        kind: DescriptorKind,
        type_name: impl Into<String>,
        children: Vec<FieldDescriptor>,
    ) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
            children,
        }
    }

    /// Rendering tag, e.g. `type users` or `enum order_by`.
    pub fn name(&self) -> String {
        format!("{} {}", self.kind, self.type_name)
    }

    pub fn child(&self, name: &str) -> Option<&FieldDescriptor> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn any_checked(&self) -> bool {
        self.children.iter().any(|child| child.checked)
    }

    /// Returns `false` when no member has that name.
    pub fn set_checked(&mut self, name: &str, checked: bool) -> bool {
        match self.children.iter_mut().find(|child| child.name == name) {
            Some(child) => {
                child.checked = checked;
                true
            }
            None => false,
        }
    }

    pub fn check_all(&mut self, checked: bool) {
        for child in &mut self.children {
            child.checked = checked;
        }
    }
}

/// Diffs an introspected schema against the saved permission schema of a
/// role (if any) to seed the editor.
pub struct SelectionTreeBuilder<'a> {
    introspected: &'a RemoteSchema,
    saved: Option<&'a RemoteSchema>,
}

impl<'a> SelectionTreeBuilder<'a> {
    pub fn new(introspected: &'a RemoteSchema, saved: Option<&'a RemoteSchema>) -> Self {
        Self {
            introspected,
            saved,
        }
    }

    /// Roots first, then object and input types, then enums, then scalars;
    /// each group in schema order.
    #[instrument(level = "trace", skip(self), name = "build_selection_tree")]
    pub fn build(&self) -> Vec<TypeDescriptor> {
        let mut roots = Vec::new();
        let mut composites = Vec::new();
        let mut enums = Vec::new();
        let mut scalars = Vec::new();

        for operation in [RootOperation::Query, RootOperation::Mutation] {
            if self.introspected.root_type(operation).is_some() {
                roots.push(TypeDescriptor::new(
                    DescriptorKind::Type,
                    operation.permission_root_name(),
                    self.root_fields(operation),
                ));
            }
        }

        for type_def in self.introspected.types() {
            let name = type_def.name();

            if self.introspected.is_root_type(name) || is_introspection_type(name) {
                continue;
            }

            match type_def {
                TypeDefinition::Object(object) => composites.push(self.composite_type(
                    DescriptorKind::Type,
                    name,
                    object
                        .fields
                        .iter()
                        .map(|f| (f.name.as_str(), f.field_type.to_string())),
                )),
                TypeDefinition::InputObject(input) => composites.push(self.composite_type(
                    DescriptorKind::Input,
                    name,
                    input
                        .fields
                        .iter()
                        .map(|f| (f.name.as_str(), f.value_type.to_string())),
                )),
                TypeDefinition::Enum(enum_type) => {
                    let checked = self.saved_defines(name);
                    enums.push(TypeDescriptor::new(
                        DescriptorKind::Enum,
                        name,
                        enum_type
                            .values
                            .iter()
                            .map(|value| FieldDescriptor::new(value, checked))
                            .collect(),
                    ));
                }
                TypeDefinition::Scalar(_) if is_builtin_scalar(name) => {}
                TypeDefinition::Scalar(_) => {
                    scalars.push(TypeDescriptor::new(
                        DescriptorKind::Scalar,
                        name,
                        vec![FieldDescriptor::new(name, self.saved_defines(name))],
                    ));
                }
                TypeDefinition::Interface(_) | TypeDefinition::Union(_) => {
                    debug!(type_name = name, "type kind is not editable, skipping");
                }
            }
        }

        roots
            .into_iter()
            .chain(composites)
            .chain(enums)
            .chain(scalars)
            .collect()
    }

    /// The fields of one root operation, each carrying its argument definitions.
    pub fn root_fields(&self, operation: RootOperation) -> Vec<FieldDescriptor> {
        let Some(root) = self.introspected.root_type(operation) else {
            return vec![];
        };
        let saved_root = self.saved.and_then(|saved| saved.root_type(operation));

        root.fields
            .iter()
            .map(|field| FieldDescriptor {
                name: field.name.clone(),
                checked: saved_root.is_some_and(|saved| saved.field(&field.name).is_some()),
                return_type: Some(field.field_type.to_string()),
                args: Some(
                    field
                        .arguments
                        .iter()
                        .map(|arg| (arg.name.clone(), arg.clone()))
                        .collect(),
                ),
            })
            .collect()
    }

    fn composite_type<'f>(
        &self,
        kind: DescriptorKind,
        name: &str,
        fields: impl Iterator<Item = (&'f str, String)>,
    ) -> TypeDescriptor {
        let saved_type = self.saved.and_then(|saved| saved.type_by_name(name));

        TypeDescriptor::new(
            kind,
            name,
            fields
                .map(|(field_name, return_type)| FieldDescriptor {
                    name: field_name.to_string(),
                    checked: saved_type.is_some_and(|saved| saved.has_member(field_name)),
                    return_type: Some(return_type),
                    args: None,
                })
                .collect(),
        )
    }

    fn saved_defines(&self, type_name: &str) -> bool {
        self.saved
            .is_some_and(|saved| saved.contains_type(type_name))
    }
}

pub fn build_selection_tree(
    introspected: &RemoteSchema,
    saved: Option<&RemoteSchema>,
) -> Vec<TypeDescriptor> {
    SelectionTreeBuilder::new(introspected, saved).build()
}
