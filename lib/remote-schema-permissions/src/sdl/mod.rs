pub mod parse;
pub mod serialize;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::preset::directive::PresetDirective;
use crate::preset::ArgTree;
use crate::schema::{
    is_builtin_scalar, is_introspection_type, RemoteSchema, RootOperation, TypeDefinition,
    MUTATION_ROOT, QUERY_ROOT,
};
use crate::selection_tree::{DescriptorKind, FieldDescriptor, TypeDescriptor};
use serialize::PresetSerializer;

/// Why a preset from the tree did not make it into the SDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// No root field with this name exists in the schema.
    UnknownField,
    /// The root field exists but has no such argument.
    UnknownArgument,
    /// A nested key names no field of the input object.
    UnknownInputField,
    /// An object value was given for an argument that is not an input object.
    NotAnInputObject,
    /// A list value was given for an argument that is not a list.
    NotAList,
    /// List syntax typed as text that is neither a GraphQL nor a JSON list.
    MalformedListLiteral,
    /// An integer outside the signed 64-bit range.
    NumberOutOfRange,
    /// Blank text, or an empty list or object.
    EmptyValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedPreset {
    /// `field.argument[.nested...]`
    pub path: String,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SynthesizedSdl {
    /// Empty when the role has no permission at all.
    pub sdl: String,
    pub dropped_presets: Vec<DroppedPreset>,
}

impl SynthesizedSdl {
    pub fn is_empty(&self) -> bool {
        self.sdl.is_empty()
    }
}

/// Renders a role's selection tree and presets as permission SDL.
pub struct SdlSynthesizer<'a> {
    schema: &'a RemoteSchema,
}

impl<'a> SdlSynthesizer<'a> {
    pub fn new(schema: &'a RemoteSchema) -> Self {
        Self { schema }
    }

    #[instrument(level = "trace", skip_all, name = "synthesize_permission_sdl")]
    pub fn synthesize(&self, descriptors: &[TypeDescriptor], arg_tree: &ArgTree) -> SynthesizedSdl {
        let mut serializer = PresetSerializer::new(self.schema);
        let mut blocks = Vec::new();
        let mut query_body = false;
        let mut mutation_body = false;

        for descriptor in descriptors {
            let Some(block) = self.sdl_block(descriptor, arg_tree, &mut serializer) else {
                continue;
            };

            if descriptor.kind == DescriptorKind::Type {
                match descriptor.type_name.as_str() {
                    QUERY_ROOT => query_body = true,
                    MUTATION_ROOT => mutation_body = true,
                    _ => {}
                }
            }

            blocks.push(block);
        }

        let mut dropped_presets = stale_presets(descriptors, arg_tree);
        dropped_presets.extend(serializer.into_dropped());

        if blocks.is_empty() {
            return SynthesizedSdl {
                sdl: String::new(),
                dropped_presets,
            };
        }

        let header: Vec<String> = [
            (RootOperation::Query, query_body),
            (RootOperation::Mutation, mutation_body),
        ]
        .into_iter()
        .filter(|(_, has_body)| *has_body)
        .map(|(operation, _)| {
            format!(
                "  {}: {}",
                operation.keyword(),
                operation.permission_root_name()
            )
        })
        .collect();

        if !header.is_empty() {
            blocks.insert(0, format!("schema {{\n{}\n}}", header.join("\n")));
        }

        debug!(
            blocks = blocks.len(),
            dropped = dropped_presets.len(),
            "permission sdl synthesized"
        );

        SynthesizedSdl {
            sdl: format!("{}\n", blocks.join("\n\n")),
            dropped_presets,
        }
    }

    /// The SDL of one descriptor, or `None` when nothing in it is checked.
    pub fn get_sdl_field(&self, descriptor: &TypeDescriptor, arg_tree: &ArgTree) -> Option<String> {
        self.sdl_block(descriptor, arg_tree, &mut PresetSerializer::new(self.schema))
    }

    fn sdl_block(
        &self,
        descriptor: &TypeDescriptor,
        arg_tree: &ArgTree,
        serializer: &mut PresetSerializer,
    ) -> Option<String> {
        if !descriptor.any_checked() {
            return None;
        }

        let checked = descriptor.children.iter().filter(|child| child.checked);

        let lines: Vec<String> = match descriptor.kind {
            DescriptorKind::Scalar if is_builtin_scalar(&descriptor.type_name) => return None,
            DescriptorKind::Scalar => return Some(format!("scalar {}", descriptor.type_name)),
            DescriptorKind::Enum => checked.map(|value| value.name.clone()).collect(),
            DescriptorKind::Type | DescriptorKind::Input => checked
                .filter_map(|field| self.field_line(field, arg_tree, serializer))
                .collect(),
        };

        if lines.is_empty() {
            return None;
        }

        Some(format!(
            "{} {{\n{}\n}}",
            descriptor.name(),
            lines
                .iter()
                .map(|line| format!("  {}", line))
                .collect::<Vec<_>>()
                .join("\n")
        ))
    }

    fn field_line(
        &self,
        field: &FieldDescriptor,
        arg_tree: &ArgTree,
        serializer: &mut PresetSerializer,
    ) -> Option<String> {
        let Some(return_type) = field.return_type.as_deref() else {
            debug!(field = %field.name, "field has no return type, skipping");
            return None;
        };

        let arguments = match &field.args {
            Some(args) if !args.is_empty() => args,
            _ => return Some(format!("{}: {}", field.name, return_type)),
        };

        let presets = arg_tree.field(&field.name);
        let rendered: Vec<String> = arguments
            .values()
            .map(|argument| {
                let preset = presets
                    .and_then(|presets| presets.get(&argument.name))
                    .and_then(|value| {
                        serializer.serialize_argument(
                            &format!("{}.{}", field.name, argument.name),
                            value,
                            argument,
                        )
                    });

                match preset {
                    Some(value) => format!(
                        "{}: {} @{}({}: {})",
                        argument.name,
                        argument.value_type,
                        PresetDirective::NAME,
                        PresetDirective::VALUE_ARGUMENT,
                        value
                    ),
                    None => format!("{}: {}", argument.name, argument.value_type),
                }
            })
            .collect();

        Some(format!(
            "{}({}): {}",
            field.name,
            rendered.join(", "),
            return_type
        ))
    }
}

/// Presets whose field or argument is not part of any root descriptor.
fn stale_presets(descriptors: &[TypeDescriptor], arg_tree: &ArgTree) -> Vec<DroppedPreset> {
    let root_fields: Vec<&FieldDescriptor> = descriptors
        .iter()
        .filter(|d| {
            d.kind == DescriptorKind::Type
                && matches!(d.type_name.as_str(), QUERY_ROOT | MUTATION_ROOT)
        })
        .flat_map(|d| d.children.iter())
        .collect();

    let mut dropped = Vec::new();

    for (field_name, presets) in arg_tree.fields() {
        let matching: Vec<_> = root_fields
            .iter()
            .filter(|f| &f.name == field_name)
            .collect();

        if matching.is_empty() {
            debug!(field = %field_name, "preset targets an unknown field");
            dropped.push(DroppedPreset {
                path: field_name.clone(),
                reason: DropReason::UnknownField,
            });
            continue;
        }

        for argument_name in presets.keys() {
            let known = matching.iter().any(|f| {
                f.args
                    .as_ref()
                    .is_some_and(|args| args.contains_key(argument_name))
            });

            if !known {
                debug!(
                    field = %field_name,
                    argument = %argument_name,
                    "preset targets an unknown argument"
                );
                dropped.push(DroppedPreset {
                    path: format!("{}.{}", field_name, argument_name),
                    reason: DropReason::UnknownArgument,
                });
            }
        }
    }

    dropped
}

pub fn synthesize_sdl(
    schema: &RemoteSchema,
    descriptors: &[TypeDescriptor],
    arg_tree: &ArgTree,
) -> SynthesizedSdl {
    SdlSynthesizer::new(schema).synthesize(descriptors, arg_tree)
}

/// Same as [`synthesize_sdl`], keeping only the text.
pub fn generate_sdl(
    schema: &RemoteSchema,
    descriptors: &[TypeDescriptor],
    arg_tree: &ArgTree,
) -> String {
    synthesize_sdl(schema, descriptors, arg_tree).sdl
}

/// Every enum (with all its values) and every custom scalar of the schema.
pub fn constant_types(schema: &RemoteSchema) -> String {
    let synthesizer = SdlSynthesizer::new(schema);
    let empty = ArgTree::new();

    let blocks: Vec<String> = schema
        .types()
        .filter(|t| !is_introspection_type(t.name()))
        .filter_map(|type_def| {
            let descriptor = match type_def {
                TypeDefinition::Enum(enum_type) => TypeDescriptor::new(
                    DescriptorKind::Enum,
                    &enum_type.name,
                    enum_type
                        .values
                        .iter()
                        .map(|value| FieldDescriptor::new(value, true))
                        .collect(),
                ),
                TypeDefinition::Scalar(scalar) => TypeDescriptor::new(
                    DescriptorKind::Scalar,
                    &scalar.name,
                    vec![FieldDescriptor::new(&scalar.name, true)],
                ),
                _ => return None,
            };

            synthesizer.get_sdl_field(&descriptor, &empty)
        })
        .collect();

    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::preset::PresetValue;
    use crate::selection_tree::build_selection_tree;

    const REMOTE: &str = r#"
        schema { query: query_root mutation: mutation_root }
        type query_root {
          users(limit: Int, status: user_status, where: users_bool_exp): [users!]!
          version: String
        }
        type mutation_root { ban(id: Int!): Boolean }
        type users { id: Int! name: String }
        input users_bool_exp { name: String }
        enum user_status { ACTIVE BANNED }
        scalar timestamptz
    "#;

    fn remote() -> RemoteSchema {
        RemoteSchema::from_sdl(REMOTE).unwrap()
    }

    #[test]
    fn nothing_checked_gives_empty_sdl() {
        let remote = remote();
        let tree = build_selection_tree(&remote, None);

        let result = synthesize_sdl(&remote, &tree, &ArgTree::new());

        assert!(result.is_empty());
        assert_eq!(result.sdl, "");
    }

    #[test]
    fn renders_checked_members_with_presets() {
        let remote = remote();
        let mut tree = build_selection_tree(&remote, None);
        tree[0].set_checked("users", true);
        tree[2].check_all(true);
        tree[4].set_checked("ACTIVE", true);
        tree[5].check_all(true);

        let mut presets = ArgTree::new();
        presets.set("users", "limit", PresetValue::int(10));
        presets.set("users", "status", "ACTIVE".into());

        insta::assert_snapshot!(generate_sdl(&remote, &tree, &presets), @r"
        schema {
          query: query_root
        }

        type query_root {
          users(limit: Int @preset(value: 10), status: user_status @preset(value: ACTIVE), where: users_bool_exp): [users!]!
        }

        type users {
          id: Int!
          name: String
        }

        enum user_status {
          ACTIVE
        }

        scalar timestamptz
        ");
    }

    #[test]
    fn header_lists_only_roots_with_a_body() {
        let remote = remote();
        let mut tree = build_selection_tree(&remote, None);
        tree[1].set_checked("ban", true);

        let sdl = generate_sdl(&remote, &tree, &ArgTree::new());

        assert!(sdl.starts_with("schema {\n  mutation: mutation_root\n}"));
        assert!(!sdl.contains("query:"));
        assert!(sdl.contains("ban(id: Int!): Boolean"));
    }

    #[test]
    fn builtin_scalars_are_never_declared() {
        let remote = remote();
        let descriptor = TypeDescriptor::new(
            DescriptorKind::Scalar,
            "String",
            vec![FieldDescriptor::new("String", true)],
        );

        let sdl = generate_sdl(&remote, &[descriptor], &ArgTree::new());

        assert_eq!(sdl, "");
    }

    #[test]
    fn fields_without_arguments_have_no_parentheses() {
        let remote = remote();
        let mut tree = build_selection_tree(&remote, None);
        tree[0].set_checked("version", true);

        let sdl = generate_sdl(&remote, &tree, &ArgTree::new());

        assert!(sdl.contains("  version: String\n"));
    }

    #[test]
    fn reports_stale_presets() {
        let remote = remote();
        let mut tree = build_selection_tree(&remote, None);
        tree[0].set_checked("users", true);

        let mut presets = ArgTree::new();
        presets.set("users", "offset", PresetValue::int(1));
        presets.set("orders", "limit", PresetValue::int(1));
        presets.set("users", "where", PresetValue::object([("age", PresetValue::int(3))]));

        let result = synthesize_sdl(&remote, &tree, &presets);

        assert!(!result.sdl.contains("@preset"));
        assert_eq!(
            result.dropped_presets,
            vec![
                DroppedPreset {
                    path: "orders".to_string(),
                    reason: DropReason::UnknownField
                },
                DroppedPreset {
                    path: "users.offset".to_string(),
                    reason: DropReason::UnknownArgument
                },
                DroppedPreset {
                    path: "users.where.age".to_string(),
                    reason: DropReason::UnknownInputField
                },
            ]
        );
    }

    #[test]
    fn constant_types_lists_enums_and_custom_scalars() {
        insta::assert_snapshot!(constant_types(&remote()), @r"
        enum user_status {
          ACTIVE
          BANNED
        }

        scalar timestamptz
        ");
    }
}
