use graphql_parser::query::Text;
use graphql_parser::schema::{Definition, Document, ParseError, TypeDefinition};
use tracing::{error, instrument};

use crate::preset::directive::PresetDirective;
use crate::preset::{ArgTree, FieldPresets};
use crate::schema::{MUTATION_ROOT, QUERY_ROOT};
use crate::utils::parsing::safe_parse_schema;

#[derive(Debug, thiserror::Error)]
pub enum PermissionSdlError {
    #[error("failed to parse permission SDL: {0}")]
    Parse(#[from] ParseError),
}

/// Recovers the presets of a saved permission SDL. Malformed SDL yields an
/// empty tree; the parse error is only logged.
pub fn arg_tree_from_permission_sdl(sdl: &str) -> ArgTree {
    match try_arg_tree_from_permission_sdl(sdl) {
        Ok(tree) => tree,
        Err(err) => {
            error!(error = %err, "ignoring presets of unparsable permission SDL");
            ArgTree::new()
        }
    }
}

#[instrument(level = "trace", skip(sdl), name = "arg_tree_from_permission_sdl")]
pub fn try_arg_tree_from_permission_sdl(sdl: &str) -> Result<ArgTree, PermissionSdlError> {
    if sdl.trim().is_empty() {
        return Ok(ArgTree::new());
    }

    let document = safe_parse_schema(sdl)?;

    Ok(arg_tree_from_document(&document))
}

/// Walks `@preset` directives on the arguments of the root types' fields.
/// Fields of both roots end up in one map.
pub fn arg_tree_from_document<'a, T: Text<'a>>(document: &Document<'a, T>) -> ArgTree {
    let roots = root_type_names(document);
    let mut tree = ArgTree::new();

    for definition in &document.definitions {
        let Definition::TypeDefinition(TypeDefinition::Object(object)) = definition else {
            continue;
        };

        if !roots.iter().any(|root| root == object.name.as_ref()) {
            continue;
        }

        for field in &object.fields {
            let presets: FieldPresets = field
                .arguments
                .iter()
                .filter_map(|argument| {
                    let directive = PresetDirective::find(&argument.directives)?;
                    let value = PresetDirective::from(directive).value?;

                    Some((argument.name.as_ref().to_string(), value))
                })
                .collect();

            for (argument, value) in presets {
                tree.set(field.name.as_ref(), argument, value);
            }
        }
    }

    tree
}

/// `query_root`, `mutation_root`, and whatever a `schema { }` block names.
fn root_type_names<'a, T: Text<'a>>(document: &Document<'a, T>) -> Vec<String> {
    let mut roots = vec![QUERY_ROOT.to_string(), MUTATION_ROOT.to_string()];

    for definition in &document.definitions {
        if let Definition::SchemaDefinition(schema) = definition {
            roots.extend(
                [schema.query.as_ref(), schema.mutation.as_ref()]
                    .into_iter()
                    .flatten()
                    .map(|name| name.as_ref().to_string()),
            );
        }
    }

    roots
}
