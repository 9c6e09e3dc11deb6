pub mod introspection;
pub mod migration;
pub mod preset;
pub mod schema;
pub mod sdl;
pub mod selection_tree;
pub mod utils;

#[cfg(test)]
mod tests;

pub use preset::directive::{with_preset_prelude, PRESET_PRELUDE};
pub use preset::{ArgTree, PresetValue};
pub use schema::{RemoteSchema, SchemaError};
pub use sdl::parse::{arg_tree_from_permission_sdl, try_arg_tree_from_permission_sdl};
pub use sdl::{constant_types, generate_sdl, synthesize_sdl, SynthesizedSdl};
pub use selection_tree::{build_selection_tree, TypeDescriptor};
