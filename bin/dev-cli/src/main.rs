mod logger;

use std::env;
use std::process;

use anyhow::{bail, Context};
use permissions_config::{load_config, PermissionsToolConfig};
use remote_schema_permissions::migration::{
    remove_permission_migration, save_permission_migration, PermissionDefinition, PermissionEdit,
    RemoteSchemaPermission,
};
use remote_schema_permissions::preset::directive::with_preset_prelude;
use remote_schema_permissions::schema::{RemoteSchema, RootOperation};
use remote_schema_permissions::sdl::parse::try_arg_tree_from_permission_sdl;
use remote_schema_permissions::sdl::{constant_types, synthesize_sdl};
use remote_schema_permissions::selection_tree::{build_selection_tree, TypeDescriptor};
use tracing::warn;

use crate::logger::configure_logging;

const USAGE: &str = "Usage: rsp-dev-cli [--config <path>] <command> [...]

Commands:
  tree <remote_schema> [saved_sdl] [--json]
  presets <saved_sdl>
  sdl <remote_schema> <saved_sdl> [--all]
  constants <remote_schema>
  save <role> <new_sdl> [existing_sdl] [--new-role]
  remove <role> <existing_sdl>

<remote_schema> is an introspection result (.json) or SDL.";

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();

    let config_path = match args.iter().position(|arg| arg == "--config") {
        Some(index) if index + 1 < args.len() => {
            let path = args.remove(index + 1);
            args.remove(index);
            Some(path)
        }
        Some(_) => bail!("--config expects a path\n\n{}", USAGE),
        None => None,
    };

    let config = load_config(config_path).context("failed to load configuration")?;
    configure_logging(&config.log)?;

    let flags: Vec<String> = args.iter().filter(|a| a.starts_with("--")).cloned().collect();
    let args: Vec<String> = args.into_iter().filter(|a| !a.starts_with("--")).collect();
    let has_flag = |name: &str| flags.iter().any(|flag| flag == name);

    let Some(command) = args.first() else {
        bail!("{}", USAGE);
    };

    match (command.as_str(), &args[1..]) {
        ("tree", [remote, rest @ ..]) => {
            let remote = read_remote_schema(remote)?;
            let saved = match rest.first() {
                Some(path) => Some(RemoteSchema::from_sdl(&read_file(path)?)?),
                None => None,
            };
            let tree = build_selection_tree(&remote, saved.as_ref());

            if has_flag("--json") {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                print_tree(&tree);
            }
        }
        ("presets", [saved]) => {
            let presets = try_arg_tree_from_permission_sdl(&read_file(saved)?)?;
            println!("{}", serde_json::to_string_pretty(&presets)?);
        }
        ("sdl", [remote, saved_path]) => {
            let remote = read_remote_schema(remote)?;
            remote.require_root_type(RootOperation::Query)?;
            let saved_sdl = read_file(saved_path)?;
            let saved = RemoteSchema::from_sdl(&saved_sdl)?;
            let presets = try_arg_tree_from_permission_sdl(&saved_sdl)?;

            let mut tree = build_selection_tree(&remote, Some(&saved));
            if has_flag("--all") {
                tree.iter_mut().for_each(|descriptor| descriptor.check_all(true));
            }

            let result = synthesize_sdl(&remote, &tree, &presets);

            if config.sdl.report_dropped_presets {
                for dropped in &result.dropped_presets {
                    warn!(path = %dropped.path, reason = ?dropped.reason, "preset dropped");
                }
            }

            print_sdl(&config, &result.sdl);
        }
        ("constants", [remote]) => {
            let remote = read_remote_schema(remote)?;
            print_sdl(&config, &constant_types(&remote));
        }
        ("save", [role, new_sdl, rest @ ..]) => {
            let existing = match rest.first() {
                Some(path) => vec![permission_of(role, read_file(path)?)],
                None => vec![],
            };
            let edit = if has_flag("--new-role") {
                PermissionEdit::NewRole { role: role.clone() }
            } else {
                PermissionEdit::ExistingRole { role: role.clone() }
            };
            let migration = save_permission_migration(
                &edit,
                &existing,
                remote_schema_name(&config),
                &read_file(new_sdl)?,
            )?;

            println!("{}", serde_json::to_string_pretty(&migration)?);
        }
        ("remove", [role, existing_sdl]) => {
            let existing = vec![permission_of(role, read_file(existing_sdl)?)];
            let migration =
                remove_permission_migration(role, &existing, remote_schema_name(&config))?;

            println!("{}", serde_json::to_string_pretty(&migration)?);
        }
        _ => bail!("Unknown command or missing arguments.\n\n{}", USAGE),
    }

    Ok(())
}

fn read_file(path: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Unable to read input file {}", path))
}

fn read_remote_schema(path: &str) -> anyhow::Result<RemoteSchema> {
    let content = read_file(path)?;

    let schema = if path.ends_with(".json") {
        RemoteSchema::from_introspection_json(&content)
    } else {
        RemoteSchema::from_sdl(&content)
    };

    schema.with_context(|| format!("failed to load remote schema from {}", path))
}

fn remote_schema_name(config: &PermissionsToolConfig) -> &str {
    config.remote_schema_or("remote_schema")
}

fn permission_of(role: &str, schema: String) -> RemoteSchemaPermission {
    RemoteSchemaPermission {
        role_name: role.trim().to_string(),
        definition: PermissionDefinition { schema },
    }
}

fn print_sdl(config: &PermissionsToolConfig, sdl: &str) {
    if sdl.is_empty() {
        eprintln!("nothing is selected");
    } else if config.sdl.include_preset_prelude {
        println!("{}", with_preset_prelude(sdl));
    } else {
        println!("{}", sdl);
    }
}

fn print_tree(tree: &[TypeDescriptor]) {
    for descriptor in tree {
        println!("{}", descriptor.name());

        for child in &descriptor.children {
            let mark = if child.checked { "x" } else { " " };

            match &child.return_type {
                Some(return_type) => println!("  [{}] {}: {}", mark, child.name, return_type),
                None => println!("  [{}] {}", mark, child.name),
            }
        }
    }
}
