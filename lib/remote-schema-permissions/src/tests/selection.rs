use pretty_assertions::assert_eq;

use crate::{
    schema::RemoteSchema,
    sdl::{generate_sdl, parse::arg_tree_from_permission_sdl},
    selection_tree::{build_selection_tree, TypeDescriptor},
    tests::testkit::{init_logger, introspected_users_schema, saved_users_permission},
};

fn descriptor<'t>(tree: &'t [TypeDescriptor], name: &str) -> &'t TypeDescriptor {
    tree.iter()
        .find(|d| d.name() == name)
        .unwrap_or_else(|| panic!("no descriptor named {}", name))
}

fn checked(descriptor: &TypeDescriptor) -> Vec<&str> {
    descriptor
        .children
        .iter()
        .filter(|c| c.checked)
        .map(|c| c.name.as_str())
        .collect()
}

#[test]
fn tree_of_introspected_schema() {
    init_logger();
    let remote = introspected_users_schema();
    let tree = build_selection_tree(&remote, None);

    assert_eq!(
        tree.iter().map(TypeDescriptor::name).collect::<Vec<_>>(),
        vec![
            "type query_root",
            "type mutation_root",
            "type users",
            "type users_mutation_response",
            "input users_bool_exp",
            "input Int_comparison_exp",
            "input String_comparison_exp",
            "input users_order_by",
            "input users_set_input",
            "enum order_by",
            "enum user_status",
            "scalar timestamptz",
        ]
    );
    assert!(tree.iter().all(|d| !d.any_checked()));
}

#[test]
fn tree_reflects_saved_permission() {
    init_logger();
    let remote = introspected_users_schema();
    let saved = RemoteSchema::from_sdl(&saved_users_permission()).unwrap();
    let tree = build_selection_tree(&remote, Some(&saved));

    assert_eq!(
        checked(descriptor(&tree, "type query_root")),
        vec!["users", "users_by_status"]
    );
    assert!(!descriptor(&tree, "type mutation_root").any_checked());
    assert_eq!(
        checked(descriptor(&tree, "type users")),
        vec!["id", "name", "status"]
    );
    assert_eq!(checked(descriptor(&tree, "input users_bool_exp")), vec!["id"]);
    assert_eq!(checked(descriptor(&tree, "enum order_by")), vec!["asc", "desc"]);
    assert!(!descriptor(&tree, "scalar timestamptz").any_checked());
}

#[test]
fn revoking_a_field_drops_it_from_the_sdl() {
    init_logger();
    let remote = introspected_users_schema();
    let saved_sdl = saved_users_permission();
    let saved = RemoteSchema::from_sdl(&saved_sdl).unwrap();
    let mut tree = build_selection_tree(&remote, Some(&saved));
    let presets = arg_tree_from_permission_sdl(&saved_sdl);

    tree[0].set_checked("users", false);
    tree[0].set_checked("users_by_status", false);
    tree[1].set_checked("delete_users", true);

    let sdl = generate_sdl(&remote, &tree, &presets);

    assert!(sdl.starts_with("schema {\n  mutation: mutation_root\n}\n"));
    assert!(!sdl.contains("type query_root"));
    assert!(sdl.contains("  delete_users(where: users_bool_exp!): users_mutation_response\n"));
}

#[test]
fn revoking_everything_yields_no_sdl() {
    init_logger();
    let remote = introspected_users_schema();
    let saved_sdl = saved_users_permission();
    let saved = RemoteSchema::from_sdl(&saved_sdl).unwrap();
    let mut tree = build_selection_tree(&remote, Some(&saved));

    for descriptor in &mut tree {
        descriptor.check_all(false);
    }

    let sdl = generate_sdl(&remote, &tree, &arg_tree_from_permission_sdl(&saved_sdl));

    assert_eq!(sdl, "");
}
