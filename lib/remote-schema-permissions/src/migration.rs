use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MigrationError {
    #[error("role name must not be empty")]
    EmptyRole,
    #[error("role \"{0}\" has no permission to save: the definition is empty")]
    EmptyDefinition(String),
    #[error("role \"{0}\" already has a permission on this remote schema")]
    RoleAlreadyExists(String),
    #[error("role \"{0}\" has no permission on this remote schema")]
    PermissionNotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    pub schema: String,
}

/// A permission as stored for a remote schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSchemaPermission {
    pub role_name: String,
    pub definition: PermissionDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddRemoteSchemaPermissionArgs {
    pub remote_schema: String,
    pub role: String,
    pub definition: PermissionDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropRemoteSchemaPermissionArgs {
    pub remote_schema: String,
    pub role: String,
}

/// A metadata API request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "args", rename_all = "snake_case")]
pub enum MetadataQuery {
    AddRemoteSchemaPermissions(AddRemoteSchemaPermissionArgs),
    DropRemoteSchemaPermissions(DropRemoteSchemaPermissionArgs),
}

impl MetadataQuery {
    pub fn add(remote_schema: &str, role: &str, schema: &str) -> Self {
        MetadataQuery::AddRemoteSchemaPermissions(AddRemoteSchemaPermissionArgs {
            remote_schema: remote_schema.to_string(),
            role: role.to_string(),
            definition: PermissionDefinition {
                schema: schema.to_string(),
            },
        })
    }

    pub fn drop(remote_schema: &str, role: &str) -> Self {
        MetadataQuery::DropRemoteSchemaPermissions(DropRemoteSchemaPermissionArgs {
            remote_schema: remote_schema.to_string(),
            role: role.to_string(),
        })
    }
}

/// Who is being edited: a role typed in as new, or one picked from the
/// existing roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionEdit {
    NewRole { role: String },
    ExistingRole { role: String },
}

impl PermissionEdit {
    pub fn role(&self) -> &str {
        match self {
            PermissionEdit::NewRole { role } | PermissionEdit::ExistingRole { role } => role,
        }
    }
}

/// A reversible pair: `down` restores the exact previous definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionMigration {
    pub up: Vec<MetadataQuery>,
    pub down: Vec<MetadataQuery>,
}

pub fn find_permission<'p>(
    permissions: &'p [RemoteSchemaPermission],
    role: &str,
) -> Option<&'p RemoteSchemaPermission> {
    permissions.iter().find(|p| p.role_name == role)
}

#[instrument(level = "trace", skip(existing_permissions, definition), fields(role = edit.role()))]
pub fn save_permission_migration(
    edit: &PermissionEdit,
    existing_permissions: &[RemoteSchemaPermission],
    remote_schema: &str,
    definition: &str,
) -> Result<PermissionMigration, MigrationError> {
    let role = edit.role().trim();

    if role.is_empty() {
        return Err(MigrationError::EmptyRole);
    }

    if definition.trim().is_empty() {
        return Err(MigrationError::EmptyDefinition(role.to_string()));
    }

    let existing = find_permission(existing_permissions, role);

    match (edit, existing) {
        (PermissionEdit::NewRole { .. }, Some(_)) => {
            Err(MigrationError::RoleAlreadyExists(role.to_string()))
        }
        (_, None) => Ok(PermissionMigration {
            up: vec![MetadataQuery::add(remote_schema, role, definition)],
            down: vec![MetadataQuery::drop(remote_schema, role)],
        }),
        (PermissionEdit::ExistingRole { .. }, Some(previous)) => Ok(PermissionMigration {
            up: vec![
                MetadataQuery::drop(remote_schema, role),
                MetadataQuery::add(remote_schema, role, definition),
            ],
            down: vec![
                MetadataQuery::drop(remote_schema, role),
                MetadataQuery::add(remote_schema, role, &previous.definition.schema),
            ],
        }),
    }
}

pub fn remove_permission_migration(
    role: &str,
    existing_permissions: &[RemoteSchemaPermission],
    remote_schema: &str,
) -> Result<PermissionMigration, MigrationError> {
    let role = role.trim();

    if role.is_empty() {
        return Err(MigrationError::EmptyRole);
    }

    let previous = find_permission(existing_permissions, role)
        .ok_or_else(|| MigrationError::PermissionNotFound(role.to_string()))?;

    Ok(PermissionMigration {
        up: vec![MetadataQuery::drop(remote_schema, role)],
        down: vec![MetadataQuery::add(
            remote_schema,
            role,
            &previous.definition.schema,
        )],
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn existing(role: &str, schema: &str) -> RemoteSchemaPermission {
        RemoteSchemaPermission {
            role_name: role.to_string(),
            definition: PermissionDefinition {
                schema: schema.to_string(),
            },
        }
    }

    #[test]
    fn queries_serialize_as_metadata_requests() {
        let json = serde_json::to_value(MetadataQuery::add("countries", "user", "type A")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "add_remote_schema_permissions",
                "args": {
                    "remote_schema": "countries",
                    "role": "user",
                    "definition": { "schema": "type A" }
                }
            })
        );

        let json = serde_json::to_value(MetadataQuery::drop("countries", "user")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "drop_remote_schema_permissions",
                "args": { "remote_schema": "countries", "role": "user" }
            })
        );
    }

    #[test]
    fn new_role_is_created_and_dropped_on_rollback() {
        let migration = save_permission_migration(
            &PermissionEdit::NewRole {
                role: "  editor ".to_string(),
            },
            &[existing("user", "old")],
            "countries",
            "new",
        )
        .unwrap();

        assert_eq!(migration.up, vec![MetadataQuery::add("countries", "editor", "new")]);
        assert_eq!(migration.down, vec![MetadataQuery::drop("countries", "editor")]);
    }

    #[test]
    fn existing_role_is_replaced_and_restored_on_rollback() {
        let migration = save_permission_migration(
            &PermissionEdit::ExistingRole {
                role: "user".to_string(),
            },
            &[existing("user", "old")],
            "countries",
            "new",
        )
        .unwrap();

        assert_eq!(
            migration.up,
            vec![
                MetadataQuery::drop("countries", "user"),
                MetadataQuery::add("countries", "user", "new"),
            ]
        );
        assert_eq!(
            migration.down,
            vec![
                MetadataQuery::drop("countries", "user"),
                MetadataQuery::add("countries", "user", "old"),
            ]
        );
    }

    #[test]
    fn existing_role_without_permission_is_created() {
        let migration = save_permission_migration(
            &PermissionEdit::ExistingRole {
                role: "user".to_string(),
            },
            &[],
            "countries",
            "new",
        )
        .unwrap();

        assert_eq!(migration.up, vec![MetadataQuery::add("countries", "user", "new")]);
    }

    #[test]
    fn rejects_invalid_edits() {
        let permissions = [existing("user", "old")];

        assert_eq!(
            save_permission_migration(
                &PermissionEdit::NewRole {
                    role: "user".to_string()
                },
                &permissions,
                "countries",
                "new"
            ),
            Err(MigrationError::RoleAlreadyExists("user".to_string()))
        );
        assert_eq!(
            save_permission_migration(
                &PermissionEdit::NewRole {
                    role: " ".to_string()
                },
                &permissions,
                "countries",
                "new"
            ),
            Err(MigrationError::EmptyRole)
        );
        assert_eq!(
            save_permission_migration(
                &PermissionEdit::ExistingRole {
                    role: "user".to_string()
                },
                &permissions,
                "countries",
                ""
            ),
            Err(MigrationError::EmptyDefinition("user".to_string()))
        );
    }

    #[test]
    fn removal_restores_previous_definition_on_rollback() {
        let permissions = [existing("user", "old")];
        let migration = remove_permission_migration("user", &permissions, "countries").unwrap();

        assert_eq!(migration.up, vec![MetadataQuery::drop("countries", "user")]);
        assert_eq!(
            migration.down,
            vec![MetadataQuery::add("countries", "user", "old")]
        );
        assert_eq!(
            remove_permission_migration("admin", &permissions, "countries"),
            Err(MigrationError::PermissionNotFound("admin".to_string()))
        );
    }
}
