//! Role registry

use tracing::{debug, info};

use tfsecrets_core::role::validate_name;
use tfsecrets_core::{EngineError, Result, Role};

use super::Engine;
use crate::storage::{get_json, put_json, ROLE_PREFIX};

fn role_key(name: &str) -> String {
    format!("{}{}", ROLE_PREFIX, name)
}

impl Engine {
    /// Create or replace a role
    ///
    /// Replace semantics: the stored role is exactly `role`. Secrets already
    /// issued against the previous definition keep their own scope snapshot.
    pub async fn upsert_role(&self, role: Role) -> Result<Role> {
        validate_name(&role.name)?;
        if role.ttl > 0 && role.max_ttl > 0 && role.ttl > role.max_ttl {
            return Err(EngineError::validation(format!(
                "ttl ({}s) must not exceed max_ttl ({}s)",
                role.ttl, role.max_ttl
            )));
        }

        put_json(self.store.as_ref(), &role_key(&role.name), &role).await?;

        info!(
            role = %role.name,
            kind = %role.scope.kind(),
            organization = %role.scope.organization(),
            team_id = ?role.scope.team_id(),
            "Role written"
        );
        Ok(role)
    }

    /// Fetch a role by name
    pub async fn get_role(&self, name: &str) -> Result<Role> {
        validate_name(name)?;
        let role: Option<Role> = get_json(self.store.as_ref(), &role_key(name)).await?;
        role.ok_or_else(|| {
            debug!(role = %name, "Role lookup missed");
            EngineError::RoleNotFound(name.to_string())
        })
    }

    /// Sorted role names
    pub async fn list_roles(&self) -> Result<Vec<String>> {
        Ok(self.store.list(ROLE_PREFIX).await?)
    }

    /// Delete a role; deleting an unknown role is not an error
    pub async fn delete_role(&self, name: &str) -> Result<bool> {
        validate_name(name)?;
        let existed = self.store.delete(&role_key(name)).await?;
        if existed {
            info!(role = %name, "Role deleted");
        }
        Ok(existed)
    }

    /// Lease TTLs for a role, falling back to the engine defaults
    ///
    /// Returns `(ttl, max_ttl)` in seconds with `ttl <= max_ttl`.
    pub(crate) fn effective_ttls(&self, role: &Role) -> (u64, u64) {
        let max_ttl = if role.max_ttl > 0 {
            role.max_ttl
        } else {
            self.config.max_ttl
        };
        let ttl = if role.ttl > 0 {
            role.ttl
        } else {
            self.config.default_ttl
        };
        (ttl.min(max_ttl), max_ttl)
    }
}
