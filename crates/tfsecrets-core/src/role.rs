//! Role definitions
//!
//! A role names the scope of the tokens the engine may mint: either an
//! organization token or a team token. The scope is a tagged enum so that a
//! team role without a team id cannot be represented.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, Result};

/// Discriminant of [`RoleScope`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    /// Organization-wide token
    #[serde(alias = "org")]
    Organization,
    /// Team-scoped token
    Team,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleKind::Organization => write!(f, "organization"),
            RoleKind::Team => write!(f, "team"),
        }
    }
}

impl FromStr for RoleKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "organization" | "org" => Ok(RoleKind::Organization),
            "team" => Ok(RoleKind::Team),
            _ => Err(EngineError::validation(format!("unknown role kind: {}", s))),
        }
    }
}

/// Upstream scope of a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RoleScope {
    Organization { organization: String },
    Team { organization: String, team_id: String },
}

impl RoleScope {
    /// Resolve a scope from loosely typed request fields
    ///
    /// When `kind` is absent it is inferred from the presence of `team_id`.
    /// Blank strings count as absent.
    pub fn from_parts(
        kind: Option<RoleKind>,
        organization: Option<String>,
        team_id: Option<String>,
    ) -> Result<Self> {
        let organization = non_blank(organization);
        let team_id = non_blank(team_id);

        let kind = kind.unwrap_or(if team_id.is_some() {
            RoleKind::Team
        } else {
            RoleKind::Organization
        });

        let organization = organization
            .ok_or_else(|| EngineError::validation("organization is required"))?;

        match (kind, team_id) {
            (RoleKind::Organization, None) => Ok(RoleScope::Organization { organization }),
            (RoleKind::Organization, Some(_)) => Err(EngineError::validation(
                "team_id must not be set for an organization role",
            )),
            (RoleKind::Team, Some(team_id)) => Ok(RoleScope::Team {
                organization,
                team_id,
            }),
            (RoleKind::Team, None) => {
                Err(EngineError::validation("team_id is required for a team role"))
            }
        }
    }

    pub fn kind(&self) -> RoleKind {
        match self {
            RoleScope::Organization { .. } => RoleKind::Organization,
            RoleScope::Team { .. } => RoleKind::Team,
        }
    }

    pub fn organization(&self) -> &str {
        match self {
            RoleScope::Organization { organization } | RoleScope::Team { organization, .. } => {
                organization
            }
        }
    }

    pub fn team_id(&self) -> Option<&str> {
        match self {
            RoleScope::Organization { .. } => None,
            RoleScope::Team { team_id, .. } => Some(team_id),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A named role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role name, also the `creds/<name>` path segment
    pub name: String,

    #[serde(flatten)]
    pub scope: RoleScope,

    /// Lease TTL in seconds (0 = engine default)
    #[serde(default)]
    pub ttl: u64,

    /// Maximum lease TTL in seconds (0 = engine default)
    #[serde(default)]
    pub max_ttl: u64,
}

impl Role {
    /// Create a role with engine-default TTLs
    pub fn new(name: impl Into<String>, scope: RoleScope) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            scope,
            ttl: 0,
            max_ttl: 0,
        })
    }

    /// Create an organization role
    pub fn organization(name: impl Into<String>, organization: impl Into<String>) -> Result<Self> {
        let scope = RoleScope::from_parts(
            Some(RoleKind::Organization),
            Some(organization.into()),
            None,
        )?;
        Self::new(name, scope)
    }

    /// Create a team role
    pub fn team(
        name: impl Into<String>,
        organization: impl Into<String>,
        team_id: impl Into<String>,
    ) -> Result<Self> {
        let scope = RoleScope::from_parts(
            Some(RoleKind::Team),
            Some(organization.into()),
            Some(team_id.into()),
        )?;
        Self::new(name, scope)
    }

    /// Set lease TTLs (seconds)
    ///
    /// Fails when both are non-zero and `ttl` exceeds `max_ttl`.
    pub fn with_ttls(mut self, ttl: u64, max_ttl: u64) -> Result<Self> {
        if ttl > 0 && max_ttl > 0 && ttl > max_ttl {
            return Err(EngineError::validation(format!(
                "ttl ({}s) must not exceed max_ttl ({}s)",
                ttl, max_ttl
            )));
        }
        self.ttl = ttl;
        self.max_ttl = max_ttl;
        Ok(self)
    }
}

/// Role names are used as a single path segment
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(EngineError::validation("role name must not be empty"));
    }
    if name.contains('/') {
        return Err(EngineError::validation(format!(
            "role name must not contain '/': {}",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_inferred_from_team_id() {
        let scope = RoleScope::from_parts(None, Some("acme".into()), None).unwrap();
        assert_eq!(scope.kind(), RoleKind::Organization);

        let scope =
            RoleScope::from_parts(None, Some("acme".into()), Some("team-1".into())).unwrap();
        assert_eq!(scope.kind(), RoleKind::Team);
        assert_eq!(scope.team_id(), Some("team-1"));
    }

    #[test]
    fn test_missing_organization_rejected() {
        let result = RoleScope::from_parts(None, None, Some("team-1".into()));
        assert!(matches!(result, Err(EngineError::Validation(_))));

        let result = RoleScope::from_parts(Some(RoleKind::Organization), Some("  ".into()), None);
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_contradictory_fields_rejected() {
        let result = RoleScope::from_parts(
            Some(RoleKind::Organization),
            Some("acme".into()),
            Some("team-1".into()),
        );
        assert!(matches!(result, Err(EngineError::Validation(_))));

        let result = RoleScope::from_parts(Some(RoleKind::Team), Some("acme".into()), None);
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_role_name_validation() {
        assert!(Role::organization("", "acme").is_err());
        assert!(Role::organization("a/b", "acme").is_err());
        assert!(Role::organization("test-org-token", "acme").is_ok());
    }

    #[test]
    fn test_ttl_exceeding_max_rejected() {
        let role = Role::organization("r", "acme").unwrap();
        assert!(role.clone().with_ttls(7200, 3600).is_err());
        assert!(role.clone().with_ttls(3600, 7200).is_ok());
        // Zero means "engine default" and is never compared
        assert!(role.with_ttls(7200, 0).is_ok());
    }

    #[test]
    fn test_role_serialization_is_flat() {
        let role = Role::team("test-team-token", "acme", "team-1").unwrap();
        let json = serde_json::to_value(&role).unwrap();

        assert_eq!(json["name"], "test-team-token");
        assert_eq!(json["kind"], "team");
        assert_eq!(json["organization"], "acme");
        assert_eq!(json["team_id"], "team-1");

        let back: Role = serde_json::from_value(json).unwrap();
        assert_eq!(back, role);
    }

    #[test]
    fn test_kind_accepts_org_shorthand() {
        let kind: RoleKind = serde_json::from_str(r#""org""#).unwrap();
        assert_eq!(kind, RoleKind::Organization);
        // Serialized form stays canonical
        assert_eq!(serde_json::to_string(&kind).unwrap(), r#""organization""#);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("org".parse::<RoleKind>().unwrap(), RoleKind::Organization);
        assert_eq!("Team".parse::<RoleKind>().unwrap(), RoleKind::Team);
        assert!("user".parse::<RoleKind>().is_err());
    }
}
