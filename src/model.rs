use crate::condition::Condition;
use crate::context::RequestContext;
use crate::types::{PermissionName, RoleName, UserId};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// A named, conditionally-grantable capability tied to a resource/action pair.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Permission {
    /// Unique permission name, conventionally `resource.action`.
    pub name: PermissionName,
    /// Resource tag, e.g. `order`.
    pub resource: String,
    /// Action tag, e.g. `create`.
    pub action: String,
    /// Conditions that must all hold for the grant to apply.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Classification tag for catalog grouping.
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "general".to_string()
}

impl Permission {
    /// Creates an unconditional permission.
    pub fn new(
        name: PermissionName,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            name,
            resource: resource.into(),
            action: action.into(),
            conditions: Vec::new(),
            category: default_category(),
        }
    }

    /// Attaches conditions.
    pub fn with_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Sets the category tag.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Named bundle of permissions, optionally inheriting from other roles.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Role {
    /// Unique role name.
    pub name: RoleName,
    /// Directly owned permission names.
    #[serde(default)]
    pub permissions: BTreeSet<PermissionName>,
    /// Parent roles whose effective permissions this role inherits.
    #[serde(default)]
    pub inherits_from: BTreeSet<RoleName>,
    /// System roles cannot be deleted.
    #[serde(default)]
    pub system: bool,
}

impl Role {
    /// Creates an empty role.
    pub fn new(name: RoleName) -> Self {
        Self {
            name,
            permissions: BTreeSet::new(),
            inherits_from: BTreeSet::new(),
            system: false,
        }
    }

    /// Sets the directly owned permissions.
    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = PermissionName>) -> Self {
        self.permissions = permissions.into_iter().collect();
        self
    }

    /// Sets the parent roles.
    pub fn with_inherits(mut self, parents: impl IntoIterator<Item = RoleName>) -> Self {
        self.inherits_from = parents.into_iter().collect();
        self
    }

    /// Marks the role as a system role.
    pub fn system(mut self) -> Self {
        self.system = true;
        self
    }
}

/// A role granted to a user, with provenance and assignment context.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RoleAssignment {
    /// Assigned user.
    pub user: UserId,
    /// Assigned role.
    pub role: RoleName,
    /// When the assignment was made.
    pub assigned_at: DateTime<Utc>,
    /// Who made the assignment.
    pub assigned_by: String,
    /// Assignment context (tenant, department, location, ...).
    #[serde(default)]
    pub context: RequestContext,
}

impl RoleAssignment {
    /// Creates an assignment stamped with the current time.
    pub fn new(
        user: UserId,
        role: RoleName,
        assigned_by: impl Into<String>,
        context: RequestContext,
    ) -> Self {
        Self {
            user,
            role,
            assigned_at: Utc::now(),
            assigned_by: assigned_by.into(),
            context,
        }
    }
}
