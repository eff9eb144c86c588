use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::audit::{AuditEvent, AuditKind, AuditSink, NoAuditSink};
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::model::{Permission, Role, RoleAssignment};
use crate::store::{AssignmentStore, RoleStore};
use crate::types::{PermissionName, RoleName, UserId};

/// In-memory store with definition CRUD, for tests and single-process
/// deployments.
///
/// Mutations validate references, emit audit events, and take effect
/// before the call returns. Callers holding a cached resolver are
/// responsible for invalidating it after a mutation.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
    audit: Arc<dyn AuditSink>,
}

#[derive(Default)]
struct Inner {
    roles: RwLock<HashMap<RoleName, Role>>,
    permissions: RwLock<HashMap<PermissionName, Permission>>,
    assignments: RwLock<HashMap<UserId, Vec<RoleAssignment>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner::default()),
            audit: Arc::new(NoAuditSink),
        }
    }

    /// Attaches an audit sink receiving mutation events.
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Creates or replaces a permission definition.
    pub fn create_permission(&self, permission: Permission) {
        let subject = permission.name.to_string();
        let mut guard = self.inner.permissions.write().expect("poisoned lock");
        guard.insert(permission.name.clone(), permission);
        drop(guard);
        self.audit
            .record(AuditEvent::new(AuditKind::PermissionChange, "create", subject));
    }

    /// Updates an existing permission definition.
    pub fn update_permission(&self, permission: Permission) -> Result<()> {
        let subject = permission.name.to_string();
        let mut guard = self.inner.permissions.write().expect("poisoned lock");
        if !guard.contains_key(&permission.name) {
            return Err(Error::NotFound {
                kind: "permission",
                name: subject,
            });
        }
        guard.insert(permission.name.clone(), permission);
        drop(guard);
        self.audit
            .record(AuditEvent::new(AuditKind::PermissionChange, "update", subject));
        Ok(())
    }

    /// Creates a role after validating that every referenced permission
    /// and parent role exists.
    pub fn create_role(&self, role: Role) -> Result<()> {
        self.validate_role(&role)?;
        let subject = role.name.to_string();
        let mut guard = self.inner.roles.write().expect("poisoned lock");
        guard.insert(role.name.clone(), role);
        drop(guard);
        self.audit
            .record(AuditEvent::new(AuditKind::RoleChange, "create", subject));
        Ok(())
    }

    /// Deletes a role. System roles are protected.
    pub fn delete_role(&self, role: &RoleName) -> Result<()> {
        let mut guard = self.inner.roles.write().expect("poisoned lock");
        let Some(existing) = guard.get(role) else {
            return Err(Error::NotFound {
                kind: "role",
                name: role.to_string(),
            });
        };
        if existing.system {
            return Err(Error::SystemRoleProtected { role: role.clone() });
        }
        guard.remove(role);
        drop(guard);
        self.audit
            .record(AuditEvent::new(AuditKind::RoleChange, "delete", role.to_string()));
        Ok(())
    }

    /// Assigns a role to a user. The role must exist and must not already
    /// be held.
    pub fn assign_role(
        &self,
        user: UserId,
        role: RoleName,
        assigned_by: impl Into<String>,
        context: RequestContext,
    ) -> Result<RoleAssignment> {
        if !self
            .inner
            .roles
            .read()
            .expect("poisoned lock")
            .contains_key(&role)
        {
            return Err(Error::NotFound {
                kind: "role",
                name: role.to_string(),
            });
        }

        let mut guard = self.inner.assignments.write().expect("poisoned lock");
        let assignments = guard.entry(user.clone()).or_default();
        if assignments.iter().any(|existing| existing.role == role) {
            return Err(Error::AlreadyAssigned { user, role });
        }

        let assignment = RoleAssignment::new(user.clone(), role.clone(), assigned_by, context);
        assignments.push(assignment.clone());
        drop(guard);
        self.audit.record(AuditEvent::new(
            AuditKind::RoleAssignment,
            "assign",
            format!("{user}/{role}"),
        ));
        Ok(assignment)
    }

    /// Removes a role assignment from a user.
    pub fn remove_role(&self, user: &UserId, role: &RoleName) -> Result<()> {
        let mut guard = self.inner.assignments.write().expect("poisoned lock");
        let Some(assignments) = guard.get_mut(user) else {
            return Err(Error::NotFound {
                kind: "role assignment",
                name: format!("{user}/{role}"),
            });
        };
        let Some(index) = assignments
            .iter()
            .position(|assignment| &assignment.role == role)
        else {
            return Err(Error::NotFound {
                kind: "role assignment",
                name: format!("{user}/{role}"),
            });
        };
        assignments.remove(index);
        drop(guard);
        self.audit.record(AuditEvent::new(
            AuditKind::RoleAssignment,
            "remove",
            format!("{user}/{role}"),
        ));
        Ok(())
    }

    fn validate_role(&self, role: &Role) -> Result<()> {
        let permissions = self.inner.permissions.read().expect("poisoned lock");
        for permission in &role.permissions {
            if !permissions.contains_key(permission) {
                return Err(Error::NotFound {
                    kind: "permission",
                    name: permission.to_string(),
                });
            }
        }
        drop(permissions);

        let roles = self.inner.roles.read().expect("poisoned lock");
        for parent in &role.inherits_from {
            if !roles.contains_key(parent) {
                return Err(Error::NotFound {
                    kind: "role",
                    name: parent.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn get_role(
        &self,
        role: &RoleName,
    ) -> std::result::Result<Option<Role>, crate::StoreError> {
        let guard = self.inner.roles.read().expect("poisoned lock");
        Ok(guard.get(role).cloned())
    }

    async fn get_permission(
        &self,
        permission: &PermissionName,
    ) -> std::result::Result<Option<Permission>, crate::StoreError> {
        let guard = self.inner.permissions.read().expect("poisoned lock");
        Ok(guard.get(permission).cloned())
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn user_assignments(
        &self,
        user: &UserId,
    ) -> std::result::Result<Vec<RoleAssignment>, crate::StoreError> {
        let guard = self.inner.assignments.read().expect("poisoned lock");
        Ok(guard.get(user).cloned().unwrap_or_default())
    }
}
