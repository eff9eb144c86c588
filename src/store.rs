use crate::error::StoreError;
use crate::model::{Permission, Role, RoleAssignment};
use crate::types::{PermissionName, RoleName, UserId};
use async_trait::async_trait;

/// Store interface for role and permission definitions.
///
/// Missing definitions resolve to `None`; during resolution a dangling
/// reference contributes nothing rather than failing the decision.
#[async_trait]
pub trait RoleStore {
    /// Returns a role definition by name.
    async fn get_role(&self, role: &RoleName) -> std::result::Result<Option<Role>, StoreError>;

    /// Returns a permission definition by name.
    async fn get_permission(
        &self,
        permission: &PermissionName,
    ) -> std::result::Result<Option<Permission>, StoreError>;
}

/// Store interface for user role assignments.
#[async_trait]
pub trait AssignmentStore {
    /// Returns all role assignments held by a user.
    async fn user_assignments(
        &self,
        user: &UserId,
    ) -> std::result::Result<Vec<RoleAssignment>, StoreError>;
}

/// Composite store trait.
pub trait Store: RoleStore + AssignmentStore + Send + Sync {}

impl<T> Store for T where T: RoleStore + AssignmentStore + Send + Sync {}
