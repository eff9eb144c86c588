use crate::types::{RoleName, UserId};
use thiserror::Error;

/// Store-layer error type.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Store error wrapper. Callers must treat this as a denied decision.
    #[error("store error: {0}")]
    Store(#[source] StoreError),
    /// Invalid identifier input.
    #[error("invalid id: {0}")]
    InvalidId(String),
    /// Request context is not a JSON object.
    #[error("invalid context: {0}")]
    InvalidContext(String),
    /// A custom condition was reached with no evaluator registered.
    #[error("no custom evaluator registered for condition {name}")]
    MissingCustomEvaluator { name: String },
    /// Role inheritance cycle detected.
    #[error("role inheritance cycle detected at role {role}")]
    RoleCycleDetected { role: RoleName },
    /// Role inheritance depth exceeded.
    #[error("role inheritance depth exceeded at role {role}; max depth {max_depth}")]
    RoleDepthExceeded { role: RoleName, max_depth: usize },
    /// A referenced role or permission does not exist in the store.
    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },
    /// System roles cannot be deleted.
    #[error("role {role} is a system role and cannot be deleted")]
    SystemRoleProtected { role: RoleName },
    /// The user already holds the role.
    #[error("user {user} already has role {role}")]
    AlreadyAssigned { user: UserId, role: RoleName },
}

impl From<StoreError> for Error {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}
