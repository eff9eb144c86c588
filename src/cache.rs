use crate::context::RequestContext;
use crate::types::{PermissionName, UserId};
use async_trait::async_trait;

/// Key for a cached decision: user, permission, and the canonical context
/// rendering. The full rendering is kept so distinct contexts never share
/// an entry.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct CacheKey {
    /// User the decision was made for.
    pub user: UserId,
    /// Requested permission name.
    pub permission: PermissionName,
    /// Canonical context serialization, see [`RequestContext::fingerprint`].
    pub context: String,
}

impl CacheKey {
    /// Builds a key from resolution inputs.
    pub fn new(user: &UserId, permission: &PermissionName, context: &RequestContext) -> Self {
        Self {
            user: user.clone(),
            permission: permission.clone(),
            context: context.fingerprint(),
        }
    }
}

/// Cache interface for resolved decisions.
///
/// A cached entry is authoritative until invalidated: the resolver returns
/// it without re-evaluating. Implementations must insert and overwrite
/// entries atomically but need not serialize concurrent resolutions of the
/// same key; the computation is idempotent.
#[async_trait]
pub trait DecisionCache: Send + Sync {
    /// Gets a cached decision.
    async fn get(&self, key: &CacheKey) -> Option<bool>;

    /// Stores a decision.
    async fn set(&self, key: CacheKey, decision: bool);

    /// Invalidates every entry for a user. Callers invoke this after an
    /// assignment change, before serving further requests.
    async fn invalidate_user(&self, user: &UserId);

    /// Invalidates every entry. Callers invoke this after a role or
    /// permission definition change.
    async fn invalidate_all(&self);
}

/// No-op cache implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

#[async_trait]
impl DecisionCache for NoCache {
    async fn get(&self, _key: &CacheKey) -> Option<bool> {
        None
    }

    async fn set(&self, _key: CacheKey, _decision: bool) {}

    async fn invalidate_user(&self, _user: &UserId) {}

    async fn invalidate_all(&self) {}
}
