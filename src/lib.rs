//! Conditional RBAC permission resolution.
//!
//! This crate answers "may user U perform permission P under context C?"
//! by walking the user's role assignments, expanding role inheritance,
//! and evaluating each permission's attached conditions against the
//! request context. Stores and caches are pluggable async interfaces;
//! the default behavior is deny-by-default, and resolution failures fail
//! closed.
//!
//! # Examples
//!
//! Basic resolution flow using the in-memory store (enable `memory-store`):
//! ```no_run
//! use rs_permit::{PermissionName, RequestContext, ResolverBuilder, UserId};
//! # #[cfg(feature = "memory-store")]
//! # {
//! use rs_permit::MemoryStore;
//! let store = MemoryStore::new();
//! let resolver = ResolverBuilder::new(store).build();
//! let user = UserId::try_from("user_1").unwrap();
//! let permission = PermissionName::try_from("order.create").unwrap();
//! let context = RequestContext::new().with("tenantId", "tenant_1");
//! let _ = resolver.has_permission(&user, &permission, &context);
//! # }
//! ```
//!
//! Creating a process-local decision cache (enable `memory-cache`):
//! ```no_run
//! # #[cfg(feature = "memory-cache")]
//! # {
//! use rs_permit::MemoryCache;
//! use std::time::Duration;
//! let cache = MemoryCache::new(1024).with_ttl(Duration::from_secs(30));
//! # let _ = cache;
//! # }
//! ```
#![forbid(unsafe_code)]

mod audit;
mod cache;
mod condition;
mod context;
mod error;
mod model;
mod resolver;
mod store;
mod types;

#[cfg(feature = "memory-cache")]
mod memory_cache;

#[cfg(feature = "memory-store")]
mod memory_store;

pub use crate::audit::{AuditEvent, AuditKind, AuditSink, NoAuditSink};
pub use crate::cache::{CacheKey, DecisionCache, NoCache};
pub use crate::condition::{
    Condition, ContextCondition, ContextOperator, CustomCondition, CustomEvaluator,
    LocationCondition, TimeCondition, evaluate_all,
};
pub use crate::context::RequestContext;
pub use crate::error::{Error, Result, StoreError};
pub use crate::model::{Permission, Role, RoleAssignment};
pub use crate::resolver::{Decision, Resolver, ResolverBuilder};
pub use crate::store::{AssignmentStore, RoleStore, Store};
pub use crate::types::{PermissionName, RoleName, UserId};

#[cfg(feature = "memory-store")]
pub use crate::memory_store::MemoryStore;

#[cfg(feature = "memory-cache")]
pub use crate::memory_cache::MemoryCache;
