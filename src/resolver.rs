use crate::cache::{CacheKey, DecisionCache, NoCache};
use crate::condition::{CustomEvaluator, evaluate_all};
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::model::Permission;
use crate::store::Store;
use crate::types::{PermissionName, RoleName, UserId};
use chrono::Utc;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Permission is granted.
    Allow,
    /// Permission is denied.
    Deny,
}

/// Permission resolver with pluggable store and optional decision cache.
pub struct Resolver<S, C = NoCache> {
    store: S,
    cache: C,
    max_inherit_depth: usize,
    custom_evaluator: Option<Arc<dyn CustomEvaluator>>,
}

/// Builder for [`Resolver`].
pub struct ResolverBuilder<S, C = NoCache> {
    store: S,
    cache: C,
    max_inherit_depth: usize,
    custom_evaluator: Option<Arc<dyn CustomEvaluator>>,
}

impl<S> ResolverBuilder<S, NoCache> {
    /// Creates a new builder with default configuration.
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: NoCache,
            max_inherit_depth: 16,
            custom_evaluator: None,
        }
    }
}

impl<S, C> ResolverBuilder<S, C> {
    /// Sets maximum inheritance depth.
    pub fn max_inherit_depth(mut self, depth: usize) -> Self {
        self.max_inherit_depth = depth;
        self
    }

    /// Registers the evaluator for custom conditions. Without one, any
    /// permission carrying a custom condition resolves to an error.
    pub fn custom_evaluator(mut self, evaluator: Arc<dyn CustomEvaluator>) -> Self {
        self.custom_evaluator = Some(evaluator);
        self
    }

    /// Sets the cache implementation.
    pub fn cache<C2: DecisionCache>(self, cache: C2) -> ResolverBuilder<S, C2> {
        ResolverBuilder {
            store: self.store,
            cache,
            max_inherit_depth: self.max_inherit_depth,
            custom_evaluator: self.custom_evaluator,
        }
    }

    /// Builds the resolver.
    pub fn build(self) -> Resolver<S, C> {
        Resolver {
            store: self.store,
            cache: self.cache,
            max_inherit_depth: self.max_inherit_depth,
            custom_evaluator: self.custom_evaluator,
        }
    }
}

impl<S, C> Resolver<S, C>
where
    S: Store,
    C: DecisionCache,
{
    /// Answers whether a user holds a permission under a request context.
    ///
    /// Unknown permission names and dangling role references resolve to
    /// `false`, never an error. A cached entry is authoritative: it is
    /// returned without re-evaluation until invalidated.
    pub async fn has_permission(
        &self,
        user: &UserId,
        permission: &PermissionName,
        context: &RequestContext,
    ) -> Result<bool> {
        let key = CacheKey::new(user, permission, context);
        if let Some(cached) = self.cache.get(&key).await {
            debug!(user = %user, permission = %permission, cached, "decision cache hit");
            return Ok(cached);
        }

        let decision = self.resolve(user, permission, context).await?;
        self.cache.set(key, decision).await;
        Ok(decision)
    }

    /// Infallible wrapper over [`Resolver::has_permission`] that fails
    /// closed: a resolution error denies, logged distinctly from an
    /// explicit deny.
    pub async fn check(
        &self,
        user: &UserId,
        permission: &PermissionName,
        context: &RequestContext,
    ) -> Decision {
        match self.has_permission(user, permission, context).await {
            Ok(true) => Decision::Allow,
            Ok(false) => {
                debug!(user = %user, permission = %permission, "permission denied");
                Decision::Deny
            }
            Err(error) => {
                warn!(
                    user = %user,
                    permission = %permission,
                    error = %error,
                    "permission resolution failed; denying"
                );
                Decision::Deny
            }
        }
    }

    /// Returns every permission the user holds under the context, across
    /// all assigned roles, with conditions already evaluated. Intended for
    /// UI gating; results are not cached.
    pub async fn user_permissions(
        &self,
        user: &UserId,
        context: &RequestContext,
    ) -> Result<Vec<Permission>> {
        let assignments = self.store.user_assignments(user).await.map_err(Error::from)?;
        let now = Utc::now();

        let mut names = BTreeSet::new();
        for assignment in &assignments {
            names.extend(self.effective_permission_names(&assignment.role).await?);
        }

        let mut granted = Vec::with_capacity(names.len());
        for name in names {
            let Some(definition) = self
                .store
                .get_permission(&name)
                .await
                .map_err(Error::from)?
            else {
                continue;
            };
            if evaluate_all(
                &definition.conditions,
                context,
                now,
                self.custom_evaluator.as_deref(),
            )? {
                granted.push(definition);
            }
        }
        Ok(granted)
    }

    /// Drops cached decisions for a user. Call after changing the user's
    /// role assignments, before serving further requests.
    pub async fn invalidate_user(&self, user: &UserId) {
        self.cache.invalidate_user(user).await;
    }

    /// Drops every cached decision. Call after changing a role or
    /// permission definition.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all().await;
    }

    async fn resolve(
        &self,
        user: &UserId,
        permission: &PermissionName,
        context: &RequestContext,
    ) -> Result<bool> {
        let assignments = self.store.user_assignments(user).await.map_err(Error::from)?;
        if assignments.is_empty() {
            return Ok(false);
        }

        let now = Utc::now();
        for assignment in &assignments {
            let names = self.effective_permission_names(&assignment.role).await?;
            if !names.contains(permission) {
                continue;
            }
            // Conditions live on the permission definition, so the first
            // role carrying the name decides for every role.
            let Some(definition) = self
                .store
                .get_permission(permission)
                .await
                .map_err(Error::from)?
            else {
                return Ok(false);
            };
            return evaluate_all(
                &definition.conditions,
                context,
                now,
                self.custom_evaluator.as_deref(),
            );
        }

        Ok(false)
    }

    /// Transitive closure of permission names conferred by a role.
    ///
    /// Depth-first over `inherits_from` with an ancestor set, so a cyclic
    /// graph is a detected error rather than a hang. Dangling role names
    /// contribute nothing.
    async fn effective_permission_names(
        &self,
        root: &RoleName,
    ) -> Result<BTreeSet<PermissionName>> {
        let mut names = BTreeSet::new();
        let Some(root_role) = self.store.get_role(root).await.map_err(Error::from)? else {
            return Ok(names);
        };

        let mut visited: HashSet<RoleName> = HashSet::new();
        let mut visiting: HashSet<RoleName> = HashSet::new();

        visiting.insert(root_role.name.clone());
        names.extend(root_role.permissions.iter().cloned());

        let mut stack: Vec<(RoleName, usize, std::collections::btree_set::IntoIter<RoleName>)> =
            vec![(root_role.name, 0, root_role.inherits_from.into_iter())];

        while let Some((current, depth, mut parents)) = stack.pop() {
            if let Some(parent) = parents.next() {
                stack.push((current, depth, parents));

                let next_depth = depth + 1;
                if next_depth > self.max_inherit_depth {
                    return Err(Error::RoleDepthExceeded {
                        role: parent,
                        max_depth: self.max_inherit_depth,
                    });
                }
                if visiting.contains(&parent) {
                    return Err(Error::RoleCycleDetected { role: parent });
                }
                if visited.contains(&parent) {
                    continue;
                }

                let Some(parent_role) =
                    self.store.get_role(&parent).await.map_err(Error::from)?
                else {
                    visited.insert(parent);
                    continue;
                };
                visiting.insert(parent.clone());
                names.extend(parent_role.permissions.iter().cloned());
                stack.push((parent, next_depth, parent_role.inherits_from.into_iter()));
                continue;
            }

            visiting.remove(&current);
            visited.insert(current);
        }

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheKey;
    use crate::condition::{Condition, ContextCondition, ContextOperator, TimeCondition};
    use crate::model::{Permission, Role, RoleAssignment};
    use crate::store::{AssignmentStore, RoleStore};
    use async_trait::async_trait;
    use futures::executor::block_on;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TestStore {
        roles: HashMap<RoleName, Role>,
        permissions: HashMap<PermissionName, Permission>,
        assignments: Mutex<HashMap<UserId, Vec<RoleAssignment>>>,
        assignment_fetches: AtomicUsize,
        fail: bool,
    }

    impl TestStore {
        fn add_role(&mut self, role: Role) {
            self.roles.insert(role.name.clone(), role);
        }

        fn add_permission(&mut self, permission: Permission) {
            self.permissions.insert(permission.name.clone(), permission);
        }

        fn assign(&self, user: &UserId, role: &RoleName) {
            let assignment = RoleAssignment::new(
                user.clone(),
                role.clone(),
                "tests",
                RequestContext::new(),
            );
            self.assignments
                .lock()
                .unwrap()
                .entry(user.clone())
                .or_default()
                .push(assignment);
        }

        fn fetches(&self) -> usize {
            self.assignment_fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RoleStore for TestStore {
        async fn get_role(
            &self,
            role: &RoleName,
        ) -> std::result::Result<Option<Role>, crate::StoreError> {
            if self.fail {
                return Err("store unavailable".into());
            }
            Ok(self.roles.get(role).cloned())
        }

        async fn get_permission(
            &self,
            permission: &PermissionName,
        ) -> std::result::Result<Option<Permission>, crate::StoreError> {
            if self.fail {
                return Err("store unavailable".into());
            }
            Ok(self.permissions.get(permission).cloned())
        }
    }

    #[async_trait]
    impl AssignmentStore for TestStore {
        async fn user_assignments(
            &self,
            user: &UserId,
        ) -> std::result::Result<Vec<RoleAssignment>, crate::StoreError> {
            if self.fail {
                return Err("store unavailable".into());
            }
            self.assignment_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .assignments
                .lock()
                .unwrap()
                .get(user)
                .cloned()
                .unwrap_or_default())
        }
    }

    /// Map-backed cache for instrumented tests.
    #[derive(Default)]
    struct TestCache {
        entries: Mutex<HashMap<CacheKey, bool>>,
    }

    #[async_trait]
    impl DecisionCache for TestCache {
        async fn get(&self, key: &CacheKey) -> Option<bool> {
            self.entries.lock().unwrap().get(key).copied()
        }

        async fn set(&self, key: CacheKey, decision: bool) {
            self.entries.lock().unwrap().insert(key, decision);
        }

        async fn invalidate_user(&self, user: &UserId) {
            self.entries
                .lock()
                .unwrap()
                .retain(|key, _| &key.user != user);
        }

        async fn invalidate_all(&self) {
            self.entries.lock().unwrap().clear();
        }
    }

    fn user(value: &str) -> UserId {
        UserId::new(value).unwrap()
    }

    fn role_name(value: &str) -> RoleName {
        RoleName::new(value).unwrap()
    }

    fn perm_name(value: &str) -> PermissionName {
        PermissionName::new(value).unwrap()
    }

    fn simple_permission(name: &str) -> Permission {
        let (resource, action) = name.split_once('.').unwrap();
        Permission::new(perm_name(name), resource, action)
    }

    #[test]
    fn grants_direct_permission() {
        let mut store = TestStore::default();
        store.add_permission(simple_permission("doc.write"));
        store.add_role(
            Role::new(role_name("editor")).with_permissions([perm_name("doc.write")]),
        );
        let alice = user("alice");
        store.assign(&alice, &role_name("editor"));

        let resolver = ResolverBuilder::new(store).build();
        let granted = block_on(resolver.has_permission(
            &alice,
            &perm_name("doc.write"),
            &RequestContext::new(),
        ))
        .unwrap();

        assert!(granted);
    }

    #[test]
    fn unknown_permission_resolves_false() {
        let mut store = TestStore::default();
        store.add_role(Role::new(role_name("viewer")));
        let alice = user("alice");
        store.assign(&alice, &role_name("viewer"));

        let resolver = ResolverBuilder::new(store).build();
        let granted = block_on(resolver.has_permission(
            &alice,
            &perm_name("nonexistent.permission"),
            &RequestContext::new(),
        ))
        .unwrap();

        assert!(!granted);
    }

    #[test]
    fn user_without_assignments_is_denied() {
        let mut store = TestStore::default();
        store.add_permission(simple_permission("doc.write"));

        let resolver = ResolverBuilder::new(store).build();
        let granted = block_on(resolver.has_permission(
            &user("nobody"),
            &perm_name("doc.write"),
            &RequestContext::new(),
        ))
        .unwrap();

        assert!(!granted);
    }

    #[test]
    fn dangling_role_assignment_contributes_nothing() {
        let store = TestStore::default();
        let alice = user("alice");
        store.assign(&alice, &role_name("ghost"));

        let resolver = ResolverBuilder::new(store).build();
        let granted = block_on(resolver.has_permission(
            &alice,
            &perm_name("doc.write"),
            &RequestContext::new(),
        ))
        .unwrap();

        assert!(!granted);
    }

    #[test]
    fn inheritance_chain_unions_permissions() {
        let mut store = TestStore::default();
        for name in ["parts.read", "order.read", "reports.read"] {
            store.add_permission(simple_permission(name));
        }
        store.add_role(
            Role::new(role_name("employee")).with_permissions([perm_name("parts.read")]),
        );
        store.add_role(
            Role::new(role_name("shop_manager"))
                .with_permissions([perm_name("order.read")])
                .with_inherits([role_name("employee")]),
        );
        store.add_role(
            Role::new(role_name("shop_owner"))
                .with_permissions([perm_name("reports.read")])
                .with_inherits([role_name("shop_manager")]),
        );
        let alice = user("alice");
        store.assign(&alice, &role_name("shop_owner"));

        let resolver = ResolverBuilder::new(store).build();
        for name in ["parts.read", "order.read", "reports.read"] {
            let granted = block_on(resolver.has_permission(
                &alice,
                &perm_name(name),
                &RequestContext::new(),
            ))
            .unwrap();
            assert!(granted, "expected {name} to be granted via inheritance");
        }

        let permissions = block_on(
            resolver.user_permissions(&alice, &RequestContext::new()),
        )
        .unwrap();
        assert_eq!(permissions.len(), 3);
    }

    #[test]
    fn diamond_inheritance_is_not_a_cycle() {
        let mut store = TestStore::default();
        store.add_permission(simple_permission("base.read"));
        store.add_role(
            Role::new(role_name("base")).with_permissions([perm_name("base.read")]),
        );
        store.add_role(Role::new(role_name("left")).with_inherits([role_name("base")]));
        store.add_role(Role::new(role_name("right")).with_inherits([role_name("base")]));
        store.add_role(
            Role::new(role_name("top"))
                .with_inherits([role_name("left"), role_name("right")]),
        );
        let alice = user("alice");
        store.assign(&alice, &role_name("top"));

        let resolver = ResolverBuilder::new(store).build();
        let granted = block_on(resolver.has_permission(
            &alice,
            &perm_name("base.read"),
            &RequestContext::new(),
        ))
        .unwrap();

        assert!(granted);
    }

    #[test]
    fn second_role_grants_after_first_lacks_permission() {
        let mut store = TestStore::default();
        store.add_permission(simple_permission("doc.write"));
        store.add_role(Role::new(role_name("viewer")));
        store.add_role(
            Role::new(role_name("editor")).with_permissions([perm_name("doc.write")]),
        );
        let alice = user("alice");
        store.assign(&alice, &role_name("viewer"));
        store.assign(&alice, &role_name("editor"));

        let resolver = ResolverBuilder::new(store).build();
        let granted = block_on(resolver.has_permission(
            &alice,
            &perm_name("doc.write"),
            &RequestContext::new(),
        ))
        .unwrap();

        assert!(granted);
    }

    #[test]
    fn context_condition_gates_by_tenant() {
        let mut store = TestStore::default();
        store.add_permission(
            Permission::new(perm_name("report.export"), "report", "export").with_conditions(
                vec![Condition::Context(ContextCondition {
                    field: "tenantId".to_string(),
                    operator: ContextOperator::Equals,
                    value: json!("tenant-42"),
                })],
            ),
        );
        store.add_role(
            Role::new(role_name("analyst")).with_permissions([perm_name("report.export")]),
        );
        let alice = user("alice");
        store.assign(&alice, &role_name("analyst"));

        let resolver = ResolverBuilder::new(store).build();
        let matching = RequestContext::new().with("tenantId", "tenant-42");
        let other = RequestContext::new().with("tenantId", "tenant-7");

        assert!(
            block_on(resolver.has_permission(&alice, &perm_name("report.export"), &matching))
                .unwrap()
        );
        assert!(
            !block_on(resolver.has_permission(&alice, &perm_name("report.export"), &other))
                .unwrap()
        );
    }

    #[test]
    fn conditions_are_anded() {
        let mut store = TestStore::default();
        store.add_permission(
            Permission::new(perm_name("report.export"), "report", "export").with_conditions(
                vec![
                    Condition::Context(ContextCondition {
                        field: "tenantId".to_string(),
                        operator: ContextOperator::Equals,
                        value: json!("tenant-42"),
                    }),
                    Condition::Context(ContextCondition {
                        field: "region".to_string(),
                        operator: ContextOperator::Equals,
                        value: json!("eu"),
                    }),
                ],
            ),
        );
        store.add_role(
            Role::new(role_name("analyst")).with_permissions([perm_name("report.export")]),
        );
        let alice = user("alice");
        store.assign(&alice, &role_name("analyst"));

        let resolver = ResolverBuilder::new(store).build();
        let one_true = RequestContext::new()
            .with("tenantId", "tenant-42")
            .with("region", "us");
        let both_true = RequestContext::new()
            .with("tenantId", "tenant-42")
            .with("region", "eu");

        assert!(
            !block_on(resolver.has_permission(&alice, &perm_name("report.export"), &one_true))
                .unwrap()
        );
        assert!(
            block_on(resolver.has_permission(&alice, &perm_name("report.export"), &both_true))
                .unwrap()
        );
    }

    #[test]
    fn role_cycle_is_an_error() {
        let mut store = TestStore::default();
        store.add_role(
            Role::new(role_name("role_a")).with_inherits([role_name("role_b")]),
        );
        store.add_role(
            Role::new(role_name("role_b")).with_inherits([role_name("role_a")]),
        );
        let alice = user("alice");
        store.assign(&alice, &role_name("role_a"));

        let resolver = ResolverBuilder::new(store).build();
        let result = block_on(resolver.has_permission(
            &alice,
            &perm_name("doc.write"),
            &RequestContext::new(),
        ));

        assert!(matches!(result, Err(Error::RoleCycleDetected { .. })));
    }

    #[test]
    fn inherit_depth_is_bounded() {
        let mut store = TestStore::default();
        store.add_role(
            Role::new(role_name("role_a")).with_inherits([role_name("role_b")]),
        );
        store.add_role(
            Role::new(role_name("role_b")).with_inherits([role_name("role_c")]),
        );
        store.add_role(Role::new(role_name("role_c")));
        let alice = user("alice");
        store.assign(&alice, &role_name("role_a"));

        let resolver = ResolverBuilder::new(store).max_inherit_depth(1).build();
        let result = block_on(resolver.has_permission(
            &alice,
            &perm_name("doc.write"),
            &RequestContext::new(),
        ));

        assert!(matches!(result, Err(Error::RoleDepthExceeded { .. })));
    }

    #[test]
    fn cached_decision_skips_the_store() {
        let mut store = TestStore::default();
        store.add_permission(simple_permission("doc.write"));
        store.add_role(
            Role::new(role_name("editor")).with_permissions([perm_name("doc.write")]),
        );
        let alice = user("alice");
        store.assign(&alice, &role_name("editor"));

        let resolver = ResolverBuilder::new(store).cache(TestCache::default()).build();
        let context = RequestContext::new().with("tenantId", "tenant-42");

        let first =
            block_on(resolver.has_permission(&alice, &perm_name("doc.write"), &context)).unwrap();
        let fetches_after_first = resolver.store.fetches();
        let second =
            block_on(resolver.has_permission(&alice, &perm_name("doc.write"), &context)).unwrap();

        assert_eq!(first, second);
        assert_eq!(resolver.store.fetches(), fetches_after_first);
    }

    #[test]
    fn different_contexts_use_different_cache_entries() {
        let mut store = TestStore::default();
        store.add_permission(
            Permission::new(perm_name("report.export"), "report", "export").with_conditions(
                vec![Condition::Context(ContextCondition {
                    field: "tenantId".to_string(),
                    operator: ContextOperator::Equals,
                    value: json!("tenant-42"),
                })],
            ),
        );
        store.add_role(
            Role::new(role_name("analyst")).with_permissions([perm_name("report.export")]),
        );
        let alice = user("alice");
        store.assign(&alice, &role_name("analyst"));

        let resolver = ResolverBuilder::new(store).cache(TestCache::default()).build();
        let matching = RequestContext::new().with("tenantId", "tenant-42");
        let other = RequestContext::new().with("tenantId", "tenant-7");

        assert!(
            block_on(resolver.has_permission(&alice, &perm_name("report.export"), &matching))
                .unwrap()
        );
        assert!(
            !block_on(resolver.has_permission(&alice, &perm_name("report.export"), &other))
                .unwrap()
        );
    }

    #[test]
    fn invalidation_unmasks_newly_assigned_role() {
        let mut store = TestStore::default();
        store.add_permission(simple_permission("doc.write"));
        store.add_role(
            Role::new(role_name("editor")).with_permissions([perm_name("doc.write")]),
        );
        let alice = user("alice");

        let resolver = ResolverBuilder::new(store).cache(TestCache::default()).build();
        let context = RequestContext::new();

        let before =
            block_on(resolver.has_permission(&alice, &perm_name("doc.write"), &context)).unwrap();
        assert!(!before);

        resolver.store.assign(&alice, &role_name("editor"));

        // Stale entry still answers until the caller invalidates.
        let stale =
            block_on(resolver.has_permission(&alice, &perm_name("doc.write"), &context)).unwrap();
        assert!(!stale);

        block_on(resolver.invalidate_user(&alice));
        let after =
            block_on(resolver.has_permission(&alice, &perm_name("doc.write"), &context)).unwrap();
        assert!(after);
    }

    #[test]
    fn check_fails_closed_on_store_error() {
        let store = TestStore {
            fail: true,
            ..TestStore::default()
        };

        let resolver = ResolverBuilder::new(store).build();
        let decision = block_on(resolver.check(
            &user("alice"),
            &perm_name("doc.write"),
            &RequestContext::new(),
        ));

        assert_eq!(decision, Decision::Deny);
    }

    #[test]
    fn check_fails_closed_on_unregistered_custom_condition() {
        let mut store = TestStore::default();
        store.add_permission(
            Permission::new(perm_name("payout.approve"), "payout", "approve").with_conditions(
                vec![Condition::Custom(crate::condition::CustomCondition {
                    name: "risk_score".to_string(),
                    params: json!({"max": 70}),
                })],
            ),
        );
        store.add_role(
            Role::new(role_name("treasurer")).with_permissions([perm_name("payout.approve")]),
        );
        let alice = user("alice");
        store.assign(&alice, &role_name("treasurer"));

        let resolver = ResolverBuilder::new(store).build();
        let result = block_on(resolver.has_permission(
            &alice,
            &perm_name("payout.approve"),
            &RequestContext::new(),
        ));
        assert!(matches!(result, Err(Error::MissingCustomEvaluator { .. })));

        let decision = block_on(resolver.check(
            &alice,
            &perm_name("payout.approve"),
            &RequestContext::new(),
        ));
        assert_eq!(decision, Decision::Deny);
    }

    #[test]
    fn user_permissions_filters_by_condition() {
        let mut store = TestStore::default();
        store.add_permission(simple_permission("parts.read"));
        store.add_permission(
            Permission::new(perm_name("report.export"), "report", "export").with_conditions(
                vec![Condition::Context(ContextCondition {
                    field: "tenantId".to_string(),
                    operator: ContextOperator::Equals,
                    value: json!("tenant-42"),
                })],
            ),
        );
        store.add_role(Role::new(role_name("analyst")).with_permissions([
            perm_name("parts.read"),
            perm_name("report.export"),
        ]));
        let alice = user("alice");
        store.assign(&alice, &role_name("analyst"));

        let resolver = ResolverBuilder::new(store).build();
        let context = RequestContext::new().with("tenantId", "tenant-7");
        let permissions = block_on(resolver.user_permissions(&alice, &context)).unwrap();

        let names: Vec<&str> = permissions.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["parts.read"]);
    }

    #[test]
    fn user_permissions_spans_all_roles() {
        let mut store = TestStore::default();
        store.add_permission(simple_permission("parts.read"));
        store.add_permission(simple_permission("order.read"));
        store.add_role(
            Role::new(role_name("viewer")).with_permissions([perm_name("parts.read")]),
        );
        store.add_role(
            Role::new(role_name("clerk")).with_permissions([perm_name("order.read")]),
        );
        let alice = user("alice");
        store.assign(&alice, &role_name("viewer"));
        store.assign(&alice, &role_name("clerk"));

        let resolver = ResolverBuilder::new(store).build();
        let permissions =
            block_on(resolver.user_permissions(&alice, &RequestContext::new())).unwrap();

        assert_eq!(permissions.len(), 2);
    }

    #[test]
    fn weekday_condition_applies_through_resolver() {
        // Resolution uses wall-clock now; assert only the shape that holds
        // on any day: an impossible day list always denies.
        let mut store = TestStore::default();
        store.add_permission(
            Permission::new(perm_name("batch.run"), "batch", "run").with_conditions(vec![
                Condition::Time(TimeCondition::Days { days: vec![7] }),
            ]),
        );
        store.add_role(
            Role::new(role_name("operator")).with_permissions([perm_name("batch.run")]),
        );
        let alice = user("alice");
        store.assign(&alice, &role_name("operator"));

        let resolver = ResolverBuilder::new(store).build();
        let granted = block_on(resolver.has_permission(
            &alice,
            &perm_name("batch.run"),
            &RequestContext::new(),
        ))
        .unwrap();

        assert!(!granted);
    }
}
