use chrono::{DateTime, Utc};

/// Category of an audited mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    /// A permission definition changed.
    PermissionChange,
    /// A role definition changed.
    RoleChange,
    /// A role was assigned to or removed from a user.
    RoleAssignment,
}

/// Record describing a single audited mutation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AuditEvent {
    /// Mutation category.
    pub kind: AuditKind,
    /// Mutation verb, e.g. `create`, `assign`, `remove`.
    pub action: String,
    /// Name of the affected permission, role, or `user/role` pair.
    pub subject: String,
    /// When the mutation happened.
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    /// Creates an event stamped with the current time.
    pub fn new(kind: AuditKind, action: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            kind,
            action: action.into(),
            subject: subject.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Fire-and-forget sink for audit records.
///
/// Sinks are infallible from the caller's point of view: a sink that fails
/// internally must swallow the failure, never block or fail the mutation.
pub trait AuditSink: Send + Sync {
    /// Records an event.
    fn record(&self, event: AuditEvent);
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAuditSink;

impl AuditSink for NoAuditSink {
    fn record(&self, _event: AuditEvent) {}
}
