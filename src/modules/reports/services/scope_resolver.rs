use std::fmt;

/// Whether an actor works on their own school's reports or on another school's
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionScope {
    Local,
    Global,
}

/// Operations guarded by a report permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    Read,
    Write,
    Review,
    Delete,
}

impl PermissionScope {
    /// Local when the actor belongs to the target school; an actor with no school
    /// never matches
    pub fn resolve(actor_school_id: Option<i64>, target_school_id: i64) -> Self {
        if actor_school_id == Some(target_school_id) {
            PermissionScope::Local
        } else {
            PermissionScope::Global
        }
    }

    /// Permission string for `action` under this scope, e.g. `reports:local:read`
    pub fn permission(self, action: ReportAction) -> String {
        format!("reports:{}:{}", self, action)
    }
}

impl fmt::Display for PermissionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionScope::Local => f.write_str("local"),
            PermissionScope::Global => f.write_str("global"),
        }
    }
}

impl fmt::Display for ReportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportAction::Read => f.write_str("read"),
            ReportAction::Write => f.write_str("write"),
            ReportAction::Review => f.write_str("review"),
            ReportAction::Delete => f.write_str("delete"),
        }
    }
}

/// Permission the actor needs to perform `action` on the target school's reports.
/// Pure and total; never touches the store.
pub fn required_permission(
    actor_school_id: Option<i64>,
    target_school_id: i64,
    action: ReportAction,
) -> String {
    PermissionScope::resolve(actor_school_id, target_school_id).permission(action)
}
