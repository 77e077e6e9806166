pub mod report_service;
pub mod scope_resolver;
pub mod status_workflow;

pub use report_service::{ReportService, ReportServiceSettings};
pub use scope_resolver::{required_permission, PermissionScope, ReportAction};
pub use status_workflow::{StatusWorkflow, TransitionContext};
