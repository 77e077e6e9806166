// Test App Helpers
//
// Builds the production route table over an in-memory store. Permission grants
// are held by `RecordingChecker`, which also records every permission string the
// service asks about so tests can assert on the exact scope chosen.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App,
};
use async_trait::async_trait;

use schoolreports::configure_app;
use schoolreports::middleware::{ErrorLogger, RequestId};
use schoolreports::modules::access::PermissionChecker;
use schoolreports::modules::reports::repositories::InMemoryReportRepository;
use schoolreports::modules::reports::services::{ReportService, ReportServiceSettings};
use schoolreports::Result;

use super::test_data::test_directory;

/// Permission checker with mutable grants and a log of every question asked
#[derive(Default)]
pub struct RecordingChecker {
    grants: Mutex<HashMap<String, HashSet<String>>>,
    asked: Mutex<Vec<(String, String)>>,
}

impl RecordingChecker {
    pub fn grant(&self, actor_id: &str, permission: &str) {
        self.grants
            .lock()
            .unwrap()
            .entry(actor_id.to_string())
            .or_default()
            .insert(permission.to_string());
    }

    pub fn revoke(&self, actor_id: &str, permission: &str) {
        if let Some(set) = self.grants.lock().unwrap().get_mut(actor_id) {
            set.remove(permission);
        }
    }

    /// Permissions asked about for `actor_id`, in order
    pub fn asked_for(&self, actor_id: &str) -> Vec<String> {
        self.asked
            .lock()
            .unwrap()
            .iter()
            .filter(|(actor, _)| actor == actor_id)
            .map(|(_, permission)| permission.clone())
            .collect()
    }

    pub fn clear_log(&self) {
        self.asked.lock().unwrap().clear();
    }
}

#[async_trait]
impl PermissionChecker for RecordingChecker {
    async fn is_allowed(&self, actor_id: &str, permission: &str) -> Result<bool> {
        self.asked
            .lock()
            .unwrap()
            .push((actor_id.to_string(), permission.to_string()));

        Ok(self
            .grants
            .lock()
            .unwrap()
            .get(actor_id)
            .map(|set| set.contains(permission))
            .unwrap_or(false))
    }
}

/// Service plus the checker that controls it
pub struct TestContext {
    pub service: Arc<ReportService>,
    pub checker: Arc<RecordingChecker>,
}

impl TestContext {
    pub fn new() -> Self {
        let checker = Arc::new(RecordingChecker::default());
        let service = Arc::new(ReportService::new(
            Arc::new(InMemoryReportRepository::new()),
            Arc::new(test_directory()),
            checker.clone(),
            ReportServiceSettings {
                permission_timeout: Duration::from_millis(500),
                max_page_size: 100,
            },
        ));

        Self { service, checker }
    }

    pub fn grant(&self, actor_id: &str, permission: &str) -> &Self {
        self.checker.grant(actor_id, permission);
        self
    }

    pub fn grant_all(&self, actor_id: &str, permissions: &[&str]) -> &Self {
        for permission in permissions {
            self.checker.grant(actor_id, permission);
        }
        self
    }
}

/// Every local permission a school clerk normally holds
pub const LOCAL_CLERK: &[&str] = &[
    "reports:local:read",
    "reports:local:write",
    "reports:local:delete",
];

/// The application as the binary assembles it, minus the tracing root span
pub fn build_app(
    ctx: &TestContext,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ctx.service.clone()))
        .wrap(ErrorLogger)
        .wrap(RequestId)
        .configure(configure_app)
}
