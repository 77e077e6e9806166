// Test Helper Modules
//
// Shared fixtures for the contract and integration tests. Most tests drive the
// real actix app through `actix_web::test` on top of the in-memory report store,
// with a permission checker whose grants can be changed per test. The MySQL
// store tests use `test_database` instead.
//
// Usage:
//   #[path = "../helpers/mod.rs"]
//   mod helpers;
//   use helpers::*;
//
// Example:
//   #[actix_web::test]
//   async fn test_create_report() {
//       let ctx = TestContext::new();
//       ctx.grant(U1, "reports:local:write");
//       let app = test::init_service(build_app(&ctx)).await;
//
//       let resp = test::call_service(&app, put_monthly(U1_TOKEN, 5, 2024, 3)).await;
//       assert_eq!(resp.status(), 201);
//   }

#![allow(dead_code)]

pub mod test_server;

pub use assertions::*;
pub use test_data::*;
pub use test_database::*;
pub use test_server::*;
