//! Contract tests for the reports API
//!
//! Validates response shapes, status codes and the error envelope of the
//! `/v1/reports` routes.

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::test;
use helpers::*;

#[actix_web::test]
async fn test_monthly_report_response_shape() {
    let ctx = TestContext::new();
    ctx.grant_all(U1, LOCAL_CLERK);
    let app = test::init_service(build_app(&ctx)).await;

    let req = put_monthly(U1_TOKEN, SCHOOL_U1, 2024, 3)
        .uri(&format!("{}?name=March%20takings", monthly_uri(SCHOOL_U1, 2024, 3)))
        .to_request();
    let body = expect_json(test::call_service(&app, req).await, 201).await;

    assert_eq!(body["id"], "2024-03-01");
    assert_eq!(body["name"], "March takings");
    assert_eq!(body["submittedBySchool"], SCHOOL_U1);
    assert_eq!(body["reportStatus"], "draft");
    assert_eq!(body["preparedBy"], U1);
    assert!(body["notedBy"].is_null());
    assert!(body["lastModified"].is_string());
}

#[actix_web::test]
async fn test_daily_report_response_shape() {
    let ctx = TestContext::new();
    ctx.grant_all(U1, LOCAL_CLERK);
    let app = test::init_service(build_app(&ctx)).await;

    test::call_service(&app, put_monthly(U1_TOKEN, SCHOOL_U1, 2024, 3).to_request()).await;
    let req = put_entry(U1_TOKEN, SCHOOL_U1, 2024, 3, 2, "10.50", "4.25").to_request();
    let entry = expect_json(test::call_service(&app, req).await, 200).await;
    assert_eq!(entry["parent"], "2024-03-01");
    assert_eq!(entry["day"], 2);
    assert_eq!(entry["sales"], "10.50");
    assert_eq!(entry["purchases"], "4.25");

    let req = get(U1_TOKEN, &daily_uri(SCHOOL_U1, 2024, 3)).to_request();
    let body = expect_json(test::call_service(&app, req).await, 200).await;

    assert_eq!(body["parent"], "2024-03-01");
    assert_eq!(body["reportStatus"], "draft");
    assert_eq!(body["preparedBy"], U1);
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);
    assert_eq!(body["totalSales"], "10.50");
    assert_eq!(body["totalPurchases"], "4.25");
}

#[actix_web::test]
async fn test_list_returns_array() {
    let ctx = TestContext::new();
    ctx.grant(U1, "reports:local:read");
    let app = test::init_service(build_app(&ctx)).await;

    let req = get(U1_TOKEN, &format!("/v1/reports/monthly/{}", SCHOOL_U1)).to_request();
    let body = expect_json(test::call_service(&app, req).await, 200).await;
    assert_eq!(body, serde_json::json!([]));
}

#[actix_web::test]
async fn test_missing_token_is_401() {
    let ctx = TestContext::new();
    let app = test::init_service(build_app(&ctx)).await;

    let req = test::TestRequest::get()
        .uri(&monthly_uri(SCHOOL_U1, 2024, 3))
        .to_request();
    expect_error(test::call_service(&app, req).await, 401, "unauthorized").await;
}

#[actix_web::test]
async fn test_unknown_token_is_401() {
    let ctx = TestContext::new();
    let app = test::init_service(build_app(&ctx)).await;

    let req = get("not-a-token", &monthly_uri(SCHOOL_U1, 2024, 3)).to_request();
    expect_error(test::call_service(&app, req).await, 401, "unauthorized").await;
}

#[actix_web::test]
async fn test_denied_is_403() {
    let ctx = TestContext::new();
    let app = test::init_service(build_app(&ctx)).await;

    let req = get(U1_TOKEN, &monthly_uri(SCHOOL_U1, 2024, 3)).to_request();
    expect_error(test::call_service(&app, req).await, 403, "forbidden").await;
}

#[actix_web::test]
async fn test_absent_report_is_404() {
    let ctx = TestContext::new();
    ctx.grant_all(U1, LOCAL_CLERK);
    let app = test::init_service(build_app(&ctx)).await;

    let req = get(U1_TOKEN, &monthly_uri(SCHOOL_U1, 2024, 3)).to_request();
    expect_error(test::call_service(&app, req).await, 404, "not_found").await;

    let req = get(U1_TOKEN, &daily_uri(SCHOOL_U1, 2024, 3)).to_request();
    expect_error(test::call_service(&app, req).await, 404, "not_found").await;
}

#[actix_web::test]
async fn test_invalid_month_is_400() {
    let ctx = TestContext::new();
    ctx.grant_all(U1, LOCAL_CLERK);
    let app = test::init_service(build_app(&ctx)).await;

    let req = put_monthly(U1_TOKEN, SCHOOL_U1, 2024, 13).to_request();
    expect_error(test::call_service(&app, req).await, 400, "invalid_argument").await;
}

#[actix_web::test]
async fn test_non_numeric_path_is_400() {
    let ctx = TestContext::new();
    ctx.grant_all(U1, LOCAL_CLERK);
    let app = test::init_service(build_app(&ctx)).await;

    let req = get(U1_TOKEN, "/v1/reports/monthly/5/2024/march").to_request();
    expect_error(test::call_service(&app, req).await, 400, "invalid_argument").await;
}

#[actix_web::test]
async fn test_malformed_entry_body_is_400() {
    let ctx = TestContext::new();
    ctx.grant_all(U1, LOCAL_CLERK);
    let app = test::init_service(build_app(&ctx)).await;

    test::call_service(&app, put_monthly(U1_TOKEN, SCHOOL_U1, 2024, 3).to_request()).await;

    let req = test::TestRequest::put()
        .uri(&entry_uri(SCHOOL_U1, 2024, 3, 1))
        .insert_header(("Authorization", format!("Bearer {}", U1_TOKEN)))
        .set_json(serde_json::json!({ "sales": "12" }))
        .to_request();
    expect_error(test::call_service(&app, req).await, 400, "invalid_argument").await;
}

#[actix_web::test]
async fn test_negative_amount_is_400() {
    let ctx = TestContext::new();
    ctx.grant_all(U1, LOCAL_CLERK);
    let app = test::init_service(build_app(&ctx)).await;

    test::call_service(&app, put_monthly(U1_TOKEN, SCHOOL_U1, 2024, 3).to_request()).await;

    let req = put_entry(U1_TOKEN, SCHOOL_U1, 2024, 3, 1, "-1", "0").to_request();
    expect_error(test::call_service(&app, req).await, 400, "invalid_argument").await;

    let req = get(U1_TOKEN, &entry_uri(SCHOOL_U1, 2024, 3, 1)).to_request();
    expect_error(test::call_service(&app, req).await, 404, "not_found").await;
}

#[actix_web::test]
async fn test_unstorable_amounts_are_400() {
    let ctx = TestContext::new();
    ctx.grant_all(U1, LOCAL_CLERK);
    let app = test::init_service(build_app(&ctx)).await;

    test::call_service(&app, put_monthly(U1_TOKEN, SCHOOL_U1, 2024, 3).to_request()).await;

    for (sales, purchases) in [("1.23456", "0"), ("0", "1000000000000000"), ("0.00001", "1")] {
        let req = put_entry(U1_TOKEN, SCHOOL_U1, 2024, 3, 1, sales, purchases).to_request();
        expect_error(test::call_service(&app, req).await, 400, "invalid_argument").await;
    }

    let req = get(U1_TOKEN, &entry_uri(SCHOOL_U1, 2024, 3, 1)).to_request();
    expect_error(test::call_service(&app, req).await, 404, "not_found").await;

    let req = put_entry(U1_TOKEN, SCHOOL_U1, 2024, 3, 1, "999999999999999.9999", "0.5").to_request();
    let body = expect_json(test::call_service(&app, req).await, 200).await;
    assert_eq!(body["sales"], "999999999999999.9999");
}

#[actix_web::test]
async fn test_year_outside_date_range_is_400() {
    let ctx = TestContext::new();
    ctx.grant_all(U1, LOCAL_CLERK);
    let app = test::init_service(build_app(&ctx)).await;

    for year in [999, 10000] {
        let req = put_monthly(U1_TOKEN, SCHOOL_U1, year, 3).to_request();
        expect_error(test::call_service(&app, req).await, 400, "invalid_argument").await;
    }

    let req = get(U1_TOKEN, &format!("/v1/reports/monthly/{}", SCHOOL_U1)).to_request();
    let body = expect_json(test::call_service(&app, req).await, 200).await;
    assert_eq!(body, serde_json::json!([]));
}

#[actix_web::test]
async fn test_illegal_transition_is_422() {
    let ctx = TestContext::new();
    ctx.grant_all(U1, LOCAL_CLERK);
    ctx.grant(U1, "reports:local:review");
    let app = test::init_service(build_app(&ctx)).await;

    test::call_service(&app, put_monthly(U1_TOKEN, SCHOOL_U1, 2024, 3).to_request()).await;

    let req = post(U1_TOKEN, &format!("{}/review", monthly_uri(SCHOOL_U1, 2024, 3))).to_request();
    expect_error(test::call_service(&app, req).await, 422, "invalid_state").await;
}

#[actix_web::test]
async fn test_delete_returns_204() {
    let ctx = TestContext::new();
    ctx.grant_all(U1, LOCAL_CLERK);
    let app = test::init_service(build_app(&ctx)).await;

    test::call_service(&app, put_monthly(U1_TOKEN, SCHOOL_U1, 2024, 3).to_request()).await;
    test::call_service(&app, put_entry(U1_TOKEN, SCHOOL_U1, 2024, 3, 1, "1", "1").to_request()).await;

    let resp = test::call_service(
        &app,
        delete(U1_TOKEN, &entry_uri(SCHOOL_U1, 2024, 3, 1)).to_request(),
    )
    .await;
    expect_no_content(&resp);

    let resp = test::call_service(&app, delete(U1_TOKEN, &monthly_uri(SCHOOL_U1, 2024, 3)).to_request()).await;
    expect_no_content(&resp);
}

#[actix_web::test]
async fn test_request_id_header_is_echoed() {
    let ctx = TestContext::new();
    ctx.grant(U1, "reports:local:read");
    let app = test::init_service(build_app(&ctx)).await;

    let req = get(U1_TOKEN, &monthly_uri(SCHOOL_U1, 2024, 3))
        .insert_header(("X-Request-ID", "req-42"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "req-42");
}
