//! Concurrency tests against the report service
//!
//! Racing callers must never produce two reports for one month, lose entries,
//! or apply the same transition twice.

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use futures_util::future::join_all;
use helpers::*;
use rust_decimal_macros::dec;

use schoolreports::modules::reports::ReportStatus;
use schoolreports::AppError;

fn context() -> TestContext {
    let ctx = TestContext::new();
    ctx.grant_all(U1, LOCAL_CLERK);
    ctx.grant_all(U2, LOCAL_CLERK);
    ctx.grant(ADMIN, "reports:global:write");
    ctx.grant(ADMIN, "reports:global:read");
    ctx
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creation_yields_single_report() {
    let ctx = context();

    let callers = [
        (U1_TOKEN, SCHOOL_U1),
        (U2_TOKEN, SCHOOL_U2),
        (ADMIN_TOKEN, SCHOOL_U1),
        (ADMIN_TOKEN, SCHOOL_U2),
        (U1_TOKEN, SCHOOL_U1),
        (U2_TOKEN, SCHOOL_U2),
        (ADMIN_TOKEN, 9),
        (U1_TOKEN, SCHOOL_U1),
    ];

    let handles = callers.iter().map(|&(token, school_id)| {
        let service = Arc::clone(&ctx.service);
        tokio::spawn(async move {
            service
                .create_monthly_report(token, school_id, 2024, 3, None)
                .await
        })
    });

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let created = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::Conflict(_))))
        .count();

    assert_eq!(created, 1);
    assert_eq!(conflicts, callers.len() - 1);

    let all = ctx
        .service
        .list_monthly_reports(ADMIN_TOKEN, None, 0, 100)
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_different_months_are_created_independently() {
    let ctx = context();

    let handles = (1..=12u32).map(|month| {
        let service = Arc::clone(&ctx.service);
        tokio::spawn(async move {
            service
                .create_monthly_report(U1_TOKEN, SCHOOL_U1, 2024, month, None)
                .await
        })
    });

    for joined in join_all(handles).await {
        assert!(joined.expect("task panicked").is_ok());
    }

    let own = ctx
        .service
        .list_monthly_reports(U1_TOKEN, Some(SCHOOL_U1), 0, 100)
        .await
        .unwrap();
    assert_eq!(own.len(), 12);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_entry_upserts_all_land() {
    let ctx = context();
    ctx.service
        .create_monthly_report(U1_TOKEN, SCHOOL_U1, 2024, 3, None)
        .await
        .unwrap();

    let handles = (1..=31u32).map(|day| {
        let service = Arc::clone(&ctx.service);
        tokio::spawn(async move {
            service
                .upsert_entry(U1_TOKEN, SCHOOL_U1, 2024, 3, day, dec!(10), dec!(1))
                .await
        })
    });

    for joined in join_all(handles).await {
        assert!(joined.expect("task panicked").is_ok());
    }

    let daily = ctx
        .service
        .get_daily_financial_report(U1_TOKEN, SCHOOL_U1, 2024, 3)
        .await
        .unwrap();
    assert_eq!(daily.entries.len(), 31);
    assert_eq!(daily.total_sales(), dec!(310));
    assert!(daily.entries.windows(2).all(|w| w[0].day < w[1].day));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submit_applies_once() {
    let ctx = context();
    ctx.service
        .create_monthly_report(U1_TOKEN, SCHOOL_U1, 2024, 3, None)
        .await
        .unwrap();
    ctx.service
        .upsert_entry(U1_TOKEN, SCHOOL_U1, 2024, 3, 1, dec!(5), dec!(0))
        .await
        .unwrap();

    let handles = (0..6).map(|_| {
        let service = Arc::clone(&ctx.service);
        tokio::spawn(async move {
            service
                .transition_daily_financial_report(
                    U1_TOKEN,
                    SCHOOL_U1,
                    2024,
                    3,
                    ReportStatus::Submitted,
                )
                .await
        })
    });

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, AppError::InvalidState(_))));
}
