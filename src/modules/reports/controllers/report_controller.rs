use std::sync::Arc;

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::error::AppError;
use crate::core::PageQuery;
use crate::middleware::auth::BearerToken;
use crate::modules::reports::models::{DailyEntryData, DailyFinancialReport, ReportStatus};
use crate::modules::reports::services::ReportService;

/// `/{school_id}/{year}/{month}`
#[derive(Debug, Deserialize)]
pub struct ReportPath {
    pub school_id: i64,
    pub year: i32,
    pub month: u32,
}

/// `/{school_id}/{year}/{month}/entries/{day}`
#[derive(Debug, Deserialize)]
pub struct EntryPath {
    pub school_id: i64,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Query parameters for creating a monthly report
#[derive(Debug, Deserialize)]
pub struct CreateReportQuery {
    #[serde(default)]
    pub name: Option<String>,
}

/// Daily report as returned over HTTP, with month totals
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyFinancialReportResponse {
    #[serde(flatten)]
    pub report: DailyFinancialReport,
    pub total_sales: Decimal,
    pub total_purchases: Decimal,
}

impl From<DailyFinancialReport> for DailyFinancialReportResponse {
    fn from(report: DailyFinancialReport) -> Self {
        Self {
            total_sales: report.total_sales(),
            total_purchases: report.total_purchases(),
            report,
        }
    }
}

type ReportServiceData = web::Data<Arc<ReportService>>;

/// List monthly reports of every school
/// GET /v1/reports/monthly
pub async fn list_all_monthly_reports(
    service: ReportServiceData,
    token: BearerToken,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let reports = service
        .list_monthly_reports(token.as_str(), None, query.offset, query.limit)
        .await?;

    Ok(HttpResponse::Ok().json(reports))
}

/// List monthly reports of one school
/// GET /v1/reports/monthly/{school_id}
pub async fn list_school_monthly_reports(
    service: ReportServiceData,
    token: BearerToken,
    path: web::Path<i64>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let reports = service
        .list_monthly_reports(
            token.as_str(),
            Some(path.into_inner()),
            query.offset,
            query.limit,
        )
        .await?;

    Ok(HttpResponse::Ok().json(reports))
}

/// GET /v1/reports/monthly/{school_id}/{year}/{month}
pub async fn get_monthly_report(
    service: ReportServiceData,
    token: BearerToken,
    path: web::Path<ReportPath>,
) -> Result<HttpResponse, AppError> {
    let report = service
        .get_monthly_report(token.as_str(), path.school_id, path.year, path.month)
        .await?;

    Ok(HttpResponse::Ok().json(report))
}

/// Create the monthly report (and its empty daily report)
/// PUT /v1/reports/monthly/{school_id}/{year}/{month}?name=
pub async fn create_monthly_report(
    service: ReportServiceData,
    token: BearerToken,
    path: web::Path<ReportPath>,
    query: web::Query<CreateReportQuery>,
) -> Result<HttpResponse, AppError> {
    let report = service
        .create_monthly_report(
            token.as_str(),
            path.school_id,
            path.year,
            path.month,
            query.into_inner().name,
        )
        .await?;

    Ok(HttpResponse::Created().json(report))
}

/// DELETE /v1/reports/monthly/{school_id}/{year}/{month}
pub async fn delete_monthly_report(
    service: ReportServiceData,
    token: BearerToken,
    path: web::Path<ReportPath>,
) -> Result<HttpResponse, AppError> {
    service
        .delete_monthly_report(token.as_str(), path.school_id, path.year, path.month)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// POST /v1/reports/monthly/{school_id}/{year}/{month}/submit
pub async fn submit_monthly_report(
    service: ReportServiceData,
    token: BearerToken,
    path: web::Path<ReportPath>,
) -> Result<HttpResponse, AppError> {
    let report = service
        .transition_monthly_report(
            token.as_str(),
            path.school_id,
            path.year,
            path.month,
            ReportStatus::Submitted,
        )
        .await?;

    Ok(HttpResponse::Ok().json(report))
}

/// POST /v1/reports/monthly/{school_id}/{year}/{month}/review
pub async fn review_monthly_report(
    service: ReportServiceData,
    token: BearerToken,
    path: web::Path<ReportPath>,
) -> Result<HttpResponse, AppError> {
    let report = service
        .transition_monthly_report(
            token.as_str(),
            path.school_id,
            path.year,
            path.month,
            ReportStatus::Reviewed,
        )
        .await?;

    Ok(HttpResponse::Ok().json(report))
}

/// Daily report with its entries ordered by day
/// GET /v1/reports/daily/{school_id}/{year}/{month}
pub async fn get_daily_financial_report(
    service: ReportServiceData,
    token: BearerToken,
    path: web::Path<ReportPath>,
) -> Result<HttpResponse, AppError> {
    let report = service
        .get_daily_financial_report(token.as_str(), path.school_id, path.year, path.month)
        .await?;

    Ok(HttpResponse::Ok().json(DailyFinancialReportResponse::from(report)))
}

/// POST /v1/reports/daily/{school_id}/{year}/{month}/submit
pub async fn submit_daily_financial_report(
    service: ReportServiceData,
    token: BearerToken,
    path: web::Path<ReportPath>,
) -> Result<HttpResponse, AppError> {
    let report = service
        .transition_daily_financial_report(
            token.as_str(),
            path.school_id,
            path.year,
            path.month,
            ReportStatus::Submitted,
        )
        .await?;

    Ok(HttpResponse::Ok().json(DailyFinancialReportResponse::from(report)))
}

/// POST /v1/reports/daily/{school_id}/{year}/{month}/review
pub async fn review_daily_financial_report(
    service: ReportServiceData,
    token: BearerToken,
    path: web::Path<ReportPath>,
) -> Result<HttpResponse, AppError> {
    let report = service
        .transition_daily_financial_report(
            token.as_str(),
            path.school_id,
            path.year,
            path.month,
            ReportStatus::Reviewed,
        )
        .await?;

    Ok(HttpResponse::Ok().json(DailyFinancialReportResponse::from(report)))
}

/// GET /v1/reports/daily/{school_id}/{year}/{month}/entries/{day}
pub async fn get_entry(
    service: ReportServiceData,
    token: BearerToken,
    path: web::Path<EntryPath>,
) -> Result<HttpResponse, AppError> {
    let entry = service
        .get_entry(token.as_str(), path.school_id, path.year, path.month, path.day)
        .await?;

    Ok(HttpResponse::Ok().json(entry))
}

/// Record or replace the day's sales and purchases
/// PUT /v1/reports/daily/{school_id}/{year}/{month}/entries/{day}
pub async fn upsert_entry(
    service: ReportServiceData,
    token: BearerToken,
    path: web::Path<EntryPath>,
    body: web::Json<DailyEntryData>,
) -> Result<HttpResponse, AppError> {
    let data = body.into_inner();
    let entry = service
        .upsert_entry(
            token.as_str(),
            path.school_id,
            path.year,
            path.month,
            path.day,
            data.sales,
            data.purchases,
        )
        .await?;

    Ok(HttpResponse::Ok().json(entry))
}

/// DELETE /v1/reports/daily/{school_id}/{year}/{month}/entries/{day}
pub async fn delete_entry(
    service: ReportServiceData,
    token: BearerToken,
    path: web::Path<EntryPath>,
) -> Result<HttpResponse, AppError> {
    service
        .delete_entry(token.as_str(), path.school_id, path.year, path.month, path.day)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure report routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/reports")
            .route("/monthly", web::get().to(list_all_monthly_reports))
            .route("/monthly/{school_id}", web::get().to(list_school_monthly_reports))
            .service(
                web::resource("/monthly/{school_id}/{year}/{month}")
                    .route(web::get().to(get_monthly_report))
                    .route(web::put().to(create_monthly_report))
                    .route(web::delete().to(delete_monthly_report)),
            )
            .route(
                "/monthly/{school_id}/{year}/{month}/submit",
                web::post().to(submit_monthly_report),
            )
            .route(
                "/monthly/{school_id}/{year}/{month}/review",
                web::post().to(review_monthly_report),
            )
            .route(
                "/daily/{school_id}/{year}/{month}",
                web::get().to(get_daily_financial_report),
            )
            .route(
                "/daily/{school_id}/{year}/{month}/submit",
                web::post().to(submit_daily_financial_report),
            )
            .route(
                "/daily/{school_id}/{year}/{month}/review",
                web::post().to(review_daily_financial_report),
            )
            .service(
                web::resource("/daily/{school_id}/{year}/{month}/entries/{day}")
                    .route(web::get().to(get_entry))
                    .route(web::put().to(upsert_entry))
                    .route(web::delete().to(delete_entry)),
            ),
    );
}
