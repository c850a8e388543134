// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::report::{Report, ReportFilter},
    services::export_service,
};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn file_stem(filter: &ReportFilter) -> String {
    format!(
        "relatorio_{}_{}",
        filter.start_date.format("%Y-%m-%d"),
        filter.end_date.format("%Y-%m-%d")
    )
}

// GET /api/reports
#[utoipa::path(
    get,
    path = "/api/reports",
    tag = "Reports",
    params(ReportFilter),
    responses(
        (status = 200, description = "Resumo e lançamentos do período", body = Report),
        (status = 400, description = "Data inicial depois da final")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_report(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ReportFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state.report_service
        .build_report(&app_state.db_pool, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/reports/xlsx
#[utoipa::path(
    get,
    path = "/api/reports/xlsx",
    tag = "Reports",
    params(ReportFilter),
    responses(
        (status = 200, description = "Planilha com as abas Resumo, Vendas e Despesas", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Data inicial depois da final")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_xlsx(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ReportFilter>,
) -> Result<Response, ApiError> {
    let report = app_state.report_service
        .build_report(&app_state.db_pool, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let bytes = export_service::report_to_xlsx(&report, &app_state.clock)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}.xlsx\"", file_stem(&filter))),
    ];

    Ok((headers, bytes).into_response())
}

// GET /api/reports/pdf
#[utoipa::path(
    get,
    path = "/api/reports/pdf",
    tag = "Reports",
    params(ReportFilter),
    responses(
        (status = 200, description = "Relatório em PDF", content_type = "application/pdf"),
        (status = 400, description = "Data inicial depois da final")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ReportFilter>,
) -> Result<Response, ApiError> {
    let report = app_state.report_service
        .build_report(&app_state.db_pool, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let settings = app_state.document_service
        .load_settings(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let pdf_bytes = app_state.document_service
        .generate_report_pdf(&report, &settings)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}.pdf\"", file_stem(&filter))),
    ];

    Ok((headers, pdf_bytes).into_response())
}
