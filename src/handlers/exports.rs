// src/handlers/exports.rs

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{common::error::AppError, config::AppState, models::company::CompanyFilter};

/// Resposta CSV para download, com o charset explícito que o Excel espera.
fn csv_response(filename: &str, csv: String) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
}

// POST /api/exports/companies
#[utoipa::path(
    post,
    path = "/api/exports/companies",
    tag = "Exportações",
    request_body = CompanyFilter,
    responses(
        (status = 200, description = "CSV do template de empresas", content_type = "text/csv", body = String),
        (status = 404, description = "Não há dados para exportar")
    )
)]
pub async fn export_companies(
    State(app_state): State<AppState>,
    Json(filter): Json<CompanyFilter>,
) -> Result<impl IntoResponse, AppError> {
    let csv = app_state.export_service.export_companies(&filter).await?;

    Ok(csv_response("empresas.csv", csv))
}

// POST /api/exports/regions
#[utoipa::path(
    post,
    path = "/api/exports/regions",
    tag = "Exportações",
    request_body = CompanyFilter,
    responses(
        (status = 200, description = "CSV da tabela de regiões", content_type = "text/csv", body = String),
        (status = 404, description = "Não há dados para exportar")
    )
)]
pub async fn export_regions(
    State(app_state): State<AppState>,
    Json(filter): Json<CompanyFilter>,
) -> Result<impl IntoResponse, AppError> {
    let csv = app_state.export_service.export_regions(&filter).await?;

    Ok(csv_response("regioes.csv", csv))
}

// POST /api/exports/cache/clear
#[utoipa::path(
    post,
    path = "/api/exports/cache/clear",
    tag = "Exportações",
    responses(
        (status = 200, description = "Quantidade de exportações descartadas do cache")
    )
)]
pub async fn clear_export_cache(State(app_state): State<AppState>) -> impl IntoResponse {
    let cleared = app_state.export_service.clear_cache();

    (StatusCode::OK, Json(json!({ "cleared": cleared })))
}
