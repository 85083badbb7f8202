// src/handlers/analytics.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::analytics::{DashboardData, DashboardStats, DashboardStatsQuery, FilterOptions},
    models::company::CompanyFilter,
};

// GET /api/dashboard/stats
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "Dashboard",
    params(DashboardStatsQuery),
    responses(
        (status = 200, description = "Contadores e histogramas do painel inicial", body = DashboardStats)
    )
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    Query(query): Query<DashboardStatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.analytics_service.dashboard_stats(query).await?;

    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/analytics/dashboard
#[utoipa::path(
    get,
    path = "/api/analytics/dashboard",
    tag = "Analytics",
    params(CompanyFilter),
    responses(
        (status = 200, description = "Visão geral, contatos e tabela regional", body = DashboardData)
    )
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    Query(filter): Query<CompanyFilter>,
) -> Result<impl IntoResponse, AppError> {
    let data = app_state.analytics_service.dashboard_data(&filter).await?;

    Ok((StatusCode::OK, Json(data)))
}

// GET /api/analytics/filter-options
#[utoipa::path(
    get,
    path = "/api/analytics/filter-options",
    tag = "Analytics",
    responses(
        (status = 200, description = "Opções dos dropdowns de filtro", body = FilterOptions)
    )
)]
pub async fn get_filter_options(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let options = app_state.analytics_service.filter_options().await?;

    Ok((StatusCode::OK, Json(options)))
}
