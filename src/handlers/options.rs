// src/handlers/options.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::analytics::{IndustryOption, MunicipalityOption, StateOption, UniqueValuesQuery},
};

// GET /api/options/industries
#[utoipa::path(
    get,
    path = "/api/options/industries",
    tag = "Opções",
    responses(
        (status = 200, description = "CNAEs presentes na base, com contagem ao vivo", body = Vec<IndustryOption>)
    )
)]
pub async fn list_industries(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let industries = app_state.analytics_service.unique_industries().await?;

    Ok((StatusCode::OK, Json(industries)))
}

// GET /api/options/states
#[utoipa::path(
    get,
    path = "/api/options/states",
    tag = "Opções",
    responses(
        (status = 200, description = "UFs presentes na base, enriquecidas pela tabela de referência", body = Vec<StateOption>)
    )
)]
pub async fn list_states(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let states = app_state.analytics_service.unique_states().await?;

    Ok((StatusCode::OK, Json(states)))
}

// GET /api/options/states/{uf}/municipalities
#[utoipa::path(
    get,
    path = "/api/options/states/{uf}/municipalities",
    tag = "Opções",
    params(("uf" = String, Path, description = "Sigla da UF, ex.: TO")),
    responses(
        (status = 200, description = "Municípios da UF com contagem, decrescente", body = Vec<MunicipalityOption>)
    )
)]
pub async fn list_municipalities(
    State(app_state): State<AppState>,
    Path(uf): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let municipalities = app_state.analytics_service.municipalities(&uf).await?;

    Ok((StatusCode::OK, Json(municipalities)))
}

// GET /api/options/values
#[utoipa::path(
    get,
    path = "/api/options/values",
    tag = "Opções",
    params(UniqueValuesQuery),
    responses(
        (status = 200, description = "Valores distintos não vazios do campo", body = Vec<String>),
        (status = 400, description = "Campo desconhecido")
    )
)]
pub async fn list_unique_values(
    State(app_state): State<AppState>,
    Query(query): Query<UniqueValuesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let values = app_state.analytics_service.unique_values(query.field).await?;

    Ok((StatusCode::OK, Json(values)))
}
