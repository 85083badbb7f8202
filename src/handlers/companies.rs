// src/handlers/companies.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    engine::paginate::{PageRequest, Paged},
    models::company::{
        Company, CompanyFilter, CompanyWithAge, CreateCompanyPayload, UpdateCompanyPayload,
    },
    models::import::{ImportOutcome, ImportPayload},
};

// GET /api/companies
#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Empresas",
    params(CompanyFilter, PageRequest),
    responses(
        (status = 200, description = "Página de empresas com idade derivada", body = Paged<CompanyWithAge>),
        (status = 400, description = "Cursor de paginação inválido")
    )
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
    Query(filter): Query<CompanyFilter>,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let companies = app_state.company_service.list(&filter, &page).await?;

    Ok((StatusCode::OK, Json(companies)))
}

// GET /api/companies/{id}
#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    tag = "Empresas",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa encontrada", body = CompanyWithAge),
        (status = 404, description = "Empresa não encontrada")
    )
)]
pub async fn get_company(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.get(id).await?;

    Ok((StatusCode::OK, Json(company)))
}

// GET /api/companies/by-cnpj/{cnpj}
#[utoipa::path(
    get,
    path = "/api/companies/by-cnpj/{cnpj}",
    tag = "Empresas",
    params(("cnpj" = String, Path, description = "CNPJ, com ou sem máscara")),
    responses(
        (status = 200, description = "Empresa encontrada", body = Company),
        (status = 404, description = "Empresa não encontrada")
    )
)]
pub async fn get_company_by_cnpj(
    State(app_state): State<AppState>,
    Path(cnpj): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.get_by_cnpj(&cnpj).await?;

    Ok((StatusCode::OK, Json(company)))
}

// POST /api/companies
#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "Empresas",
    request_body = CreateCompanyPayload,
    responses(
        (status = 201, description = "Empresa criada", body = Company),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Já existe uma empresa com este CNPJ")
    )
)]
pub async fn create_company(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let company = app_state.company_service.create(payload).await?;

    Ok((StatusCode::CREATED, Json(company)))
}

// PATCH /api/companies/{id}
#[utoipa::path(
    patch,
    path = "/api/companies/{id}",
    tag = "Empresas",
    request_body = UpdateCompanyPayload,
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa atualizada", body = Company),
        (status = 404, description = "Empresa não encontrada"),
        (status = 409, description = "CNPJ pertence a outra empresa")
    )
)]
pub async fn update_company(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let company = app_state.company_service.update(id, payload).await?;

    Ok((StatusCode::OK, Json(company)))
}

// DELETE /api/companies/{id}
#[utoipa::path(
    delete,
    path = "/api/companies/{id}",
    tag = "Empresas",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa removida"),
        (status = 404, description = "Empresa não encontrada")
    )
)]
pub async fn delete_company(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.company_service.delete(id).await?;

    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}

// POST /api/companies/import
#[utoipa::path(
    post,
    path = "/api/companies/import",
    tag = "Empresas",
    request_body = ImportPayload,
    responses(
        (status = 200, description = "Resumo do lote importado", body = ImportOutcome),
        (status = 400, description = "Importação malformada (cabeçalho ou lote vazio)"),
        (status = 422, description = "Violações de validação por linha; nada foi gravado")
    )
)]
pub async fn import_companies(
    State(app_state): State<AppState>,
    Json(payload): Json<ImportPayload>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state.import_service.import(&payload.rows).await?;

    Ok((StatusCode::OK, Json(outcome)))
}
