use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::import::ImportViolation;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Já existe uma empresa com este CNPJ")]
    DuplicateCnpj,

    #[error("Empresa não encontrada")]
    CompanyNotFound,

    #[error("Cursor de paginação inválido: {0}")]
    InvalidCursor(String),

    // Arquivo irrecuperável no transporte (ex.: colunas obrigatórias
    // ausentes do cabeçalho); rejeitado antes da validação por linha.
    #[error("Importação malformada: {0}")]
    MalformedImport(String),

    // Lote rejeitado atomicamente: nada foi persistido.
    #[error("Importação rejeitada: {} violação(ões) de validação", .0.len())]
    ImportValidation(Vec<ImportViolation>),

    #[error("Não há dados para exportar")]
    EmptyExport,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            // Lista estruturada de violações por (linha, coluna).
            AppError::ImportValidation(violations) => {
                let body = Json(json!({
                    "error": "Importação rejeitada: nenhuma linha foi gravada.",
                    "violations": violations,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::InvalidCursor(ref cursor) => {
                let body = Json(json!({
                    "error": format!("Cursor de paginação inválido: {cursor}"),
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::MalformedImport(ref reason) => {
                let body = Json(json!({
                    "error": format!("Importação malformada: {reason}"),
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::DuplicateCnpj => {
                (StatusCode::CONFLICT, "Já existe uma empresa com este CNPJ.")
            }
            AppError::CompanyNotFound => (StatusCode::NOT_FOUND, "Empresa não encontrada."),
            AppError::EmptyExport => (StatusCode::NOT_FOUND, "Não há dados para exportar."),

            // DatabaseError e InternalServerError viram 500; o `tracing`
            // registra a mensagem detalhada que o `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
