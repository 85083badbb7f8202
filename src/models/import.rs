// src/models/import.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Linha crua da importação: nome de coluna de origem → valor textual.
/// Só existe até o estágio de mapeamento; depois dele tudo é tipado.
pub type RawRow = BTreeMap<String, String>;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImportPayload {
    /// Linhas já divididas pelo transporte (cabeçalho não incluso)
    pub rows: Vec<RawRow>,
}

/// Uma violação por (linha, campo), com numeração 1-based do arquivo
/// original: cabeçalho = linha 1, primeira linha de dados = linha 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportViolation {
    pub line: usize,
    /// Nome canônico do campo (camelCase), não a coluna de origem
    pub column: String,
    pub message: String,
}

impl ImportViolation {
    pub fn new(line: usize, column: &str, message: impl Into<String>) -> Self {
        Self {
            line,
            column: column.to_string(),
            message: message.into(),
        }
    }
}

/// Resultado do lote: `imported < total` significa duplicatas puladas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub imported: usize,
    pub total: usize,
}
