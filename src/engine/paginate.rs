// src/engine/paginate.rs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::common::error::AppError;

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Recorte pedido pelo cliente. `cursor` é o próximo offset serializado
/// como texto e tem precedência sobre `offset` quando os dois chegam.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct PageRequest {
    pub page_size: Option<usize>,
    pub offset: Option<usize>,
    pub cursor: Option<String>,
}

impl PageRequest {
    /// Offset efetivo do recorte. Cursor ilegível é erro duro: a consulta
    /// nunca volta silenciosamente para a primeira página.
    pub fn resolve_offset(&self) -> Result<usize, AppError> {
        match self.cursor.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| AppError::InvalidCursor(cursor.to_string())),
            None => Ok(self.offset.unwrap_or(0)),
        }
    }

    pub fn effective_page_size(&self) -> usize {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// Página de uma coleção filtrada e ordenada.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub page: Vec<T>,
    pub total: usize,
    pub has_more: bool,
    /// Próximo offset serializado; ausente na última página.
    pub continue_cursor: Option<String>,
}

/// Recorta a coleção segundo o pedido. O cursor é só um offset: ele
/// pressupõe que filtro e ordenação não mudam entre as páginas de uma
/// mesma sessão de navegação (garantia fraca, parte do contrato).
pub fn slice<T>(items: Vec<T>, request: &PageRequest) -> Result<Paged<T>, AppError> {
    let offset = request.resolve_offset()?;
    let page_size = request.effective_page_size();
    let total = items.len();

    let page: Vec<T> = items.into_iter().skip(offset).take(page_size).collect();
    // saturating: um cursor gigantesco vira página vazia, não overflow
    let end = offset.saturating_add(page_size);
    let has_more = end < total;
    let continue_cursor = has_more.then(|| end.to_string());

    Ok(Paged {
        page,
        total,
        has_more,
        continue_cursor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn primeira_pagina_de_120_com_50() {
        let request = PageRequest {
            page_size: Some(50),
            offset: Some(0),
            cursor: None,
        };
        let paged = slice(items(120), &request).unwrap();
        assert_eq!(paged.page.len(), 50);
        assert_eq!(paged.total, 120);
        assert!(paged.has_more);
        assert_eq!(paged.continue_cursor.as_deref(), Some("50"));
    }

    #[test]
    fn ultima_pagina_parcial_encerra() {
        let request = PageRequest {
            page_size: Some(50),
            offset: Some(100),
            cursor: None,
        };
        let paged = slice(items(120), &request).unwrap();
        assert_eq!(paged.page.len(), 20);
        assert!(!paged.has_more);
        assert_eq!(paged.continue_cursor, None);
    }

    #[test]
    fn pagina_exata_no_limite_encerra() {
        let request = PageRequest {
            page_size: Some(50),
            offset: Some(50),
            cursor: None,
        };
        let paged = slice(items(100), &request).unwrap();
        assert_eq!(paged.page.len(), 50);
        assert!(!paged.has_more);
        assert_eq!(paged.continue_cursor, None);
    }

    #[test]
    fn tamanho_padrao_de_pagina_e_50() {
        let paged = slice(items(60), &PageRequest::default()).unwrap();
        assert_eq!(paged.page.len(), DEFAULT_PAGE_SIZE);
        assert!(paged.has_more);
    }

    #[test]
    fn cursor_tem_precedencia_sobre_offset() {
        let request = PageRequest {
            page_size: Some(10),
            offset: Some(90),
            cursor: Some("10".to_string()),
        };
        let paged = slice(items(100), &request).unwrap();
        assert_eq!(paged.page, (10..20).collect::<Vec<_>>());
        assert_eq!(paged.continue_cursor.as_deref(), Some("20"));
    }

    #[test]
    fn cursor_ilegivel_e_erro_duro() {
        let request = PageRequest {
            cursor: Some("abc".to_string()),
            ..PageRequest::default()
        };
        let result = slice(items(10), &request);
        assert!(matches!(result, Err(AppError::InvalidCursor(c)) if c == "abc"));
    }

    #[test]
    fn colecao_vazia_devolve_pagina_vazia() {
        let paged = slice(Vec::<usize>::new(), &PageRequest::default()).unwrap();
        assert!(paged.page.is_empty());
        assert_eq!(paged.total, 0);
        assert!(!paged.has_more);
        assert_eq!(paged.continue_cursor, None);
    }

    #[test]
    fn offset_alem_do_fim_devolve_vazio_sem_erro() {
        let request = PageRequest {
            offset: Some(500),
            ..PageRequest::default()
        };
        let paged = slice(items(10), &request).unwrap();
        assert!(paged.page.is_empty());
        assert_eq!(paged.total, 10);
        assert!(!paged.has_more);
    }
}
