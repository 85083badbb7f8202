// src/engine/sort.rs

use crate::models::company::Company;

/// Ordenação explícita da coleção filtrada. As listagens usam o padrão
/// (mais recentes primeiro); o comparador fica injetável para os testes
/// não dependerem do relógio de criação dos registros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
}

impl SortOrder {
    /// Ordenação estável: empates de timestamp mantêm a ordem de chegada.
    pub fn apply(self, companies: &mut [Company]) {
        match self {
            SortOrder::CreatedAtDesc => {
                companies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
            SortOrder::CreatedAtAsc => {
                companies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            }
        }
    }
}
