// src/services/import_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::CompanyRepository,
    engine::import::reconcile_rows,
    models::import::{ImportOutcome, RawRow},
};

#[derive(Clone)]
pub struct ImportService {
    repo: CompanyRepository,
    pool: PgPool,
}

impl ImportService {
    pub fn new(repo: CompanyRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    /// Importação em lote, tudo-ou-nada na validação: qualquer violação
    /// rejeita o lote inteiro sem tocar o armazenamento. Passada a
    /// validação, CNPJ já cadastrado é pulado sem sobrescrever (a segunda
    /// ocorrência dentro do próprio lote também, porque a transação enxerga
    /// o que ela mesma inseriu), e o resultado informa `imported < total`.
    pub async fn import(&self, rows: &[RawRow]) -> Result<ImportOutcome, AppError> {
        let candidates = match reconcile_rows(rows) {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("📋 Importação rejeitada na validação: {}", e);
                return Err(e);
            }
        };

        let mut tx = self.pool.begin().await?;
        let mut imported = 0usize;
        for candidate in &candidates {
            if self
                .repo
                .find_by_tax_id(&mut *tx, &candidate.tax_id)
                .await?
                .is_some()
            {
                continue;
            }
            self.repo.insert(&mut *tx, candidate).await?;
            imported += 1;
        }
        tx.commit().await?;

        tracing::info!(
            "📋 Importação concluída: {} de {} linhas inseridas",
            imported,
            rows.len()
        );
        Ok(ImportOutcome {
            imported,
            total: rows.len(),
        })
    }
}
