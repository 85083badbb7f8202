// src/db/metadata_repo.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::analytics::{CnaeMetadata, StateMetadata},
};

// Dados de referência independentes (CNAEs e UFs). As contagens cacheadas
// dessas tabelas não são confiáveis: as consultas recontam ao vivo.
#[derive(Clone)]
pub struct MetadataRepository {
    pool: PgPool,
}

impl MetadataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_cnaes(&self) -> Result<Vec<CnaeMetadata>, AppError> {
        let cnaes = sqlx::query_as::<_, CnaeMetadata>(
            "SELECT code, name, is_active, total_companies FROM cnae_metadata ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(cnaes)
    }

    pub async fn list_states(&self) -> Result<Vec<StateMetadata>, AppError> {
        let states = sqlx::query_as::<_, StateMetadata>(
            "SELECT code, name, region, total_companies FROM states ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(states)
    }
}
