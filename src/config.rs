// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::export_cache::{ExportCache, DEFAULT_TTL},
    db::{CompanyRepository, MetadataRepository},
    services::{AnalyticsService, CompanyService, ExportService, ImportService},
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub company_service: CompanyService,
    pub analytics_service: AnalyticsService,
    pub import_service: ImportService,
    pub export_service: ExportService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let company_repo = CompanyRepository::new(db_pool.clone());
        let metadata_repo = MetadataRepository::new(db_pool.clone());

        let company_service = CompanyService::new(company_repo.clone(), db_pool.clone());
        let analytics_service = AnalyticsService::new(company_service.clone(), metadata_repo);
        let import_service = ImportService::new(company_repo, db_pool.clone());
        // O cache de exportações pertence ao serviço; o Arc só existe para
        // o AppState continuar Clone.
        let export_service = ExportService::new(
            company_service.clone(),
            Arc::new(ExportCache::new(DEFAULT_TTL)),
        );

        Ok(Self {
            db_pool,
            company_service,
            analytics_service,
            import_service,
            export_service,
        })
    }
}
