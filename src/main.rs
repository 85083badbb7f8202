//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod engine;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    // Inicializa o logger, que movemos para o main.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Cadastro, consulta e importação de empresas
    let company_routes = Router::new()
        .route(
            "/",
            get(handlers::companies::list_companies).post(handlers::companies::create_company),
        )
        .route("/import", post(handlers::companies::import_companies))
        .route(
            "/by-cnpj/{cnpj}",
            get(handlers::companies::get_company_by_cnpj),
        )
        .route(
            "/{id}",
            get(handlers::companies::get_company)
                .patch(handlers::companies::update_company)
                .delete(handlers::companies::delete_company),
        );

    // Painel inicial (contadores) e painel analítico
    let dashboard_routes = Router::new().route("/stats", get(handlers::analytics::get_stats));

    let analytics_routes = Router::new()
        .route("/dashboard", get(handlers::analytics::get_dashboard))
        .route(
            "/filter-options",
            get(handlers::analytics::get_filter_options),
        );

    // Valores únicos para os dropdowns
    let options_routes = Router::new()
        .route("/industries", get(handlers::options::list_industries))
        .route("/states", get(handlers::options::list_states))
        .route(
            "/states/{uf}/municipalities",
            get(handlers::options::list_municipalities),
        )
        .route("/values", get(handlers::options::list_unique_values));

    // Exportações CSV
    let export_routes = Router::new()
        .route("/companies", post(handlers::exports::export_companies))
        .route("/regions", post(handlers::exports::export_regions))
        .route("/cache/clear", post(handlers::exports::clear_export_cache));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/companies", company_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/analytics", analytics_routes)
        .nest("/api/options", options_routes)
        .nest("/api/exports", export_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
