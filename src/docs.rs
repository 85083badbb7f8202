// src/docs.rs

use utoipa::OpenApi;

use crate::engine::paginate::Paged;
use crate::handlers;
use crate::models;
use crate::models::company::CompanyWithAge;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Empresas ---
        handlers::companies::list_companies,
        handlers::companies::get_company,
        handlers::companies::get_company_by_cnpj,
        handlers::companies::create_company,
        handlers::companies::update_company,
        handlers::companies::delete_company,
        handlers::companies::import_companies,

        // --- Dashboard / Analytics ---
        handlers::analytics::get_stats,
        handlers::analytics::get_dashboard,
        handlers::analytics::get_filter_options,

        // --- Opções ---
        handlers::options::list_industries,
        handlers::options::list_states,
        handlers::options::list_municipalities,
        handlers::options::list_unique_values,

        // --- Exportações ---
        handlers::exports::export_companies,
        handlers::exports::export_regions,
        handlers::exports::clear_export_cache,
    ),
    components(
        schemas(
            // --- Empresas ---
            models::company::BranchType,
            models::company::Company,
            models::company::CompanyWithAge,
            models::company::CreateCompanyPayload,
            models::company::UpdateCompanyPayload,
            models::company::CompanyFilter,
            Paged<CompanyWithAge>,

            // --- Importação ---
            models::import::ImportPayload,
            models::import::ImportViolation,
            models::import::ImportOutcome,

            // --- Dashboard / Analytics ---
            models::analytics::DashboardStats,
            models::analytics::DashboardOverview,
            models::analytics::DashboardContacts,
            models::analytics::RegionRow,
            models::analytics::DashboardData,
            models::analytics::FilterOptions,
            models::analytics::IndustryOption,
            models::analytics::StateOption,
            models::analytics::MunicipalityOption,
            models::analytics::OptionField,
        )
    ),
    tags(
        (name = "Empresas", description = "Cadastro, consulta e importação de empresas"),
        (name = "Dashboard", description = "Contadores e histogramas do painel inicial"),
        (name = "Analytics", description = "Painel analítico e opções de filtro"),
        (name = "Opções", description = "Valores únicos para os dropdowns"),
        (name = "Exportações", description = "Templates CSV com cache por conteúdo")
    )
)]
pub struct ApiDoc;
