// src/models/analytics.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::models::company::Company;

// --- REFERÊNCIA (tabelas independentes, sem relação com companies) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CnaeMetadata {
    pub code: String,
    pub name: String,
    pub is_active: bool,
    // Contagem em cache; nunca confiada — os endpoints recalculam ao vivo
    pub total_companies: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StateMetadata {
    pub code: String,
    pub name: String,
    pub region: String,
    pub total_companies: Option<i64>,
}

// --- ESTATÍSTICAS DO DASHBOARD ---

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DashboardStatsQuery {
    /// Restringe por código CNAE principal
    pub industry_code: Option<String>,
    /// Restringe por UF
    pub state: Option<String>,
}

/// Estatísticas agregadas: contadores simples + histogramas de chave única.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub mei: usize,
    pub simples: usize,
    pub with_email: usize,
    pub with_phone: usize,
    pub with_whatsapp: usize,
    pub with_website: usize,
    pub by_size_class: BTreeMap<String, u64>,
    pub by_state: BTreeMap<String, u64>,
    pub by_municipality: BTreeMap<String, u64>,
    pub by_industry_code: BTreeMap<String, u64>,
}

// --- DADOS DO DASHBOARD ANALÍTICO ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub total: usize,
    /// Média apenas sobre o subconjunto com idade conhecida, 1 casa decimal
    pub average_age_years: f64,
    /// Rótulo pt-BR do período corrente, ex.: "agosto de 2026"
    pub current_period_label: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardContacts {
    pub with_email: usize,
    pub pct_email: u32,
    pub with_phone: usize,
    pub pct_phone: u32,
}

/// Linha da tabela de regiões: chave composta estado/município/bairro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionRow {
    pub state: String,
    pub municipality: String,
    pub neighborhood: String,
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub overview: DashboardOverview,
    pub contacts: DashboardContacts,
    /// Ordenada por contagem decrescente
    pub by_region: Vec<RegionRow>,
}

// --- OPÇÕES DE FILTRO ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndustryOption {
    pub code: String,
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StateOption {
    pub code: String,
    // Enriquecidos pela tabela de referência quando disponível
    pub name: Option<String>,
    pub region: Option<String>,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MunicipalityOption {
    pub name: String,
    pub count: u64,
}

/// Opções para os dropdowns do dashboard analítico.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub legal_natures: Vec<String>,
    pub size_classes: Vec<String>,
    pub industries: Vec<IndustryOption>,
}

// --- VALORES ÚNICOS POR CAMPO ---

/// Campos enumeráveis para o endpoint de valores únicos. Tipado de
/// propósito: campo desconhecido falha na desserialização, não em runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum OptionField {
    LegalNature,
    SizeClass,
    SizeClassAlt,
    CorporateDomain,
    State,
    Municipality,
    Neighborhood,
}

impl OptionField {
    /// Projeta o campo correspondente do registro.
    pub fn extract<'a>(&self, company: &'a Company) -> Option<&'a str> {
        match self {
            OptionField::LegalNature => company.legal_nature.as_deref(),
            OptionField::SizeClass => company.size_class.as_deref(),
            OptionField::SizeClassAlt => company.size_class_alt.as_deref(),
            OptionField::CorporateDomain => company.corporate_domain.as_deref(),
            OptionField::State => Some(company.state.as_str()),
            OptionField::Municipality => Some(company.municipality.as_str()),
            OptionField::Neighborhood => company.neighborhood.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UniqueValuesQuery {
    #[param(inline)]
    pub field: OptionField,
}
