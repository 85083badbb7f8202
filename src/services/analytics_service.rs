// src/services/analytics_service.rs

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, Utc};

use crate::{
    common::error::AppError,
    db::MetadataRepository,
    engine::{aggregate, derive},
    models::analytics::{
        DashboardContacts, DashboardData, DashboardOverview, DashboardStats, DashboardStatsQuery,
        FilterOptions, IndustryOption, MunicipalityOption, OptionField, StateOption,
    },
    models::company::{Company, CompanyFilter},
    services::CompanyService,
};

const MONTHS_PT_BR: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Rótulo pt-BR do mês corrente, ex.: "agosto de 2026".
fn current_period_label() -> String {
    let now = Utc::now();
    format!("{} de {}", MONTHS_PT_BR[now.month0() as usize], now.year())
}

fn unique_sorted<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    values
        .into_iter()
        .filter_map(|v| v.map(str::trim).filter(|v| !v.is_empty()))
        .map(str::to_owned)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Clone)]
pub struct AnalyticsService {
    companies: CompanyService,
    metadata: MetadataRepository,
}

impl AnalyticsService {
    pub fn new(companies: CompanyService, metadata: MetadataRepository) -> Self {
        Self {
            companies,
            metadata,
        }
    }

    async fn filtered(&self, filter: &CompanyFilter) -> Result<Vec<Company>, AppError> {
        self.companies
            .filtered(filter, derive::current_year())
            .await
    }

    /// Estatísticas do painel inicial, restringíveis por CNAE e UF.
    pub async fn dashboard_stats(
        &self,
        query: DashboardStatsQuery,
    ) -> Result<DashboardStats, AppError> {
        let filter = CompanyFilter {
            industry_code: query.industry_code,
            state: query.state,
            ..CompanyFilter::default()
        };
        let companies = self.filtered(&filter).await?;
        Ok(aggregate::dashboard_stats(&companies))
    }

    /// Painel analítico completo: visão geral, contatos e tabela regional.
    pub async fn dashboard_data(&self, filter: &CompanyFilter) -> Result<DashboardData, AppError> {
        let companies = self.filtered(filter).await?;
        let total = companies.len();

        let with_email = companies.iter().filter(|c| c.has_email).count();
        let with_phone = companies.iter().filter(|c| c.has_phone).count();

        Ok(DashboardData {
            overview: DashboardOverview {
                total,
                average_age_years: aggregate::average_age(&companies, derive::current_year()),
                current_period_label: current_period_label(),
            },
            contacts: DashboardContacts {
                with_email,
                pct_email: aggregate::percentage(with_email, total),
                with_phone,
                pct_phone: aggregate::percentage(with_phone, total),
            },
            by_region: aggregate::region_rows(&companies),
        })
    }

    /// Opções dos dropdowns. Nomes de CNAE vêm da tabela de referência;
    /// as contagens são sempre recalculadas ao vivo.
    pub async fn filter_options(&self) -> Result<FilterOptions, AppError> {
        let companies = self.filtered(&CompanyFilter::default()).await?;
        Ok(FilterOptions {
            legal_natures: unique_sorted(companies.iter().map(|c| c.legal_nature.as_deref())),
            size_classes: unique_sorted(companies.iter().map(|c| c.size_class_alt.as_deref())),
            industries: self.industries_with_counts(&companies).await?,
        })
    }

    pub async fn unique_industries(&self) -> Result<Vec<IndustryOption>, AppError> {
        let companies = self.filtered(&CompanyFilter::default()).await?;
        self.industries_with_counts(&companies).await
    }

    async fn industries_with_counts(
        &self,
        companies: &[Company],
    ) -> Result<Vec<IndustryOption>, AppError> {
        let counts = aggregate::histogram(companies, |c| Some(c.primary_industry_code.as_str()));
        let names: HashMap<String, String> = self
            .metadata
            .list_cnaes()
            .await?
            .into_iter()
            .map(|cnae| (cnae.code, cnae.name))
            .collect();

        // Nome preferencial da tabela de referência; na falta dele, o que
        // os próprios registros carregam
        let fallback: BTreeMap<&str, &str> = companies
            .iter()
            .map(|c| {
                (
                    c.primary_industry_code.as_str(),
                    c.primary_industry_name.as_str(),
                )
            })
            .collect();

        let mut industries: Vec<IndustryOption> = counts
            .into_iter()
            .filter(|(code, count)| *count > 0 && code != aggregate::NOT_INFORMED)
            .map(|(code, count)| {
                let name = names
                    .get(&code)
                    .map(String::as_str)
                    .or_else(|| fallback.get(code.as_str()).copied())
                    .unwrap_or(aggregate::NOT_INFORMED)
                    .to_owned();
                IndustryOption { code, name, count }
            })
            .collect();
        industries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.code.cmp(&b.code)));
        Ok(industries)
    }

    pub async fn unique_states(&self) -> Result<Vec<StateOption>, AppError> {
        let companies = self.filtered(&CompanyFilter::default()).await?;
        let counts = aggregate::histogram(&companies, |c| Some(c.state.as_str()));
        let reference: HashMap<String, (String, String)> = self
            .metadata
            .list_states()
            .await?
            .into_iter()
            .map(|s| (s.code, (s.name, s.region)))
            .collect();

        let mut states: Vec<StateOption> = counts
            .into_iter()
            .filter(|(code, _)| code != aggregate::NOT_INFORMED)
            .map(|(code, count)| {
                let enriched = reference.get(&code);
                StateOption {
                    name: enriched.map(|(name, _)| name.clone()),
                    region: enriched.map(|(_, region)| region.clone()),
                    code,
                    count,
                }
            })
            .collect();
        states.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.code.cmp(&b.code)));
        Ok(states)
    }

    pub async fn municipalities(&self, uf: &str) -> Result<Vec<MunicipalityOption>, AppError> {
        let uf = uf.to_uppercase();
        let filter = CompanyFilter {
            state: Some(uf),
            ..CompanyFilter::default()
        };
        let companies = self.filtered(&filter).await?;
        let counts = aggregate::histogram(&companies, |c| Some(c.municipality.as_str()));

        let mut municipalities: Vec<MunicipalityOption> = counts
            .into_iter()
            .filter(|(name, _)| name != aggregate::NOT_INFORMED)
            .map(|(name, count)| MunicipalityOption { name, count })
            .collect();
        municipalities.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        Ok(municipalities)
    }

    /// Valores distintos não vazios de um campo enumerado, ordenados.
    pub async fn unique_values(&self, field: OptionField) -> Result<Vec<String>, AppError> {
        let companies = self.filtered(&CompanyFilter::default()).await?;
        Ok(unique_sorted(companies.iter().map(|c| field.extract(c))))
    }
}
