// src/engine/aggregate.rs

use std::collections::BTreeMap;

use crate::engine::{derive, filter};
use crate::models::analytics::{DashboardStats, RegionRow};
use crate::models::company::Company;

/// Balde sentinela dos agrupamentos sem valor.
pub const NOT_INFORMED: &str = "Não informado";

/// Histograma de chave única sobre o conjunto já filtrado. Valor ausente
/// ou em branco cai no balde sentinela, nunca é descartado: a soma dos
/// baldes é sempre o total filtrado.
pub fn histogram<F>(companies: &[Company], key_fn: F) -> BTreeMap<String, u64>
where
    F: Fn(&Company) -> Option<&str>,
{
    let mut buckets = BTreeMap::new();
    for company in companies {
        let key = key_fn(company)
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .unwrap_or(NOT_INFORMED);
        *buckets.entry(key.to_string()).or_insert(0u64) += 1;
    }
    buckets
}

/// Tabela por região: agrupa pela tripla (UF, município, bairro), bairro
/// ausente vira o sentinela. Decrescente por contagem; empates ficam em
/// ordem alfabética da tripla por estabilidade.
pub fn region_rows(companies: &[Company]) -> Vec<RegionRow> {
    let mut counts: BTreeMap<(String, String, String), u64> = BTreeMap::new();
    for company in companies {
        let neighborhood = company
            .neighborhood
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(NOT_INFORMED);
        let key = (
            company.state.clone(),
            company.municipality.clone(),
            neighborhood.to_string(),
        );
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut rows: Vec<RegionRow> = counts
        .into_iter()
        .map(|((state, municipality, neighborhood), count)| RegionRow {
            state,
            municipality,
            neighborhood,
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Idade média sobre o subconjunto com idade conhecida, arredondada para
/// uma casa decimal. Subconjunto vazio vale 0.0.
pub fn average_age(companies: &[Company], as_of_year: i32) -> f64 {
    let ages: Vec<i32> = companies
        .iter()
        .filter_map(|c| derive::age_years(c.activity_start_date.as_deref(), as_of_year))
        .collect();
    if ages.is_empty() {
        return 0.0;
    }
    let sum: i64 = ages.iter().map(|&age| i64::from(age)).sum();
    let mean = sum as f64 / ages.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Percentual inteiro mais próximo; total zero vale 0 em vez de dividir.
pub fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

/// Estatísticas do painel sobre o conjunto já filtrado. MEI usa o mesmo
/// predicado de dupla origem do filtro; o porte do painel vem da coluna
/// `porte` (size_class) — `porte_empresa` alimenta só as opções de filtro.
pub fn dashboard_stats(companies: &[Company]) -> DashboardStats {
    DashboardStats {
        total: companies.len(),
        mei: companies.iter().filter(|c| filter::is_mei(c)).count(),
        simples: companies.iter().filter(|c| c.is_simples_opt_in).count(),
        with_email: companies.iter().filter(|c| c.has_email).count(),
        with_phone: companies.iter().filter(|c| c.has_phone).count(),
        with_whatsapp: companies
            .iter()
            .filter(|c| c.whatsapp_link_1.as_deref().is_some_and(|w| !w.is_empty()))
            .count(),
        with_website: companies
            .iter()
            .filter(|c| derive::has_website(c.website.as_deref()))
            .count(),
        by_size_class: histogram(companies, |c| c.size_class.as_deref()),
        by_state: histogram(companies, |c| Some(c.state.as_str())),
        by_municipality: histogram(companies, |c| Some(c.municipality.as_str())),
        by_industry_code: histogram(companies, |c| Some(c.primary_industry_code.as_str())),
    }
}
