// src/engine/derive.rs

use chrono::{Datelike, Utc};

use crate::models::company::{Company, CompanyWithAge};

/// Idade em anos: ano de referência menos o ano extraído dos quatro
/// primeiros caracteres da data. Data ausente ou ilegível vira `None`,
/// nunca erro.
pub fn age_years(activity_start_date: Option<&str>, as_of_year: i32) -> Option<i32> {
    let date = activity_start_date?.trim();
    let year: i32 = date.get(..4)?.parse().ok()?;
    Some(as_of_year - year)
}

/// Site presente = texto não vazio depois do trim.
pub fn has_website(website: Option<&str>) -> bool {
    website.is_some_and(|site| !site.trim().is_empty())
}

/// Anexa a idade calculada ao registro. Puro e idempotente: duas chamadas
/// com o mesmo ano de referência produzem a mesma saída.
pub fn augment(company: Company, as_of_year: i32) -> CompanyWithAge {
    let age_years = age_years(company.activity_start_date.as_deref(), as_of_year);
    CompanyWithAge { company, age_years }
}

/// Ano corrente, a referência padrão das consultas.
pub fn current_year() -> i32 {
    Utc::now().year()
}
