// src/services/export_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    common::{error::AppError, export_cache::ExportCache},
    engine::{aggregate, derive, sort::SortOrder},
    models::company::{Company, CompanyFilter},
    services::CompanyService,
};

/// Ordem de colunas do template de empresas, a mesma das planilhas que o
/// diretório sempre produziu.
const COMPANIES_HEADERS: [&str; 18] = [
    "razao_social",
    "nome_fantasia",
    "cnpj",
    "cnae_principal_codigo",
    "cnae_principal_nome",
    "municipio",
    "estado",
    "bairro",
    "porte",
    "capital_social",
    "idade_empresa",
    "tem_email",
    "tem_telefone",
    "whatsapp_1",
    "whatsapp_2",
    "whatsapp_3",
    "mei",
    "simples",
];

const REGIONS_HEADERS: [&str; 4] = ["estado", "municipio", "bairro", "empresas"];

/// BOM para o Excel reconhecer UTF-8.
const UTF8_BOM: &str = "\u{feff}";

fn format_sim_nao(value: bool) -> &'static str {
    if value { "SIM" } else { "NÃO" }
}

/// CNPJ de 14 dígitos vira `12.345.678/0001-99`; qualquer outro valor sai
/// como está.
fn format_cnpj(value: &str) -> String {
    if value.len() == 14 && value.bytes().all(|b| b.is_ascii_digit()) {
        format!(
            "{}.{}.{}/{}-{}",
            &value[0..2],
            &value[2..5],
            &value[5..8],
            &value[8..12],
            &value[12..14]
        )
    } else {
        value.to_string()
    }
}

/// Agrupa uma sequência de dígitos ASCII com ponto de milhar pt-BR.
fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Moeda pt-BR com duas casas: `R$ 1.234,56`.
fn format_brl(value: &Decimal) -> String {
    let rounded = value.round_dp(2);
    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    let text = rounded.abs().to_string();
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    format!("{sign}R$ {},{fraction:0<2}", group_thousands(integer))
}

fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// CSV com BOM, cabeçalho sem aspas e campos de dados sempre entre aspas
/// (com aspas internas duplicadas).
fn render_csv(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join(","));
    for row in rows {
        lines.push(
            row.iter()
                .map(|field| csv_quote(field))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    format!("{UTF8_BOM}{}", lines.join("\n"))
}

/// Uma linha do template de empresas. Campo opcional ausente sai vazio;
/// idade conhecida (inclusive zero) sai como "N anos".
fn company_row(company: &Company, as_of_year: i32) -> Vec<String> {
    let age = derive::age_years(company.activity_start_date.as_deref(), as_of_year);
    vec![
        company.legal_name.clone(),
        company.trade_name.clone().unwrap_or_default(),
        format_cnpj(&company.tax_id),
        company.primary_industry_code.clone(),
        company.primary_industry_name.clone(),
        company.municipality.clone(),
        company.state.clone(),
        company.neighborhood.clone().unwrap_or_default(),
        company.size_class.clone().unwrap_or_default(),
        company
            .share_capital
            .as_ref()
            .map(format_brl)
            .unwrap_or_default(),
        age.map(|years| format!("{years} anos")).unwrap_or_default(),
        format_sim_nao(company.has_email).to_string(),
        format_sim_nao(company.has_phone).to_string(),
        company.whatsapp_link_1.clone().unwrap_or_default(),
        company.whatsapp_link_2.clone().unwrap_or_default(),
        company.whatsapp_link_3.clone().unwrap_or_default(),
        format_sim_nao(company.is_mei).to_string(),
        format_sim_nao(company.is_simples_opt_in).to_string(),
    ]
}

#[derive(Clone)]
pub struct ExportService {
    companies: CompanyService,
    cache: Arc<ExportCache>,
}

impl ExportService {
    pub fn new(companies: CompanyService, cache: Arc<ExportCache>) -> Self {
        Self { companies, cache }
    }

    /// Chave endereçada pelo conteúdo das linhas já montadas: dados que
    /// mudaram entre duas exportações mudam a chave, então o cache nunca
    /// serve um CSV de um conjunto anterior.
    fn rows_key(template: &str, rows: &[Vec<String>]) -> Result<String, AppError> {
        let source = serde_json::to_string(rows)
            .map_err(|e| AppError::InternalServerError(e.into()))?;
        Ok(ExportCache::content_key(&format!("{template}:{source}")))
    }

    async fn filtered_sorted(
        &self,
        filter: &CompanyFilter,
        as_of_year: i32,
    ) -> Result<Vec<Company>, AppError> {
        let mut companies = self.companies.filtered(filter, as_of_year).await?;
        if companies.is_empty() {
            return Err(AppError::EmptyExport);
        }
        SortOrder::default().apply(&mut companies);
        Ok(companies)
    }

    pub async fn export_companies(&self, filter: &CompanyFilter) -> Result<String, AppError> {
        let as_of_year = derive::current_year();
        let companies = self.filtered_sorted(filter, as_of_year).await?;
        let rows: Vec<Vec<String>> = companies
            .iter()
            .map(|company| company_row(company, as_of_year))
            .collect();

        let key = Self::rows_key("companies", &rows)?;
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let csv = render_csv(&COMPANIES_HEADERS, rows);
        tracing::info!("📊 Exportação de empresas gerada: {} registros", companies.len());
        self.cache.put(key, csv.clone());
        Ok(csv)
    }

    pub async fn export_regions(&self, filter: &CompanyFilter) -> Result<String, AppError> {
        let companies = self
            .filtered_sorted(filter, derive::current_year())
            .await?;
        let regions = aggregate::region_rows(&companies);
        let rows = regions
            .into_iter()
            .map(|row| {
                vec![
                    row.state,
                    row.municipality,
                    row.neighborhood,
                    group_thousands(&row.count.to_string()),
                ]
            })
            .collect::<Vec<_>>();

        let key = Self::rows_key("regions", &rows)?;
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        tracing::info!("📊 Exportação de regiões gerada: {} linhas", rows.len());
        let csv = render_csv(&REGIONS_HEADERS, rows);
        self.cache.put(key, csv.clone());
        Ok(csv)
    }

    pub fn clear_cache(&self) -> usize {
        self.cache.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::company::test_fixtures::base_company;

    #[test]
    fn cnpj_de_14_digitos_recebe_mascara() {
        assert_eq!(format_cnpj("27083149000138"), "27.083.149/0001-38");
    }

    #[test]
    fn cnpj_fora_do_padrao_sai_como_esta() {
        assert_eq!(format_cnpj("123"), "123");
        assert_eq!(format_cnpj("2708314900013X"), "2708314900013X");
    }

    #[test]
    fn moeda_em_formato_pt_br() {
        assert_eq!(format_brl(&Decimal::new(50_000, 0)), "R$ 50.000,00");
        assert_eq!(format_brl(&Decimal::new(123_456, 2)), "R$ 1.234,56");
        assert_eq!(format_brl(&Decimal::new(105, 1)), "R$ 10,50");
        assert_eq!(format_brl(&Decimal::ZERO), "R$ 0,00");
        assert_eq!(format_brl(&Decimal::new(1_234_567_89, 2)), "R$ 1.234.567,89");
    }

    #[test]
    fn agrupamento_de_milhares() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1.234");
        assert_eq!(group_thousands("1234567"), "1.234.567");
    }

    #[test]
    fn aspas_internas_sao_duplicadas() {
        assert_eq!(csv_quote(r#"LOJA "BOA" LTDA"#), r#""LOJA ""BOA"" LTDA""#);
    }

    #[test]
    fn csv_tem_bom_cabecalho_e_campos_entre_aspas() {
        let csv = render_csv(
            &["a", "b"],
            vec![vec!["1".to_string(), "x,y".to_string()]],
        );
        assert!(csv.starts_with(UTF8_BOM));
        let body = csv.strip_prefix(UTF8_BOM).unwrap();
        let mut lines = body.lines();
        assert_eq!(lines.next(), Some("a,b"));
        assert_eq!(lines.next(), Some(r#""1","x,y""#));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn linha_de_empresa_segue_a_ordem_do_template() {
        let company = base_company();
        let row = company_row(&company, 2024);

        assert_eq!(row.len(), COMPANIES_HEADERS.len());
        assert_eq!(row[0], "CRISLLANY BARROS VELOSO 01464580103");
        assert_eq!(row[2], "27.083.149/0001-38");
        assert_eq!(row[8], "MICRO EMPRESA");
        assert_eq!(row[9], "R$ 2.000,00");
        assert_eq!(row[10], "7 anos");
        assert_eq!(row[11], "SIM");
        assert_eq!(row[16], "SIM");
    }

    #[test]
    fn chave_do_cache_muda_quando_os_dados_mudam() {
        let rows_a = vec![vec!["ACME".to_string(), "TO".to_string()]];
        let mut rows_b = rows_a.clone();
        rows_b.push(vec!["NOVA LTDA".to_string(), "SP".to_string()]);

        let key_a = ExportService::rows_key("companies", &rows_a).unwrap();
        let key_b = ExportService::rows_key("companies", &rows_b).unwrap();
        assert_eq!(key_a, ExportService::rows_key("companies", &rows_a).unwrap());
        assert_ne!(key_a, key_b);
        // o mesmo conjunto em templates distintos não colide
        assert_ne!(key_a, ExportService::rows_key("regions", &rows_a).unwrap());
    }

    #[test]
    fn idade_zero_sai_como_zero_anos() {
        let company = Company {
            activity_start_date: Some("2024-03-01".to_string()),
            ..base_company()
        };
        let row = company_row(&company, 2024);
        assert_eq!(row[10], "0 anos");
    }

    #[test]
    fn opcionais_ausentes_saem_vazios() {
        let company = Company {
            trade_name: None,
            neighborhood: None,
            size_class: None,
            share_capital: None,
            activity_start_date: None,
            whatsapp_link_1: None,
            ..base_company()
        };
        let row = company_row(&company, 2024);
        assert_eq!(row[1], "");
        assert_eq!(row[7], "");
        assert_eq!(row[8], "");
        assert_eq!(row[9], "");
        assert_eq!(row[10], "");
        assert_eq!(row[13], "");
    }
}
