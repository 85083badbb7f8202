// src/engine/filter.rs

use rust_decimal::prelude::ToPrimitive;

use crate::engine::derive;
use crate::models::company::{Company, CompanyFilter};

/// Rótulo de porte que também sinaliza MEI (ver `is_mei`).
const MEI_LABEL: &str = "MEI";

/// Filtro de texto só conta como ativo com conteúdo real; string vazia ou
/// só espaços equivale a ausente.
fn active(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Substring em campo opcional: valor ausente reprova filtro ativo.
fn optional_contains(value: Option<&str>, wanted: &str) -> bool {
    value.is_some_and(|v| contains_ci(v, wanted))
}

/// MEI vem de duas origens que divergem entre os esquemas de ingestão:
/// o flag explícito ou qualquer uma das colunas de porte com o rótulo
/// "MEI". Qualquer sinal basta.
pub fn is_mei(company: &Company) -> bool {
    company.is_mei
        || company.size_class.as_deref() == Some(MEI_LABEL)
        || company.size_class_alt.as_deref() == Some(MEI_LABEL)
}

/// Verdadeiro quando o registro satisfaz todos os predicados ativos
/// (conjunção). O campo `search` não participa: ele é atendido pela
/// primitiva de busca do armazenamento, antes deste funil.
pub fn matches(company: &Company, filter: &CompanyFilter, as_of_year: i32) -> bool {
    // Substring sem diferenciar maiúsculas
    if let Some(wanted) = active(filter.legal_name.as_deref()) {
        if !contains_ci(&company.legal_name, wanted) {
            return false;
        }
    }
    if let Some(wanted) = active(filter.trade_name.as_deref()) {
        if !optional_contains(company.trade_name.as_deref(), wanted) {
            return false;
        }
    }
    if let Some(wanted) = active(filter.neighborhood.as_deref()) {
        if !optional_contains(company.neighborhood.as_deref(), wanted) {
            return false;
        }
    }
    if let Some(wanted) = active(filter.street_address.as_deref()) {
        if !optional_contains(company.street_address.as_deref(), wanted) {
            return false;
        }
    }

    // Substring normalizada por dígitos, dos dois lados
    if let Some(wanted) = active(filter.tax_id.as_deref()) {
        if !digits(&company.tax_id).contains(&digits(wanted)) {
            return false;
        }
    }
    if let Some(wanted) = active(filter.postal_code.as_deref()) {
        let matched = company
            .postal_code
            .as_deref()
            .is_some_and(|cep| digits(cep).contains(&digits(wanted)));
        if !matched {
            return false;
        }
    }

    // Igualdade estrita, sensível a maiúsculas como armazenado
    if let Some(wanted) = active(filter.industry_code.as_deref()) {
        if company.primary_industry_code != wanted {
            return false;
        }
    }
    if let Some(wanted) = active(filter.legal_nature.as_deref()) {
        if company.legal_nature.as_deref() != Some(wanted) {
            return false;
        }
    }
    if let Some(wanted) = active(filter.size_class.as_deref()) {
        if company.size_class.as_deref() != Some(wanted) {
            return false;
        }
    }
    if let Some(wanted) = active(filter.size_class_alt.as_deref()) {
        if company.size_class_alt.as_deref() != Some(wanted) {
            return false;
        }
    }
    if let Some(wanted) = active(filter.corporate_domain.as_deref()) {
        if company.corporate_domain.as_deref() != Some(wanted) {
            return false;
        }
    }
    if let Some(wanted) = active(filter.state.as_deref()) {
        if company.state != wanted {
            return false;
        }
    }
    if let Some(wanted) = active(filter.municipality.as_deref()) {
        if company.municipality != wanted {
            return false;
        }
    }
    if let Some(wanted) = filter.branch_type {
        if company.branch_type != Some(wanted) {
            return false;
        }
    }

    // Intervalo inclusivo de capital; registro sem capital reprova
    // qualquer limite ativo (zero conta como limite ativo)
    if filter.share_capital_min.is_some() || filter.share_capital_max.is_some() {
        let Some(capital) = company.share_capital.as_ref().and_then(ToPrimitive::to_f64)
        else {
            return false;
        };
        if filter.share_capital_min.is_some_and(|min| capital < min) {
            return false;
        }
        if filter.share_capital_max.is_some_and(|max| capital > max) {
            return false;
        }
    }

    // Intervalo de datas: comparação lexicográfica sobre AAAA-MM-DD
    if let Some(from) = active(filter.start_date_from.as_deref()) {
        let matched = company
            .activity_start_date
            .as_deref()
            .is_some_and(|date| date >= from);
        if !matched {
            return false;
        }
    }
    if let Some(to) = active(filter.start_date_to.as_deref()) {
        let matched = company
            .activity_start_date
            .as_deref()
            .is_some_and(|date| date <= to);
        if !matched {
            return false;
        }
    }

    // Intervalo de idade derivada; sem data legível nenhum limite passa
    if filter.age_min.is_some() || filter.age_max.is_some() {
        let Some(age) = derive::age_years(company.activity_start_date.as_deref(), as_of_year)
        else {
            return false;
        };
        if filter.age_min.is_some_and(|min| age < min) {
            return false;
        }
        if filter.age_max.is_some_and(|max| age > max) {
            return false;
        }
    }

    // Tri-estado: ausente não filtra
    if let Some(wanted) = filter.is_mei {
        if is_mei(company) != wanted {
            return false;
        }
    }
    if let Some(wanted) = filter.is_simples_opt_in {
        if company.is_simples_opt_in != wanted {
            return false;
        }
    }
    if let Some(wanted) = filter.has_email {
        if company.has_email != wanted {
            return false;
        }
    }
    if let Some(wanted) = filter.has_phone {
        if company.has_phone != wanted {
            return false;
        }
    }
    if let Some(wanted) = filter.has_website {
        if derive::has_website(company.website.as_deref()) != wanted {
            return false;
        }
    }

    true
}

/// Mantém apenas os registros que passam em todos os predicados ativos,
/// preservando a ordem de entrada. Filtro vazio devolve a coleção intacta.
pub fn apply(companies: Vec<Company>, filter: &CompanyFilter, as_of_year: i32) -> Vec<Company> {
    companies
        .into_iter()
        .filter(|company| matches(company, filter, as_of_year))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::company::test_fixtures::base_company;
    use crate::models::company::BranchType;
    use rust_decimal::Decimal;

    const AS_OF: i32 = 2024;

    fn companies() -> Vec<Company> {
        let raytech = base_company();
        let padaria = Company {
            tax_id: "11222333000181".to_string(),
            legal_name: "PADARIA DOIS IRMAOS LTDA".to_string(),
            trade_name: None,
            email: None,
            website: None,
            state: "SP".to_string(),
            municipality: "CAMPINAS".to_string(),
            neighborhood: None,
            size_class: Some("PEQUENA EMPRESA".to_string()),
            size_class_alt: Some("PEQUENO PORTE".to_string()),
            share_capital: None,
            is_mei: false,
            is_simples_opt_in: false,
            activity_start_date: None,
            has_email: false,
            has_phone: true,
            ..base_company()
        };
        vec![raytech, padaria]
    }

    #[test]
    fn filtro_vazio_e_identidade() {
        let input = companies();
        let output = apply(input.clone(), &CompanyFilter::default(), AS_OF);
        assert_eq!(output, input);
    }

    #[test]
    fn filtro_de_string_vazia_nao_e_ativo() {
        let filter = CompanyFilter {
            legal_name: Some("   ".to_string()),
            state: Some(String::new()),
            ..CompanyFilter::default()
        };
        assert_eq!(apply(companies(), &filter, AS_OF).len(), 2);
    }

    #[test]
    fn substring_ignora_maiusculas() {
        let filter = CompanyFilter {
            legal_name: Some("padaria".to_string()),
            ..CompanyFilter::default()
        };
        let result = apply(companies(), &filter, AS_OF);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].legal_name, "PADARIA DOIS IRMAOS LTDA");
    }

    #[test]
    fn campo_opcional_ausente_reprova_filtro_ativo() {
        // padaria não tem nome fantasia: filtro ativo exclui
        let filter = CompanyFilter {
            trade_name: Some("ray".to_string()),
            ..CompanyFilter::default()
        };
        let result = apply(companies(), &filter, AS_OF);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].trade_name.as_deref(), Some("RAYTECH"));
    }

    #[test]
    fn cnpj_normalizado_por_digitos_dos_dois_lados() {
        let mut punctuated = base_company();
        punctuated.tax_id = "27.083.149/0001-38".to_string();

        let by_plain = CompanyFilter {
            tax_id: Some("27083149000138".to_string()),
            ..CompanyFilter::default()
        };
        let by_punctuated = CompanyFilter {
            tax_id: Some("27.083.149/0001-38".to_string()),
            ..CompanyFilter::default()
        };
        assert!(matches(&punctuated, &by_plain, AS_OF));
        assert!(matches(&base_company(), &by_punctuated, AS_OF));
    }

    #[test]
    fn cep_por_digitos_em_campo_opcional() {
        let filter = CompanyFilter {
            postal_code: Some("77455000".to_string()),
            ..CompanyFilter::default()
        };
        assert!(matches(&base_company(), &filter, AS_OF));

        let mut sem_cep = base_company();
        sem_cep.postal_code = None;
        assert!(!matches(&sem_cep, &filter, AS_OF));
    }

    #[test]
    fn igualdade_estrita_por_estado_e_tipo() {
        let filter = CompanyFilter {
            state: Some("TO".to_string()),
            branch_type: Some(BranchType::Headquarters),
            ..CompanyFilter::default()
        };
        let result = apply(companies(), &filter, AS_OF);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].state, "TO");
    }

    #[test]
    fn mei_por_qualquer_um_dos_sinais() {
        let mut flag_only = base_company();
        flag_only.is_mei = true;
        flag_only.size_class = None;
        flag_only.size_class_alt = None;

        let mut label_only = base_company();
        label_only.is_mei = false;
        label_only.size_class = Some("MEI".to_string());
        label_only.size_class_alt = None;

        let mut alt_label_only = base_company();
        alt_label_only.is_mei = false;
        alt_label_only.size_class = None;
        alt_label_only.size_class_alt = Some("MEI".to_string());

        let mut neither = base_company();
        neither.is_mei = false;
        neither.size_class = Some("MICRO EMPRESA".to_string());
        neither.size_class_alt = None;

        let only_mei = CompanyFilter {
            is_mei: Some(true),
            ..CompanyFilter::default()
        };
        assert!(matches(&flag_only, &only_mei, AS_OF));
        assert!(matches(&label_only, &only_mei, AS_OF));
        assert!(matches(&alt_label_only, &only_mei, AS_OF));
        assert!(!matches(&neither, &only_mei, AS_OF));

        // O mesmo OR vale para o lado negativo do tri-estado
        let sem_mei = CompanyFilter {
            is_mei: Some(false),
            ..CompanyFilter::default()
        };
        assert!(!matches(&label_only, &sem_mei, AS_OF));
        assert!(matches(&neither, &sem_mei, AS_OF));
    }

    #[test]
    fn capital_com_limites_inclusivos() {
        let filter = CompanyFilter {
            share_capital_min: Some(2000.0),
            share_capital_max: Some(2000.0),
            ..CompanyFilter::default()
        };
        // capital exatamente igual aos dois limites passa
        assert!(matches(&base_company(), &filter, AS_OF));

        let mut maior = base_company();
        maior.share_capital = Some(Decimal::new(2001, 0));
        assert!(!matches(&maior, &filter, AS_OF));
    }

    #[test]
    fn capital_ausente_reprova_limite_ativo_mesmo_zero() {
        let mut sem_capital = base_company();
        sem_capital.share_capital = None;

        let filter = CompanyFilter {
            share_capital_min: Some(0.0),
            ..CompanyFilter::default()
        };
        assert!(!matches(&sem_capital, &filter, AS_OF));
        assert!(matches(&base_company(), &filter, AS_OF));
    }

    #[test]
    fn intervalo_de_datas_lexicografico() {
        let dentro = CompanyFilter {
            start_date_from: Some("2017-01-01".to_string()),
            start_date_to: Some("2017-12-31".to_string()),
            ..CompanyFilter::default()
        };
        assert!(matches(&base_company(), &dentro, AS_OF));

        let antes = CompanyFilter {
            start_date_to: Some("2016-12-31".to_string()),
            ..CompanyFilter::default()
        };
        assert!(!matches(&base_company(), &antes, AS_OF));

        let mut sem_data = base_company();
        sem_data.activity_start_date = None;
        let qualquer = CompanyFilter {
            start_date_from: Some("2000-01-01".to_string()),
            ..CompanyFilter::default()
        };
        assert!(!matches(&sem_data, &qualquer, AS_OF));
    }

    #[test]
    fn intervalo_de_idade_derivada() {
        // 2017 em 2024 = 7 anos
        let exatos = CompanyFilter {
            age_min: Some(7),
            age_max: Some(7),
            ..CompanyFilter::default()
        };
        assert!(matches(&base_company(), &exatos, AS_OF));

        let mais_velhas = CompanyFilter {
            age_min: Some(8),
            ..CompanyFilter::default()
        };
        assert!(!matches(&base_company(), &mais_velhas, AS_OF));

        // sem data: reprova filtro de idade ativo, passa sem filtro
        let mut sem_data = base_company();
        sem_data.activity_start_date = None;
        assert!(!matches(&sem_data, &exatos, AS_OF));
        assert!(matches(&sem_data, &CompanyFilter::default(), AS_OF));
    }

    #[test]
    fn tri_estado_de_site_usa_valor_derivado() {
        let mut site_em_branco = base_company();
        site_em_branco.website = Some("   ".to_string());

        let com_site = CompanyFilter {
            has_website: Some(true),
            ..CompanyFilter::default()
        };
        let sem_site = CompanyFilter {
            has_website: Some(false),
            ..CompanyFilter::default()
        };
        assert!(!matches(&site_em_branco, &com_site, AS_OF));
        assert!(matches(&site_em_branco, &sem_site, AS_OF));
        assert!(matches(&base_company(), &com_site, AS_OF));
    }

    #[test]
    fn predicado_adicional_nunca_aumenta_o_resultado() {
        let input = companies();
        let base = CompanyFilter {
            state: Some("TO".to_string()),
            ..CompanyFilter::default()
        };
        let narrowed = CompanyFilter {
            state: Some("TO".to_string()),
            has_email: Some(true),
            ..CompanyFilter::default()
        };
        let wider = apply(input.clone(), &base, AS_OF);
        let narrower = apply(input, &narrowed, AS_OF);
        assert!(narrower.len() <= wider.len());
    }
}
