// src/engine/import.rs

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::common::error::AppError;
use crate::models::company::{BranchType, NewCompany};
use crate::models::import::{ImportViolation, RawRow};

/// Linhas de dado começam na linha 2 do arquivo; a 1 é o cabeçalho.
const HEADER_LINES: usize = 1;

/// Colunas de origem que podem suprir cada campo obrigatório. Os arquivos
/// exportados divergem de grafia, então cada campo aceita mais de uma.
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("cnpj", &["cnpj"]),
    ("razao_social", &["razao_social", "razão_social"]),
    ("cnae_principal_codigo", &["cnae_principal_codigo", "cnae_codigo"]),
    ("cnae_principal_nome", &["cnae_principal_nome", "cnae_nome"]),
    ("municipio", &["municipio", "cidade"]),
    ("estado", &["estado", "uf"]),
];

/// Linha crua com as colunas já remapeadas para os campos canônicos.
/// Valores em branco não sobrevivem ao remapeamento.
#[derive(Debug, Default)]
struct MappedRow {
    tax_id: Option<String>,
    legal_name: Option<String>,
    trade_name: Option<String>,
    primary_industry_code: Option<String>,
    primary_industry_name: Option<String>,
    secondary_industry_code: Option<String>,
    secondary_industry_name: Option<String>,
    phone_1: Option<String>,
    phone_2: Option<String>,
    phone_3: Option<String>,
    email: Option<String>,
    accounting_email: Option<String>,
    website: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    neighborhood: Option<String>,
    postal_code: Option<String>,
    street_address: Option<String>,
    map_address: Option<String>,
    maps_url: Option<String>,
    branch_type: Option<String>,
    size_class: Option<String>,
    size_class_alt: Option<String>,
    share_capital: Option<String>,
    is_mei: Option<String>,
    is_simples_opt_in: Option<String>,
    activity_start_date: Option<String>,
    federal_registry_url: Option<String>,
    legal_nature: Option<String>,
    corporate_domain: Option<String>,
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

fn remap(row: &RawRow) -> MappedRow {
    let mut mapped = MappedRow::default();
    for (key, raw_value) in row {
        let value = raw_value.trim();
        if value.is_empty() {
            continue;
        }
        let value = Some(value.to_string());
        match normalize_header(key).as_str() {
            "cnpj" => mapped.tax_id = value,
            "razao_social" | "razão_social" => mapped.legal_name = value,
            "nome_fantasia" => mapped.trade_name = value,
            "cnae_principal_codigo" | "cnae_codigo" => mapped.primary_industry_code = value,
            "cnae_principal_nome" | "cnae_nome" => mapped.primary_industry_name = value,
            "cnae_secundario_codigo" => mapped.secondary_industry_code = value,
            "cnae_secundario_nome" => mapped.secondary_industry_name = value,
            "municipio" | "cidade" => mapped.municipality = value,
            "estado" | "uf" => mapped.state = value,
            "telefone_1" | "telefone" => mapped.phone_1 = value,
            "telefone_2" => mapped.phone_2 = value,
            "telefone_3" => mapped.phone_3 = value,
            "email" => mapped.email = value,
            "email_contabilidade" => mapped.accounting_email = value,
            "site" | "website" => mapped.website = value,
            "bairro" => mapped.neighborhood = value,
            "cep" => mapped.postal_code = value,
            "logradouro" => mapped.street_address = value,
            "endereco_mapa" | "endereco" => mapped.map_address = value,
            "maps" => mapped.maps_url = value,
            "matriz_filial" => mapped.branch_type = value,
            "porte" => mapped.size_class = value,
            "porte_empresa" => mapped.size_class_alt = value,
            "capital_social" => mapped.share_capital = value,
            "mei" => mapped.is_mei = value,
            "simples" | "simples_nacional" => mapped.is_simples_opt_in = value,
            "inicio_atividade" | "data_inicio_atividade" => mapped.activity_start_date = value,
            "receita_federal" => mapped.federal_registry_url = value,
            "natureza_juridica" => mapped.legal_nature = value,
            "dominio_corporativo" => mapped.corporate_domain = value,
            // coluna desconhecida é ignorada
            _ => {}
        }
    }
    mapped
}

/// Booleanos de planilha, nos rótulos usuais em português e inglês.
pub fn parse_bool_like(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "sim" | "true" | "1" | "yes" => Some(true),
        "não" | "nao" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Números de planilha: descarta rótulo de moeda e espaços; ponto de
/// milhar só é removido quando há vírgula decimal, preservando valores
/// já em formato ISO.
pub fn parse_decimal_like(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };
    normalized.parse::<Decimal>().ok()
}

pub fn parse_branch_type(raw: &str) -> Option<BranchType> {
    match raw.trim().to_uppercase().as_str() {
        "MATRIZ" | "HEADQUARTERS" => Some(BranchType::Headquarters),
        "FILIAL" | "BRANCH" => Some(BranchType::Branch),
        _ => None,
    }
}

/// Link de WhatsApp a partir de um telefone; o DDI 55 entra quando o
/// número ainda não o traz.
pub fn whatsapp_link(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let full = if digits.starts_with("55") {
        digits
    } else {
        format!("55{digits}")
    };
    Some(format!("https://api.whatsapp.com/send/?phone={full}"))
}

/// Valida e converte uma linha. Qualquer problema vira violação com a
/// linha 1-based do arquivo original e o nome canônico do campo.
fn reconcile_row(
    index: usize,
    row: &RawRow,
    violations: &mut Vec<ImportViolation>,
) -> Option<NewCompany> {
    let line = index + HEADER_LINES + 1;
    let mapped = remap(row);
    let before = violations.len();

    let tax_id = mapped
        .tax_id
        .as_deref()
        .map(|raw| raw.chars().filter(char::is_ascii_digit).collect::<String>())
        .filter(|digits| !digits.is_empty());
    match tax_id.as_deref() {
        None => violations.push(ImportViolation::new(line, "taxId", "Campo obrigatório")),
        Some(digits) if digits.len() != 14 => violations.push(ImportViolation::new(
            line,
            "taxId",
            "O CNPJ deve ter 14 dígitos",
        )),
        Some(_) => {}
    }
    if mapped.legal_name.is_none() {
        violations.push(ImportViolation::new(line, "legalName", "Campo obrigatório"));
    }
    if mapped.primary_industry_code.is_none() {
        violations.push(ImportViolation::new(
            line,
            "primaryIndustryCode",
            "Campo obrigatório",
        ));
    }
    if mapped.primary_industry_name.is_none() {
        violations.push(ImportViolation::new(
            line,
            "primaryIndustryName",
            "Campo obrigatório",
        ));
    }
    if mapped.municipality.is_none() {
        violations.push(ImportViolation::new(
            line,
            "municipality",
            "Campo obrigatório",
        ));
    }
    if mapped.state.is_none() {
        violations.push(ImportViolation::new(line, "state", "Campo obrigatório"));
    }

    let share_capital = match mapped.share_capital.as_deref() {
        None => None,
        Some(raw) => match parse_decimal_like(raw) {
            Some(capital) if capital.is_sign_negative() => {
                violations.push(ImportViolation::new(
                    line,
                    "shareCapital",
                    "O capital social não pode ser negativo",
                ));
                None
            }
            Some(capital) => Some(capital),
            None => {
                violations.push(ImportViolation::new(
                    line,
                    "shareCapital",
                    format!("Valor numérico inválido: '{raw}'"),
                ));
                None
            }
        },
    };

    let is_mei = match mapped.is_mei.as_deref() {
        None => false,
        Some(raw) => parse_bool_like(raw).unwrap_or_else(|| {
            violations.push(ImportViolation::new(
                line,
                "isMei",
                format!("Valor booleano inválido: '{raw}'"),
            ));
            false
        }),
    };
    let is_simples_opt_in = match mapped.is_simples_opt_in.as_deref() {
        None => false,
        Some(raw) => parse_bool_like(raw).unwrap_or_else(|| {
            violations.push(ImportViolation::new(
                line,
                "isSimplesOptIn",
                format!("Valor booleano inválido: '{raw}'"),
            ));
            false
        }),
    };

    let branch_type = match mapped.branch_type.as_deref() {
        None => None,
        Some(raw) => match parse_branch_type(raw) {
            Some(branch) => Some(branch),
            None => {
                violations.push(ImportViolation::new(
                    line,
                    "branchType",
                    format!("Valor de matriz/filial inválido: '{raw}'"),
                ));
                None
            }
        },
    };

    if violations.len() > before {
        return None;
    }

    let whatsapp_link_1 = mapped.phone_1.as_deref().and_then(whatsapp_link);
    let whatsapp_link_2 = mapped.phone_2.as_deref().and_then(whatsapp_link);
    let whatsapp_link_3 = mapped.phone_3.as_deref().and_then(whatsapp_link);

    let mut company = NewCompany {
        tax_id: tax_id.unwrap_or_default(),
        legal_name: mapped.legal_name.unwrap_or_default(),
        trade_name: mapped.trade_name,
        primary_industry_code: mapped.primary_industry_code.unwrap_or_default(),
        primary_industry_name: mapped.primary_industry_name.unwrap_or_default(),
        secondary_industry_code: mapped.secondary_industry_code,
        secondary_industry_name: mapped.secondary_industry_name,
        phone_1: mapped.phone_1,
        phone_2: mapped.phone_2,
        phone_3: mapped.phone_3,
        email: mapped.email,
        website: mapped.website,
        whatsapp_link_1,
        whatsapp_link_2,
        whatsapp_link_3,
        accounting_email: mapped.accounting_email,
        municipality: mapped.municipality.unwrap_or_default(),
        state: mapped.state.unwrap_or_default().to_uppercase(),
        neighborhood: mapped.neighborhood,
        postal_code: mapped.postal_code,
        street_address: mapped.street_address,
        map_address: mapped.map_address,
        maps_url: mapped.maps_url,
        branch_type,
        size_class: mapped.size_class,
        size_class_alt: mapped.size_class_alt,
        share_capital,
        is_mei,
        is_simples_opt_in,
        activity_start_date: mapped.activity_start_date,
        legal_nature: mapped.legal_nature,
        corporate_domain: mapped.corporate_domain,
        federal_registry_url: mapped.federal_registry_url,
        has_email: false,
        has_phone: false,
    };
    company.recompute_contact_flags();
    Some(company)
}

/// Estágio puro da importação: remapeia, coage e valida o lote inteiro.
/// Qualquer violação rejeita o lote por completo; o chamador só persiste
/// um `Ok`. Colunas obrigatórias ausentes do cabeçalho derrubam o lote
/// antes da validação linha a linha.
pub fn reconcile_rows(rows: &[RawRow]) -> Result<Vec<NewCompany>, AppError> {
    if rows.is_empty() {
        return Err(AppError::MalformedImport(
            "A importação não contém linhas de dados".to_string(),
        ));
    }

    let headers: HashSet<String> = rows[0].keys().map(|key| normalize_header(key)).collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|(_, aliases)| !aliases.iter().any(|alias| headers.contains(*alias)))
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::MalformedImport(format!(
            "Colunas obrigatórias ausentes: {}",
            missing.join(", ")
        )));
    }

    let mut violations = Vec::new();
    let mut companies = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        if let Some(company) = reconcile_row(index, row, &mut violations) {
            companies.push(company);
        }
    }

    if violations.is_empty() {
        Ok(companies)
    } else {
        Err(AppError::ImportValidation(violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn valid_row(cnpj: &str, legal_name: &str) -> RawRow {
        row(&[
            ("cnpj", cnpj),
            ("razao_social", legal_name),
            ("cnae_principal_codigo", "4751201"),
            ("cnae_principal_nome", "COMÉRCIO VAREJISTA DE INFORMÁTICA"),
            ("municipio", "PALMAS"),
            ("estado", "to"),
        ])
    }

    fn violations(result: Result<Vec<NewCompany>, AppError>) -> Vec<ImportViolation> {
        match result {
            Err(AppError::ImportValidation(violations)) => violations,
            other => panic!("esperava violações, obteve {other:?}"),
        }
    }

    #[test]
    fn lote_valido_normaliza_cnpj_e_estado() {
        let rows = vec![valid_row("27.083.149/0001-38", "EMPRESA A LTDA")];
        let companies = reconcile_rows(&rows).unwrap();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].tax_id, "27083149000138");
        assert_eq!(companies[0].state, "TO");
        assert!(!companies[0].has_email);
        assert!(!companies[0].has_phone);
    }

    #[test]
    fn linha_invalida_rejeita_o_lote_inteiro() {
        let mut rows: Vec<RawRow> = (0..10)
            .map(|i| valid_row(&format!("2708314900{i:04}"), "EMPRESA LTDA"))
            .collect();
        // linha 7 de dados (índice 6) sem razão social
        rows[6].insert("razao_social".to_string(), String::new());

        let violations = violations(reconcile_rows(&rows));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 8);
        assert_eq!(violations[0].column, "legalName");
        assert_eq!(violations[0].message, "Campo obrigatório");
    }

    #[test]
    fn cabecalho_sem_coluna_obrigatoria_e_malformado() {
        let mut incompleta = valid_row("27083149000138", "EMPRESA");
        incompleta.remove("estado");

        match reconcile_rows(&[incompleta]) {
            Err(AppError::MalformedImport(message)) => {
                assert!(message.contains("estado"), "mensagem: {message}");
            }
            other => panic!("esperava MalformedImport, obteve {other:?}"),
        }
    }

    #[test]
    fn lote_vazio_e_malformado() {
        assert!(matches!(
            reconcile_rows(&[]),
            Err(AppError::MalformedImport(_))
        ));
    }

    #[test]
    fn apelidos_de_coluna_sao_aceitos() {
        let rows = vec![row(&[
            ("cnpj", "11222333000181"),
            ("razão_social", "PADARIA DOIS IRMAOS LTDA"),
            ("cnae_codigo", "1091102"),
            ("cnae_nome", "FABRICAÇÃO DE PRODUTOS DE PADARIA"),
            ("cidade", "CAMPINAS"),
            ("uf", "sp"),
            ("telefone", "(19) 3232-1010"),
            ("site", "https://padaria.com.br"),
            ("simples_nacional", "sim"),
            ("endereco", "RUA DO COMERCIO, 10"),
            ("porte_empresa", "PEQUENO PORTE"),
        ])];

        let companies = reconcile_rows(&rows).unwrap();
        let company = &companies[0];
        assert_eq!(company.municipality, "CAMPINAS");
        assert_eq!(company.state, "SP");
        assert_eq!(company.phone_1.as_deref(), Some("(19) 3232-1010"));
        assert_eq!(company.website.as_deref(), Some("https://padaria.com.br"));
        assert!(company.is_simples_opt_in);
        assert_eq!(company.map_address.as_deref(), Some("RUA DO COMERCIO, 10"));
        assert_eq!(company.size_class_alt.as_deref(), Some("PEQUENO PORTE"));
        assert!(company.has_phone);
        assert!(!company.has_email);
    }

    #[test]
    fn tabela_de_booleanos_de_planilha() {
        for truthy in ["sim", "SIM", "true", "1", "yes"] {
            assert_eq!(parse_bool_like(truthy), Some(true), "{truthy}");
        }
        for falsy in ["não", "nao", "NÃO", "false", "0", "no"] {
            assert_eq!(parse_bool_like(falsy), Some(false), "{falsy}");
        }
        assert_eq!(parse_bool_like("talvez"), None);
        assert_eq!(parse_bool_like(""), None);
    }

    #[test]
    fn booleano_invalido_vira_violacao() {
        let mut rows = vec![valid_row("27083149000138", "EMPRESA")];
        rows[0].insert("mei".to_string(), "talvez".to_string());

        let violations = violations(reconcile_rows(&rows));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].column, "isMei");
        assert!(violations[0].message.contains("talvez"));
    }

    #[test]
    fn tabela_de_numeros_de_planilha() {
        assert_eq!(
            parse_decimal_like("R$ 1.234,56"),
            Some(Decimal::new(123_456, 2))
        );
        assert_eq!(parse_decimal_like("50000"), Some(Decimal::new(50_000, 0)));
        assert_eq!(parse_decimal_like("1234.56"), Some(Decimal::new(123_456, 2)));
        assert_eq!(parse_decimal_like("2.000,00"), Some(Decimal::new(2_000, 0)));
        assert_eq!(parse_decimal_like("abc"), None);
        assert_eq!(parse_decimal_like(""), None);
    }

    #[test]
    fn capital_negativo_vira_violacao() {
        let mut rows = vec![valid_row("27083149000138", "EMPRESA")];
        rows[0].insert("capital_social".to_string(), "-50".to_string());

        let violations = violations(reconcile_rows(&rows));
        assert_eq!(violations[0].column, "shareCapital");
        assert!(violations[0].message.contains("negativo"));
    }

    #[test]
    fn matriz_filial_aceita_os_dois_rotulos() {
        assert_eq!(parse_branch_type("MATRIZ"), Some(BranchType::Headquarters));
        assert_eq!(parse_branch_type("filial"), Some(BranchType::Branch));
        assert_eq!(parse_branch_type("outro"), None);

        let mut rows = vec![valid_row("27083149000138", "EMPRESA")];
        rows[0].insert("matriz_filial".to_string(), "SEDE".to_string());
        let violations = violations(reconcile_rows(&rows));
        assert_eq!(violations[0].column, "branchType");
    }

    #[test]
    fn whatsapp_gerado_dos_telefones() {
        assert_eq!(
            whatsapp_link("+55 63 3377-1155").as_deref(),
            Some("https://api.whatsapp.com/send/?phone=556333771155")
        );
        // DDI entra quando o número não o traz
        assert_eq!(
            whatsapp_link("(63) 3377-1155").as_deref(),
            Some("https://api.whatsapp.com/send/?phone=556333771155")
        );
        assert_eq!(whatsapp_link("sem numero"), None);

        let mut rows = vec![valid_row("27083149000138", "EMPRESA")];
        rows[0].insert("telefone_1".to_string(), "63 3377-1155".to_string());
        rows[0].insert("telefone_2".to_string(), "+55 63 9999-0000".to_string());
        let companies = reconcile_rows(&rows).unwrap();
        assert_eq!(
            companies[0].whatsapp_link_1.as_deref(),
            Some("https://api.whatsapp.com/send/?phone=556333771155")
        );
        assert_eq!(
            companies[0].whatsapp_link_2.as_deref(),
            Some("https://api.whatsapp.com/send/?phone=556399990000")
        );
        assert_eq!(companies[0].whatsapp_link_3, None);
    }

    #[test]
    fn cnpj_fora_de_14_digitos_vira_violacao() {
        let rows = vec![valid_row("123", "EMPRESA")];
        let violations = violations(reconcile_rows(&rows));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].column, "taxId");
        assert!(violations[0].message.contains("14"));
    }
}
