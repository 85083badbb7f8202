// src/models/company.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- ENUMS ---

// Mapeia o CREATE TYPE branch_type do banco (matriz/filial)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "branch_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum BranchType {
    Headquarters,
    Branch,
}

// --- REGISTRO CANÔNICO ---

/// Registro de empresa derivado das exportações do cadastro CNPJ.
///
/// `has_email`/`has_phone` são derivados de `email`/`phone_1` em toda
/// escrita; `age_years`/`has_website` só existem em tempo de leitura.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,

    // Identificação
    pub tax_id: String,
    pub legal_name: String,
    pub trade_name: Option<String>,
    pub primary_industry_code: String,
    pub primary_industry_name: String,
    // Multivalor no formato de origem, unido por ponto-e-vírgula
    pub secondary_industry_code: Option<String>,
    pub secondary_industry_name: Option<String>,

    // Contatos
    pub phone_1: Option<String>,
    pub phone_2: Option<String>,
    pub phone_3: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub whatsapp_link_1: Option<String>,
    pub whatsapp_link_2: Option<String>,
    pub whatsapp_link_3: Option<String>,
    pub accounting_email: Option<String>,

    // Localização
    pub municipality: String,
    pub state: String,
    pub neighborhood: Option<String>,
    pub postal_code: Option<String>,
    pub street_address: Option<String>,
    pub map_address: Option<String>,
    pub maps_url: Option<String>,

    // Características empresariais
    pub branch_type: Option<BranchType>,
    // Duas classificações de porte porque os dois esquemas de ingestão
    // divergem (porte vs porte_empresa); ambas ficam filtráveis.
    pub size_class: Option<String>,
    pub size_class_alt: Option<String>,
    pub share_capital: Option<Decimal>,
    pub is_mei: bool,
    pub is_simples_opt_in: bool,
    // Mantido como texto AAAA-MM-DD: a comparação de intervalo é
    // lexicográfica e datas inválidas viram idade nula, nunca erro.
    pub activity_start_date: Option<String>,
    pub legal_nature: Option<String>,
    pub corporate_domain: Option<String>,
    pub federal_registry_url: Option<String>,

    // Derivados de contato (armazenados, recalculados a cada escrita)
    pub has_email: bool,
    pub has_phone: bool,

    // Metadados
    pub imported_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Empresa com a idade calculada para o ano de referência.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyWithAge {
    #[serde(flatten)]
    pub company: Company,
    pub age_years: Option<i32>,
}

// --- ENTRADA CANÔNICA DE ESCRITA ---

/// Entrada validada para inserção, compartilhada pelo create e pela
/// importação em lote. Nunca carrega id nem timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCompany {
    pub tax_id: String,
    pub legal_name: String,
    pub trade_name: Option<String>,
    pub primary_industry_code: String,
    pub primary_industry_name: String,
    pub secondary_industry_code: Option<String>,
    pub secondary_industry_name: Option<String>,
    pub phone_1: Option<String>,
    pub phone_2: Option<String>,
    pub phone_3: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub whatsapp_link_1: Option<String>,
    pub whatsapp_link_2: Option<String>,
    pub whatsapp_link_3: Option<String>,
    pub accounting_email: Option<String>,
    pub municipality: String,
    pub state: String,
    pub neighborhood: Option<String>,
    pub postal_code: Option<String>,
    pub street_address: Option<String>,
    pub map_address: Option<String>,
    pub maps_url: Option<String>,
    pub branch_type: Option<BranchType>,
    pub size_class: Option<String>,
    pub size_class_alt: Option<String>,
    pub share_capital: Option<Decimal>,
    pub is_mei: bool,
    pub is_simples_opt_in: bool,
    pub activity_start_date: Option<String>,
    pub legal_nature: Option<String>,
    pub corporate_domain: Option<String>,
    pub federal_registry_url: Option<String>,
    pub has_email: bool,
    pub has_phone: bool,
}

impl NewCompany {
    /// Recalcula os flags de contato a partir de `email`/`phone_1`.
    /// Eles nunca são aceitos de fora.
    pub fn recompute_contact_flags(&mut self) {
        self.has_email = self.email.as_deref().is_some_and(|e| !e.is_empty());
        self.has_phone = self.phone_1.as_deref().is_some_and(|t| !t.is_empty());
    }
}

// --- PAYLOADS HTTP ---

fn validate_cnpj(tax_id: &str) -> Result<(), ValidationError> {
    let digits = tax_id.chars().filter(char::is_ascii_digit).count();
    if digits == 14 {
        Ok(())
    } else {
        Err(ValidationError::new("cnpj").with_message("O CNPJ deve ter 14 dígitos".into()))
    }
}

fn validate_share_capital(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("share_capital")
            .with_message("O capital social não pode ser negativo".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyPayload {
    #[validate(custom(function = "validate_cnpj"))]
    #[schema(example = "27083149000138")]
    pub tax_id: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "CRISLLANY BARROS VELOSO 01464580103")]
    pub legal_name: String,
    #[schema(example = "RAYTECH")]
    pub trade_name: Option<String>,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "4751201")]
    pub primary_industry_code: String,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "COMÉRCIO VAREJISTA ESPECIALIZADO DE EQUIPAMENTOS DE INFORMÁTICA")]
    pub primary_industry_name: String,
    pub secondary_industry_code: Option<String>,
    pub secondary_industry_name: Option<String>,

    #[schema(example = "+556333771155")]
    pub phone_1: Option<String>,
    pub phone_2: Option<String>,
    pub phone_3: Option<String>,
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "contato@empresa.com.br")]
    pub email: Option<String>,
    pub website: Option<String>,
    pub whatsapp_link_1: Option<String>,
    pub whatsapp_link_2: Option<String>,
    pub whatsapp_link_3: Option<String>,
    pub accounting_email: Option<String>,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "PALMAS")]
    pub municipality: String,
    #[validate(length(equal = 2, message = "invalid_state"))]
    #[schema(example = "TO")]
    pub state: String,
    pub neighborhood: Option<String>,
    #[schema(example = "77020-468")]
    pub postal_code: Option<String>,
    pub street_address: Option<String>,
    pub map_address: Option<String>,
    pub maps_url: Option<String>,

    pub branch_type: Option<BranchType>,
    #[schema(example = "MICRO EMPRESA")]
    pub size_class: Option<String>,
    #[schema(example = "MEI")]
    pub size_class_alt: Option<String>,
    #[validate(custom(function = "validate_share_capital"))]
    #[schema(value_type = Option<f64>, example = 50000.0)]
    pub share_capital: Option<Decimal>,
    #[serde(default)]
    pub is_mei: bool,
    #[serde(default)]
    pub is_simples_opt_in: bool,
    #[schema(example = "2017-02-10")]
    pub activity_start_date: Option<String>,
    pub legal_nature: Option<String>,
    pub corporate_domain: Option<String>,
    pub federal_registry_url: Option<String>,
}

impl CreateCompanyPayload {
    /// Converte o payload em entrada canônica: CNPJ normalizado para
    /// dígitos, UF em maiúsculas, flags de contato recalculados.
    pub fn into_new_company(self) -> NewCompany {
        let mut new = NewCompany {
            tax_id: self.tax_id.chars().filter(char::is_ascii_digit).collect(),
            legal_name: self.legal_name,
            trade_name: self.trade_name,
            primary_industry_code: self.primary_industry_code,
            primary_industry_name: self.primary_industry_name,
            secondary_industry_code: self.secondary_industry_code,
            secondary_industry_name: self.secondary_industry_name,
            phone_1: self.phone_1,
            phone_2: self.phone_2,
            phone_3: self.phone_3,
            email: self.email,
            website: self.website,
            whatsapp_link_1: self.whatsapp_link_1,
            whatsapp_link_2: self.whatsapp_link_2,
            whatsapp_link_3: self.whatsapp_link_3,
            accounting_email: self.accounting_email,
            municipality: self.municipality,
            state: self.state.to_uppercase(),
            neighborhood: self.neighborhood,
            postal_code: self.postal_code,
            street_address: self.street_address,
            map_address: self.map_address,
            maps_url: self.maps_url,
            branch_type: self.branch_type,
            size_class: self.size_class,
            size_class_alt: self.size_class_alt,
            share_capital: self.share_capital,
            is_mei: self.is_mei,
            is_simples_opt_in: self.is_simples_opt_in,
            activity_start_date: self.activity_start_date,
            legal_nature: self.legal_nature,
            corporate_domain: self.corporate_domain,
            federal_registry_url: self.federal_registry_url,
            has_email: false,
            has_phone: false,
        };
        new.recompute_contact_flags();
        new
    }
}

/// Atualização parcial: campo ausente = mantém o valor atual.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyPayload {
    #[validate(custom(function = "validate_cnpj"))]
    pub tax_id: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub legal_name: Option<String>,
    pub trade_name: Option<String>,
    pub primary_industry_code: Option<String>,
    pub primary_industry_name: Option<String>,
    pub municipality: Option<String>,
    #[validate(length(equal = 2, message = "invalid_state"))]
    pub state: Option<String>,
    pub phone_1: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub website: Option<String>,
    pub size_class: Option<String>,
    pub size_class_alt: Option<String>,
    #[validate(custom(function = "validate_share_capital"))]
    #[schema(value_type = Option<f64>)]
    pub share_capital: Option<Decimal>,
    pub is_mei: Option<bool>,
    pub is_simples_opt_in: Option<bool>,
}

// --- FILTROS ---

/// Conjunto completo de filtros das consultas de listagem e do dashboard.
/// Todos opcionais; filtro ausente (ou string vazia) sempre passa.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct CompanyFilter {
    /// Busca textual em razão social (primitiva de busca do armazenamento)
    pub search: Option<String>,

    // Substring normalizada por dígitos
    pub tax_id: Option<String>,
    pub postal_code: Option<String>,

    // Substring sem diferenciar maiúsculas
    pub legal_name: Option<String>,
    pub trade_name: Option<String>,
    pub neighborhood: Option<String>,
    pub street_address: Option<String>,

    // Igualdade estrita
    pub industry_code: Option<String>,
    pub legal_nature: Option<String>,
    pub size_class: Option<String>,
    pub size_class_alt: Option<String>,
    pub branch_type: Option<BranchType>,
    pub corporate_domain: Option<String>,
    pub state: Option<String>,
    pub municipality: Option<String>,

    // Intervalos inclusivos
    pub share_capital_min: Option<f64>,
    pub share_capital_max: Option<f64>,
    pub start_date_from: Option<String>,
    pub start_date_to: Option<String>,
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,

    // Tri-estado: ausente = não filtra
    pub is_mei: Option<bool>,
    pub is_simples_opt_in: Option<bool>,
    pub has_email: Option<bool>,
    pub has_phone: Option<bool>,
    pub has_website: Option<bool>,
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;
    use chrono::TimeZone;

    /// Empresa base para os testes do motor; cada teste sobrescreve o que
    /// interessa via struct update.
    pub fn base_company() -> Company {
        Company {
            id: Uuid::nil(),
            tax_id: "27083149000138".to_string(),
            legal_name: "CRISLLANY BARROS VELOSO 01464580103".to_string(),
            trade_name: Some("RAYTECH".to_string()),
            primary_industry_code: "4751201".to_string(),
            primary_industry_name: "COMÉRCIO VAREJISTA DE INFORMÁTICA".to_string(),
            secondary_industry_code: None,
            secondary_industry_name: None,
            phone_1: Some("+556333771155".to_string()),
            phone_2: None,
            phone_3: None,
            email: Some("RAYTECHST@GMAIL.COM".to_string()),
            website: Some("https://raytech.com.br".to_string()),
            whatsapp_link_1: Some(
                "https://api.whatsapp.com/send/?phone=556333771155".to_string(),
            ),
            whatsapp_link_2: None,
            whatsapp_link_3: None,
            accounting_email: None,
            municipality: "ALIANCA DO TOCANTINS".to_string(),
            state: "TO".to_string(),
            neighborhood: Some("CENTRO".to_string()),
            postal_code: Some("77455-000".to_string()),
            street_address: Some("AVENIDA BERNARDO SAYAO, 237".to_string()),
            map_address: None,
            maps_url: None,
            branch_type: Some(BranchType::Headquarters),
            size_class: Some("MICRO EMPRESA".to_string()),
            size_class_alt: Some("MEI".to_string()),
            share_capital: Some(Decimal::new(2000, 0)),
            is_mei: true,
            is_simples_opt_in: true,
            activity_start_date: Some("2017-02-10".to_string()),
            legal_nature: Some("EMPRESÁRIO (INDIVIDUAL)".to_string()),
            corporate_domain: Some("PROVEDOR GRATUITO".to_string()),
            federal_registry_url: None,
            has_email: true,
            has_phone: true,
            imported_at: Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap(),
        }
    }
}
