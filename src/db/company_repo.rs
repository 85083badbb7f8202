// src/db/company_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::company::{Company, NewCompany, UpdateCompanyPayload},
};

// O repositório de empresas, responsável por todas as interações com a
// tabela 'companies'. Expõe exatamente as primitivas que o motor assume
// do armazenamento: varredura completa, busca única por CNPJ, busca
// textual e as escritas.
#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Varredura completa: o motor filtra/ordena/pagina em memória.
    pub async fn collect_all(&self) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<_, Company>("SELECT * FROM companies")
            .fetch_all(&self.pool)
            .await?;
        Ok(companies)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(company)
    }

    /// Busca única pelo CNPJ canônico (só dígitos). Recebe o executor para
    /// funcionar dentro da transação da importação.
    pub async fn find_by_tax_id<'e, E>(
        &self,
        executor: E,
        tax_id: &str,
    ) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE tax_id = $1")
            .bind(tax_id)
            .fetch_optional(executor)
            .await?;
        Ok(company)
    }

    /// Busca textual na razão social, com os estreitamentos opcionais que
    /// o índice de busca original oferecia.
    pub async fn search_by_legal_name(
        &self,
        term: &str,
        state: Option<&str>,
        size_class: Option<&str>,
        industry_code: Option<&str>,
        municipality: Option<&str>,
    ) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT * FROM companies
            WHERE legal_name ILIKE $1
              AND ($2::text IS NULL OR state = $2)
              AND ($3::text IS NULL OR size_class = $3)
              AND ($4::text IS NULL OR primary_industry_code = $4)
              AND ($5::text IS NULL OR municipality = $5)
            "#,
        )
        .bind(format!("%{term}%"))
        .bind(state)
        .bind(size_class)
        .bind(industry_code)
        .bind(municipality)
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }

    /// Insere uma empresa; os timestamps ficam por conta dos defaults da
    /// tabela. Violação de unicidade do CNPJ vira erro de domínio.
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        company: &NewCompany,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inserted = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (
                tax_id, legal_name, trade_name,
                primary_industry_code, primary_industry_name,
                secondary_industry_code, secondary_industry_name,
                phone_1, phone_2, phone_3, email, website,
                whatsapp_link_1, whatsapp_link_2, whatsapp_link_3,
                accounting_email,
                municipality, state, neighborhood, postal_code,
                street_address, map_address, maps_url,
                branch_type, size_class, size_class_alt, share_capital,
                is_mei, is_simples_opt_in, activity_start_date,
                legal_nature, corporate_domain, federal_registry_url,
                has_email, has_phone
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20,
                $21, $22, $23, $24, $25, $26, $27, $28, $29, $30,
                $31, $32, $33, $34, $35
            )
            RETURNING *
            "#,
        )
        .bind(&company.tax_id)
        .bind(&company.legal_name)
        .bind(&company.trade_name)
        .bind(&company.primary_industry_code)
        .bind(&company.primary_industry_name)
        .bind(&company.secondary_industry_code)
        .bind(&company.secondary_industry_name)
        .bind(&company.phone_1)
        .bind(&company.phone_2)
        .bind(&company.phone_3)
        .bind(&company.email)
        .bind(&company.website)
        .bind(&company.whatsapp_link_1)
        .bind(&company.whatsapp_link_2)
        .bind(&company.whatsapp_link_3)
        .bind(&company.accounting_email)
        .bind(&company.municipality)
        .bind(&company.state)
        .bind(&company.neighborhood)
        .bind(&company.postal_code)
        .bind(&company.street_address)
        .bind(&company.map_address)
        .bind(&company.maps_url)
        .bind(company.branch_type)
        .bind(&company.size_class)
        .bind(&company.size_class_alt)
        .bind(company.share_capital)
        .bind(company.is_mei)
        .bind(company.is_simples_opt_in)
        .bind(&company.activity_start_date)
        .bind(&company.legal_nature)
        .bind(&company.corporate_domain)
        .bind(&company.federal_registry_url)
        .bind(company.has_email)
        .bind(company.has_phone)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                AppError::DuplicateCnpj
            } else {
                AppError::DatabaseError(e)
            }
        })?;
        Ok(inserted)
    }

    /// Atualização parcial: campo ausente mantém o valor atual. Os flags
    /// de contato são recalculados do valor final de email/telefone e o
    /// updated_at sempre avança.
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateCompanyPayload,
    ) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                tax_id                = COALESCE($2, tax_id),
                legal_name            = COALESCE($3, legal_name),
                trade_name            = COALESCE($4, trade_name),
                primary_industry_code = COALESCE($5, primary_industry_code),
                primary_industry_name = COALESCE($6, primary_industry_name),
                municipality          = COALESCE($7, municipality),
                state                 = COALESCE($8, state),
                phone_1               = COALESCE($9, phone_1),
                email                 = COALESCE($10, email),
                website               = COALESCE($11, website),
                size_class            = COALESCE($12, size_class),
                size_class_alt        = COALESCE($13, size_class_alt),
                share_capital         = COALESCE($14, share_capital),
                is_mei                = COALESCE($15, is_mei),
                is_simples_opt_in     = COALESCE($16, is_simples_opt_in),
                has_email = COALESCE($10, email) IS NOT NULL AND COALESCE($10, email) <> '',
                has_phone = COALESCE($9, phone_1) IS NOT NULL AND COALESCE($9, phone_1) <> '',
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.tax_id)
        .bind(&payload.legal_name)
        .bind(&payload.trade_name)
        .bind(&payload.primary_industry_code)
        .bind(&payload.primary_industry_name)
        .bind(&payload.municipality)
        .bind(&payload.state)
        .bind(&payload.phone_1)
        .bind(&payload.email)
        .bind(&payload.website)
        .bind(&payload.size_class)
        .bind(&payload.size_class_alt)
        .bind(payload.share_capital)
        .bind(payload.is_mei)
        .bind(payload.is_simples_opt_in)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                AppError::DuplicateCnpj
            } else {
                AppError::DatabaseError(e)
            }
        })?;
        Ok(company)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
