// src/services/company_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CompanyRepository,
    engine::{self, derive, paginate::PageRequest, paginate::Paged, sort::SortOrder},
    models::company::{
        Company, CompanyFilter, CompanyWithAge, CreateCompanyPayload, UpdateCompanyPayload,
    },
};

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn only_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

#[derive(Clone)]
pub struct CompanyService {
    repo: CompanyRepository,
    pool: PgPool,
}

impl CompanyService {
    pub fn new(repo: CompanyRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    /// Carrega o conjunto conforme o filtro. Busca textual presente vai
    /// pela primitiva do armazenamento com os estreitamentos que ela
    /// suporta; caso contrário, varredura completa. Nos dois caminhos o
    /// funil de predicados roda em memória sobre o resultado.
    pub async fn filtered(
        &self,
        filter: &CompanyFilter,
        as_of_year: i32,
    ) -> Result<Vec<Company>, AppError> {
        let collection = match non_empty(filter.search.as_deref()) {
            Some(term) => {
                self.repo
                    .search_by_legal_name(
                        term,
                        non_empty(filter.state.as_deref()),
                        non_empty(filter.size_class.as_deref()),
                        non_empty(filter.industry_code.as_deref()),
                        non_empty(filter.municipality.as_deref()),
                    )
                    .await?
            }
            None => self.repo.collect_all().await?,
        };
        Ok(engine::filter::apply(collection, filter, as_of_year))
    }

    /// Listagem paginada: filtra, ordena (mais recentes primeiro), recorta
    /// e só então anexa a idade aos registros da página.
    pub async fn list(
        &self,
        filter: &CompanyFilter,
        page: &PageRequest,
    ) -> Result<Paged<CompanyWithAge>, AppError> {
        let as_of_year = derive::current_year();
        let mut filtered = self.filtered(filter, as_of_year).await?;
        SortOrder::default().apply(&mut filtered);

        let paged = engine::paginate::slice(filtered, page)?;
        Ok(Paged {
            page: paged
                .page
                .into_iter()
                .map(|company| derive::augment(company, as_of_year))
                .collect(),
            total: paged.total,
            has_more: paged.has_more,
            continue_cursor: paged.continue_cursor,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<CompanyWithAge, AppError> {
        let company = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::CompanyNotFound)?;
        Ok(derive::augment(company, derive::current_year()))
    }

    pub async fn get_by_cnpj(&self, cnpj: &str) -> Result<Company, AppError> {
        self.repo
            .find_by_tax_id(&self.pool, &only_digits(cnpj))
            .await?
            .ok_or(AppError::CompanyNotFound)
    }

    /// Criação única: ao contrário da importação, CNPJ repetido aqui é
    /// falha dura, não um pulo silencioso.
    pub async fn create(&self, payload: CreateCompanyPayload) -> Result<Company, AppError> {
        let company = payload.into_new_company();

        let mut tx = self.pool.begin().await?;
        if self
            .repo
            .find_by_tax_id(&mut *tx, &company.tax_id)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateCnpj);
        }
        let created = self.repo.insert(&mut *tx, &company).await?;
        tx.commit().await?;

        tracing::info!("🏢 Empresa criada: {}", created.tax_id);
        Ok(created)
    }

    pub async fn update(
        &self,
        id: Uuid,
        mut payload: UpdateCompanyPayload,
    ) -> Result<Company, AppError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::CompanyNotFound)?;

        // Normalizações de escrita: CNPJ só dígitos, UF maiúscula
        if let Some(tax_id) = payload.tax_id.as_mut() {
            *tax_id = only_digits(tax_id);
        }
        if let Some(state) = payload.state.as_mut() {
            *state = state.to_uppercase();
        }

        // O novo CNPJ não pode pertencer a outra empresa
        if let Some(new_tax_id) = payload.tax_id.as_deref() {
            if new_tax_id != existing.tax_id
                && self
                    .repo
                    .find_by_tax_id(&self.pool, new_tax_id)
                    .await?
                    .is_some_and(|other| other.id != id)
            {
                return Err(AppError::DuplicateCnpj);
            }
        }

        self.repo
            .update(id, &payload)
            .await?
            .ok_or(AppError::CompanyNotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::CompanyNotFound)
        }
    }
}
