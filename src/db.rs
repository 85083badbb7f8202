pub mod company_repo;
pub use company_repo::CompanyRepository;
pub mod metadata_repo;
pub use metadata_repo::MetadataRepository;
