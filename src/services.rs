pub mod company_service;
pub use company_service::CompanyService;
pub mod analytics_service;
pub use analytics_service::AnalyticsService;
pub mod import_service;
pub use import_service::ImportService;
pub mod export_service;
pub use export_service::ExportService;
