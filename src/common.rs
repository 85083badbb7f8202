pub mod error;
pub use error::AppError;
pub mod export_cache;
pub use export_cache::ExportCache;
