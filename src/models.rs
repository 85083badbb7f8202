pub mod company;
pub mod analytics;
pub mod import;
