pub mod analytics;
pub mod companies;
pub mod exports;
pub mod options;
