pub mod aggregate;
pub mod derive;
pub mod filter;
pub mod import;
pub mod paginate;
pub mod sort;
