pub mod epss;
pub mod prod_db;
