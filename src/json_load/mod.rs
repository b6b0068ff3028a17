pub mod bulk_loader;
pub mod connection;
pub mod core_processor;
pub mod geo_strategy;
pub mod non_geo_strategy;
pub mod postgis_processor;
pub mod schema;
pub mod table_builder;
pub mod value_encoding;

pub use bulk_loader::{insert_data_from_json, LoadReport};
pub use table_builder::{create_table_from_json, TableOutcome};
