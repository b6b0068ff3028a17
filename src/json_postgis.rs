//! Load a JSON array of flat records into a PostGIS table.
//!
//! The work is split in two operations that each read the file and open
//! their own connection: [`create_table_from_json`] rebuilds the table from
//! the first record, then [`insert_data_from_json`] fills it.

pub mod config;
pub mod error;
pub mod file_load;
pub mod json_load;

pub use config::ConnectionConfig;
pub use error::{LoaderError, LoaderResult};
pub use json_load::{create_table_from_json, insert_data_from_json, LoadReport, TableOutcome};

#[cfg(feature = "python")]
mod python {
    use pyo3::prelude::*;

    use crate::config::ConnectionConfig;

    fn to_py_err(e: crate::error::LoaderError) -> PyErr {
        PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string())
    }

    /// Returns true when the table was created with a spatial index.
    #[pyfunction]
    fn create_table_from_json(json_file: &str, table_name: &str) -> PyResult<bool> {
        let config = ConnectionConfig::from_env();
        let outcome = crate::json_load::create_table_from_json(&config, json_file, table_name)
            .map_err(to_py_err)?;
        Ok(outcome.is_spatial())
    }

    /// Returns the number of inserted rows.
    #[pyfunction]
    fn insert_data_from_json(json_file: &str, table_name: &str) -> PyResult<u64> {
        let config = ConnectionConfig::from_env();
        let report = crate::json_load::insert_data_from_json(&config, json_file, table_name)
            .map_err(to_py_err)?;
        Ok(report.rows_inserted)
    }

    #[pymodule]
    #[pyo3(name = "json_postgis")]
    fn json_postgis(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(create_table_from_json, m)?)?;
        m.add_function(wrap_pyfunction!(insert_data_from_json, m)?)?;
        Ok(())
    }
}
