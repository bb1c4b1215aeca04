//! Spreadsheet export of the approved-activity registry.

pub mod registry_export;

pub use registry_export::{export_file_name, registry_rows, registry_workbook, RegistryRow};
