//! Source loader for the maintenance spreadsheet.
//!
//! Reads a CSV export of the workshop's "Mantenimiento" sheet and yields
//! typed [`fichas_core::record::SourceRecord`]s. Column headers are
//! matched by normalized aliases rather than exact names, because the
//! sheet's headers vary in accents, case, and punctuation from one
//! export to the next ("Fecha Último Mantenimiento", "fecha ultimo
//! mantenimiento", …).

mod loader;
mod normalize;

pub use loader::CsvLoader;
pub use normalize::{detect_column, normalize_header};
