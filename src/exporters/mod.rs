pub mod firebird;

pub use firebird::{FirebirdExportConfig, FirebirdExporter, TableExport, TableExportOutcome};
