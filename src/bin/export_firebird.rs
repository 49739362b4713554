use clap::Parser;
use csv2db::app::report_error;
use csv2db::config::cli::FirebirdArgs;
use csv2db::exporters::{FirebirdExporter, TableExportOutcome};
use csv2db::utils::logger;

#[tokio::main]
async fn main() {
    let args = FirebirdArgs::parse();
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting Firebird export");

    let exporter = match FirebirdExporter::new(args.export_config()) {
        Ok(exporter) => exporter,
        Err(e) => std::process::exit(report_error(&e)),
    };

    let results = match exporter.export_all().await {
        Ok(results) => results,
        Err(e) => std::process::exit(report_error(&e)),
    };

    let mut failed = 0;
    for result in &results {
        match &result.outcome {
            TableExportOutcome::Exported { file, rows } => {
                println!("  ✅ {} -> {} ({} rows)", result.table, file.display(), rows)
            }
            TableExportOutcome::Skipped { reason } => {
                println!("  ⚠️  {}: skipped ({})", result.table, reason)
            }
            TableExportOutcome::Failed { error } => {
                failed += 1;
                eprintln!("  ❌ {}: {}", result.table, error)
            }
        }
    }

    println!("\nExport process complete.");
    if failed > 0 {
        std::process::exit(1);
    }
}
