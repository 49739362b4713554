use clap::Parser;
use csv2db::app::{finish, report_error, run_import, RunOptions};
use csv2db::config::cli::SqliteArgs;
use csv2db::SqliteLoader;

#[tokio::main]
async fn main() {
    let args = SqliteArgs::parse();
    args.common.init_logging();

    tracing::info!("🚀 Starting SQLite import");

    let settings = match args.common.settings() {
        Ok(settings) => settings,
        Err(e) => std::process::exit(report_error(&e)),
    };

    tracing::info!(
        "📁 Importing '{}' into '{}'",
        settings.input_dir,
        args.sqlite_db.display()
    );

    let options = RunOptions {
        monitor: args.common.monitor,
        report_path: args.common.report.clone(),
    };
    let result = run_import(SqliteLoader::new(&args.sqlite_db), settings, &options).await;
    std::process::exit(finish(result));
}
