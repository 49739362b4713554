use clap::Parser;
use csv2db::app::{finish, report_error, run_import, RunOptions};
use csv2db::config::cli::PostgresArgs;
use csv2db::PostgresLoader;

#[tokio::main]
async fn main() {
    let args = PostgresArgs::parse();
    args.common.init_logging();

    tracing::info!("🚀 Starting PostgreSQL import");

    let prepared = args
        .common
        .settings()
        .and_then(|settings| Ok((settings, args.connection()?)));
    let (settings, conn) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => std::process::exit(report_error(&e)),
    };

    tracing::info!(
        "📁 Importing '{}' into PostgreSQL database '{}' on {}:{}",
        settings.input_dir,
        conn.dbname,
        conn.host,
        conn.port
    );

    let options = RunOptions {
        monitor: args.common.monitor,
        report_path: args.common.report.clone(),
    };
    let result = run_import(PostgresLoader::new(conn), settings, &options).await;
    std::process::exit(finish(result));
}
