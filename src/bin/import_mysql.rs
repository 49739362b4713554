use clap::Parser;
use csv2db::app::{finish, report_error, run_import, RunOptions};
use csv2db::config::cli::MySqlArgs;
use csv2db::MySqlLoader;

#[tokio::main]
async fn main() {
    let args = MySqlArgs::parse();
    args.common.init_logging();

    tracing::info!("🚀 Starting MySQL import");

    let prepared = args
        .common
        .settings()
        .and_then(|settings| Ok((settings, args.connection()?)));
    let (settings, conn) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => std::process::exit(report_error(&e)),
    };

    tracing::info!(
        "📁 Importing '{}' into MySQL database '{}' on {}:{}",
        settings.input_dir,
        conn.database,
        conn.host,
        conn.port
    );

    let options = RunOptions {
        monitor: args.common.monitor,
        report_path: args.common.report.clone(),
    };
    let result = run_import(MySqlLoader::new(conn), settings, &options).await;
    std::process::exit(finish(result));
}
