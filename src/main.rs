use clap::Parser;
use csv2db::app::{finish, plan_import, report_error, run_import, RunOptions};
use csv2db::config::toml_config::{Target, TomlConfig};
use csv2db::utils::{logger, validation::Validate};
use csv2db::{ImportSettings, MySqlLoader, PostgresLoader, SqliteLoader};

#[derive(Parser)]
#[command(name = "csv2db")]
#[command(about = "Import a directory of CSV files into a database described by a TOML file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "csv2db.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - list the files and tables without touching the database
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting csv2db");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證配置
    let prepared = config
        .validate()
        .and_then(|_| Ok((config.settings()?, config.target()?)));
    let (settings, target) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => std::process::exit(report_error(&e)),
    };

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &target);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No database will be touched");
        std::process::exit(perform_dry_run(settings, target).await);
    }

    let options = RunOptions {
        monitor: args.monitor.unwrap_or_else(|| config.monitoring_enabled()),
        report_path: config.import.report.clone(),
    };

    let result = match target {
        Target::Postgres(conn) => run_import(PostgresLoader::new(conn), settings, &options).await,
        Target::Sqlite(path) => run_import(SqliteLoader::new(path), settings, &options).await,
        Target::MySql(conn) => run_import(MySqlLoader::new(conn), settings, &options).await,
    };
    std::process::exit(finish(result));
}

fn display_config_summary(config: &TomlConfig, target: &Target) {
    println!("📋 Configuration Summary:");
    println!("  Input: {}", config.import.input_dir);
    match target {
        Target::Postgres(conn) => println!(
            "  Target: PostgreSQL {}@{}:{}/{}",
            conn.user, conn.host, conn.port, conn.dbname
        ),
        Target::Sqlite(path) => println!("  Target: SQLite {}", path.display()),
        Target::MySql(conn) => println!(
            "  Target: MySQL {}@{}:{}/{}",
            conn.user, conn.host, conn.port, conn.database
        ),
    }
    if let Some(report) = &config.import.report {
        println!("  Report: {}", report.display());
    }
    println!();
}

async fn perform_dry_run(settings: ImportSettings, target: Target) -> i32 {
    let planned = match target {
        Target::Postgres(conn) => plan_import(PostgresLoader::new(conn), settings).await,
        Target::Sqlite(path) => plan_import(SqliteLoader::new(path), settings).await,
        Target::MySql(conn) => plan_import(MySqlLoader::new(conn), settings).await,
    };
    let planned = match planned {
        Ok(planned) => planned,
        Err(e) => return report_error(&e),
    };

    println!("🔍 Dry Run Analysis:");
    for plan in &planned.plans {
        println!(
            "  {} -> {} ({} columns: {})",
            plan.source.file_name(),
            plan.schema.table_name,
            plan.schema.columns.len(),
            plan.schema.columns.join(", ")
        );
    }
    for rejected in &planned.rejected {
        println!("  {} -> {:?}", rejected.report.file, rejected.report.outcome);
    }
    println!();
    println!("✅ Dry run analysis complete. {} files would be imported.", planned.plans.len());
    0
}
