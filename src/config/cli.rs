use crate::config::ImportSettings;
use crate::loaders::{MySqlConnection, PostgresConnection};
use crate::utils::error::Result;
use crate::utils::logger;
use crate::utils::validation::{validate_delimiter, validate_non_empty_string, validate_port, Validate};
use clap::{Args, Parser, ValueHint};
use std::path::PathBuf;

/// 三個匯入工具共用的參數
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Directory containing the .csv or .csv.gz files.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub input_dir: String,

    /// Column delimiter used in the files.
    #[arg(long, default_value = "|")]
    pub delimiter: String,

    /// Write a JSON report of the run to this path.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub report: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log CPU and memory usage per phase
    #[arg(long)]
    pub monitor: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl CommonArgs {
    pub fn init_logging(&self) {
        if self.json_logs {
            logger::init_json_logger();
        } else {
            logger::init_cli_logger(self.verbose);
        }
    }

    pub fn settings(&self) -> Result<ImportSettings> {
        let settings = ImportSettings {
            input_dir: self.input_dir.clone(),
            delimiter: validate_delimiter("delimiter", &self.delimiter)?,
        };
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "import_postgresql")]
#[command(about = "Import CSV or compressed CSV files into a PostgreSQL database.")]
pub struct PostgresArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// PostgreSQL database name.
    #[arg(long)]
    pub dbname: String,

    /// PostgreSQL username.
    #[arg(long)]
    pub user: String,

    /// PostgreSQL password.
    #[arg(long)]
    pub password: String,

    /// PostgreSQL server host.
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// PostgreSQL server port.
    #[arg(long, default_value_t = 5432)]
    pub port: u16,
}

impl PostgresArgs {
    pub fn connection(&self) -> Result<PostgresConnection> {
        validate_non_empty_string("dbname", &self.dbname)?;
        validate_non_empty_string("user", &self.user)?;
        validate_non_empty_string("host", &self.host)?;
        validate_port("port", self.port)?;
        Ok(PostgresConnection {
            host: self.host.clone(),
            port: self.port,
            dbname: self.dbname.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "import_sqlite")]
#[command(about = "Import CSV or compressed CSV files into a SQLite database.")]
pub struct SqliteArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Path to the output SQLite database file.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub sqlite_db: PathBuf,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "import_mysql")]
#[command(about = "Import CSV or compressed CSV files into a MySQL database.")]
pub struct MySqlArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// MySQL database name.
    #[arg(long)]
    pub database: String,

    /// MySQL username.
    #[arg(long)]
    pub user: String,

    /// MySQL password.
    #[arg(long)]
    pub password: String,

    /// MySQL server host.
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// MySQL server port.
    #[arg(long, default_value_t = 3306)]
    pub port: u16,
}

impl MySqlArgs {
    pub fn connection(&self) -> Result<MySqlConnection> {
        validate_non_empty_string("database", &self.database)?;
        validate_non_empty_string("user", &self.user)?;
        validate_non_empty_string("host", &self.host)?;
        validate_port("port", self.port)?;
        Ok(MySqlConnection {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "export_firebird")]
#[command(about = "Export tables from a Firebird database to CSV files.")]
pub struct FirebirdArgs {
    /// URI for the Firebird database.
    #[arg(long)]
    pub uri: String,

    /// Firebird username.
    #[arg(long)]
    pub username: String,

    /// Firebird password.
    #[arg(long)]
    pub password: String,

    /// Full path to the isql executable.
    #[arg(long, value_hint = ValueHint::ExecutablePath)]
    pub isql_path: String,

    /// Directory to save the output files.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub output_dir: PathBuf,

    /// Character encoding of the Firebird output (e.g., latin-1, cp1252).
    #[arg(long, default_value = "utf-8")]
    pub encoding: String,

    /// Compress the output files using gzip (.csv.gz).
    #[arg(long)]
    pub compress: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl FirebirdArgs {
    pub fn export_config(&self) -> crate::exporters::FirebirdExportConfig {
        crate::exporters::FirebirdExportConfig {
            isql_path: self.isql_path.clone(),
            uri: self.uri.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            output_dir: self.output_dir.clone(),
            encoding: self.encoding.clone(),
            compress: self.compress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_defaults() {
        let args = PostgresArgs::try_parse_from([
            "import_postgresql",
            "--input-dir",
            "./data",
            "--dbname",
            "analytics",
            "--user",
            "loader",
            "--password",
            "pw",
        ])
        .unwrap();

        let conn = args.connection().unwrap();
        assert_eq!(conn.host, "localhost");
        assert_eq!(conn.port, 5432);
        assert_eq!(args.common.delimiter, "|");
        assert!(args.common.report.is_none());
    }

    #[test]
    fn test_postgres_requires_credentials() {
        let result = PostgresArgs::try_parse_from(["import_postgresql", "--input-dir", "./data"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_mysql_default_port() {
        let args = MySqlArgs::try_parse_from([
            "import_mysql",
            "--input-dir",
            "./data",
            "--database",
            "shop",
            "--user",
            "root",
            "--password",
            "pw",
        ])
        .unwrap();
        assert_eq!(args.connection().unwrap().port, 3306);
    }

    #[test]
    fn test_sqlite_settings_validate_delimiter() {
        let dir = tempfile::TempDir::new().unwrap();
        let input_dir = dir.path().to_str().unwrap();
        let args = SqliteArgs::try_parse_from([
            "import_sqlite",
            "--input-dir",
            input_dir,
            "--sqlite-db",
            "out.db",
            "--delimiter",
            ",",
        ])
        .unwrap();
        assert_eq!(args.common.settings().unwrap().delimiter, b',');

        let bad = SqliteArgs::try_parse_from([
            "import_sqlite",
            "--input-dir",
            input_dir,
            "--sqlite-db",
            "out.db",
            "--delimiter",
            "::",
        ])
        .unwrap();
        assert!(bad.common.settings().is_err());
    }

    #[test]
    fn test_firebird_defaults() {
        let args = FirebirdArgs::try_parse_from([
            "export_firebird",
            "--uri",
            "localhost:/db.fdb",
            "--username",
            "SYSDBA",
            "--password",
            "masterkey",
            "--isql-path",
            "/opt/firebird/bin/isql",
            "--output-dir",
            "./out",
        ])
        .unwrap();
        let config = args.export_config();
        assert_eq!(config.encoding, "utf-8");
        assert!(!config.compress);
    }
}
