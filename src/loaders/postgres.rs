use crate::domain::model::{CsvSource, TableSchema};
use crate::domain::ports::BulkLoader;
use crate::loaders::command::{CommandRunner, CommandSpec, SystemRunner};
use crate::loaders::sql::{create_table_sql, quote_ident, quote_literal, Dialect};
use crate::loaders::absolute;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresConnection {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
}

/// 透過 `psql` 建表並以 `\copy` 載入；密碼只放在 `PGPASSWORD`
pub struct PostgresLoader<R: CommandRunner = SystemRunner> {
    conn: PostgresConnection,
    runner: R,
    psql: String,
}

impl PostgresLoader<SystemRunner> {
    pub fn new(conn: PostgresConnection) -> Self {
        Self::with_runner(conn, SystemRunner)
    }
}

impl<R: CommandRunner> PostgresLoader<R> {
    pub fn with_runner(conn: PostgresConnection, runner: R) -> Self {
        Self {
            conn,
            runner,
            psql: "psql".to_string(),
        }
    }

    pub fn psql_path(mut self, path: impl Into<String>) -> Self {
        self.psql = path.into();
        self
    }

    fn psql_command(&self, command: &str) -> CommandSpec {
        CommandSpec::new(&self.psql)
            .args(["--no-psqlrc", "--set", "ON_ERROR_STOP=1"])
            .arg("--host")
            .arg(&self.conn.host)
            .arg("--port")
            .arg(self.conn.port.to_string())
            .arg("--dbname")
            .arg(&self.conn.dbname)
            .arg("--username")
            .arg(&self.conn.user)
            .arg("--command")
            .arg(command)
            .env("PGPASSWORD", &self.conn.password)
    }
}

pub fn copy_command(table: &str, path: &Path, compressed: bool, delimiter: u8) -> String {
    let path = path.to_string_lossy();
    let from = if compressed {
        let program = format!("gunzip -c {}", shell_quote(&path));
        format!("PROGRAM {}", quote_literal(&program))
    } else {
        quote_literal(&path)
    };

    format!(
        "\\copy {} FROM {} WITH (FORMAT csv, DELIMITER {}, HEADER true)",
        quote_ident(Dialect::Postgres, table),
        from,
        quote_literal(&(delimiter as char).to_string())
    )
}

fn shell_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[async_trait]
impl<R: CommandRunner> BulkLoader for PostgresLoader<R> {
    fn target(&self) -> &str {
        "postgresql"
    }

    fn table_name(&self, raw: &str) -> String {
        raw.to_lowercase()
    }

    async fn ensure_table(&self, schema: &TableSchema) -> Result<()> {
        let ddl = create_table_sql(Dialect::Postgres, schema);
        tracing::debug!("DDL: {}", ddl);
        self.runner.run(&self.psql_command(&ddl)).await?;
        Ok(())
    }

    async fn bulk_load(&self, source: &CsvSource, schema: &TableSchema, delimiter: u8) -> Result<()> {
        let path = absolute(&source.path)?;
        let copy = copy_command(&schema.table_name, &path, source.compressed, delimiter);
        tracing::debug!("COPY: {}", copy);
        self.runner.run(&self.psql_command(&copy)).await?;
        Ok(())
    }
}
