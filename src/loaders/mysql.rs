use crate::domain::model::{CsvSource, TableSchema};
use crate::domain::ports::BulkLoader;
use crate::loaders::command::{CommandRunner, CommandSpec, SystemRunner};
use crate::loaders::sql::{create_table_sql, quote_ident, quote_mysql_literal, Dialect};
use crate::loaders::stage_source;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MySqlConnection {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

/// 透過 `mysql` CLI 建表並以 `LOAD DATA LOCAL INFILE` 載入；密碼放在 `MYSQL_PWD`
pub struct MySqlLoader<R: CommandRunner = SystemRunner> {
    conn: MySqlConnection,
    runner: R,
    mysql: String,
}

impl MySqlLoader<SystemRunner> {
    pub fn new(conn: MySqlConnection) -> Self {
        Self::with_runner(conn, SystemRunner)
    }
}

impl<R: CommandRunner> MySqlLoader<R> {
    pub fn with_runner(conn: MySqlConnection, runner: R) -> Self {
        Self {
            conn,
            runner,
            mysql: "mysql".to_string(),
        }
    }

    pub fn mysql_path(mut self, path: impl Into<String>) -> Self {
        self.mysql = path.into();
        self
    }

    fn mysql_command(&self, statement: &str) -> CommandSpec {
        CommandSpec::new(&self.mysql)
            .arg("--local-infile=1")
            .arg("--batch")
            .arg(format!("--host={}", self.conn.host))
            .arg(format!("--port={}", self.conn.port))
            .arg(format!("--user={}", self.conn.user))
            .arg(format!("--database={}", self.conn.database))
            .arg("--execute")
            .arg(statement)
            .env("MYSQL_PWD", &self.conn.password)
    }
}

pub fn load_data_sql(table: &str, path: &Path, delimiter: u8) -> String {
    format!(
        "LOAD DATA LOCAL INFILE {} INTO TABLE {} CHARACTER SET utf8mb4 \
         FIELDS TERMINATED BY {} OPTIONALLY ENCLOSED BY '\"' \
         LINES TERMINATED BY '\\n' IGNORE 1 LINES;",
        quote_mysql_literal(&path.to_string_lossy()),
        quote_ident(Dialect::MySql, table),
        quote_mysql_literal(&(delimiter as char).to_string())
    )
}

#[async_trait]
impl<R: CommandRunner> BulkLoader for MySqlLoader<R> {
    fn target(&self) -> &str {
        "mysql"
    }

    async fn ensure_table(&self, schema: &TableSchema) -> Result<()> {
        let ddl = create_table_sql(Dialect::MySql, schema);
        tracing::debug!("DDL: {}", ddl);
        self.runner.run(&self.mysql_command(&ddl)).await?;
        Ok(())
    }

    async fn bulk_load(&self, source: &CsvSource, schema: &TableSchema, delimiter: u8) -> Result<()> {
        let staged = stage_source(source)?;
        let statement = load_data_sql(&schema.table_name, staged.path(), delimiter);
        tracing::debug!("LOAD DATA: {}", statement);

        let result = self.runner.run(&self.mysql_command(&statement)).await;
        drop(staged);
        result?;
        Ok(())
    }
}
