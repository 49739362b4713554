use crate::domain::model::{CsvSource, TableSchema};
use crate::domain::ports::BulkLoader;
use crate::loaders::command::{CommandRunner, CommandSpec, SystemRunner};
use crate::loaders::sql::{create_table_sql, Dialect};
use crate::loaders::stage_source;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// 透過 `sqlite3` CLI 建表並以 `.import` 載入
pub struct SqliteLoader<R: CommandRunner = SystemRunner> {
    db_path: PathBuf,
    runner: R,
    sqlite3: String,
}

impl SqliteLoader<SystemRunner> {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self::with_runner(db_path, SystemRunner)
    }
}

impl<R: CommandRunner> SqliteLoader<R> {
    pub fn with_runner(db_path: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            db_path: db_path.into(),
            runner,
            sqlite3: "sqlite3".to_string(),
        }
    }

    pub fn sqlite3_path(mut self, path: impl Into<String>) -> Self {
        self.sqlite3 = path.into();
        self
    }

    fn db_arg(&self) -> String {
        self.db_path.to_string_lossy().into_owned()
    }
}

/// `.import` 的點指令腳本，透過 stdin 餵給 sqlite3。
/// `--csv` 會把分隔符重設為逗號，所以改用 `.mode csv` 加 `.separator`。
pub fn import_script(table: &str, path: &Path, delimiter: u8) -> String {
    format!(
        ".bail on\n.mode csv\n.separator {}\n.import --skip 1 {} {}\n",
        dot_command_arg(&(delimiter as char).to_string()),
        dot_quote(&path.to_string_lossy()),
        dot_quote(table)
    )
}

fn dot_command_arg(value: &str) -> String {
    if value.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"' || c == '\\') {
        dot_quote(value)
    } else {
        value.to_string()
    }
}

fn dot_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[async_trait]
impl<R: CommandRunner> BulkLoader for SqliteLoader<R> {
    fn target(&self) -> &str {
        "sqlite"
    }

    async fn ensure_table(&self, schema: &TableSchema) -> Result<()> {
        let ddl = create_table_sql(Dialect::Sqlite, schema);
        tracing::debug!("DDL: {}", ddl);
        let spec = CommandSpec::new(&self.sqlite3).arg(self.db_arg()).arg(ddl);
        self.runner.run(&spec).await?;
        Ok(())
    }

    async fn bulk_load(&self, source: &CsvSource, schema: &TableSchema, delimiter: u8) -> Result<()> {
        // 壓縮檔先解壓到暫存檔，`staged` drop 時自動刪除
        let staged = stage_source(source)?;
        let script = import_script(&schema.table_name, staged.path(), delimiter);
        tracing::debug!("Import script: {}", script.trim());

        let spec = CommandSpec::new(&self.sqlite3).arg(self.db_arg()).stdin(script);
        let result = self.runner.run(&spec).await;
        drop(staged);

        let output = result?;
        // `.import` 遇到欄位數不符時只寫警告到 stderr 並繼續
        if !output.stderr.trim().is_empty() {
            tracing::warn!("sqlite3 reported for {}: {}", source.file_name(), output.stderr.trim());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::testing::RecordingRunner;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[test]
    fn test_import_script() {
        let script = import_script("Orders", Path::new("/tmp/orders.csv"), b'|');
        assert_eq!(
            script,
            ".bail on\n.mode csv\n.separator |\n.import --skip 1 \"/tmp/orders.csv\" \"Orders\"\n"
        );
    }

    #[test]
    fn test_separator_quoting() {
        assert_eq!(dot_command_arg("\t"), "\"\t\"");
        assert_eq!(dot_command_arg(";"), ";");
    }

    #[tokio::test]
    async fn test_table_name_keeps_case() {
        let loader = SqliteLoader::with_runner("db.sqlite", RecordingRunner::succeeding());
        assert_eq!(loader.table_name("Orders"), "Orders");
    }

    #[tokio::test]
    async fn test_ensure_table_passes_ddl_as_argument() {
        let runner = RecordingRunner::succeeding();
        let loader = SqliteLoader::with_runner("out.db", runner.clone());
        let schema = TableSchema {
            table_name: "people".to_string(),
            columns: vec!["id".to_string(), "name".to_string()],
        };

        loader.ensure_table(&schema).await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].program, "sqlite3");
        assert_eq!(
            calls[0].args,
            vec![
                "out.db".to_string(),
                r#"CREATE TABLE IF NOT EXISTS "people" ("id" TEXT, "name" TEXT);"#.to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_compressed_source_is_staged_and_cleaned_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.csv.gz");
        let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::fast());
        encoder.write_all(b"id|name\n1|Ada\n").unwrap();
        encoder.finish().unwrap();

        // 記錄 sqlite3 執行當下暫存檔的內容
        let seen: Arc<Mutex<Option<(PathBuf, String)>>> = Arc::new(Mutex::new(None));
        let seen_clone = seen.clone();
        let runner = RecordingRunner::with_responder(move |spec| {
            if let Some(script) = &spec.stdin {
                let start = script.find("--skip 1 \"").unwrap() + "--skip 1 \"".len();
                let end = script[start..].find('"').unwrap() + start;
                let staged = PathBuf::from(&script[start..end]);
                let content = std::fs::read_to_string(&staged).unwrap();
                *seen_clone.lock().unwrap() = Some((staged, content));
            }
            Ok(Default::default())
        });

        let loader = SqliteLoader::with_runner("out.db", runner);
        let source = CsvSource {
            path,
            compressed: true,
            table_name: "people".to_string(),
        };
        let schema = TableSchema {
            table_name: "people".to_string(),
            columns: vec!["id".to_string(), "name".to_string()],
        };

        loader.bulk_load(&source, &schema, b'|').await.unwrap();

        let (staged, content) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(content, "id|name\n1|Ada\n");
        assert!(!staged.exists());
    }
}
