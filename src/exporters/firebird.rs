use crate::loaders::command::{CommandRunner, CommandSpec, SystemRunner};
use crate::loaders::sql::{quote_ident, quote_literal, Dialect};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use encoding_rs::{Decoder, DecoderResult, Encoding};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const LIST_TABLES_SQL: &str =
    "SELECT rdb$relation_name FROM rdb$relations WHERE rdb$system_flag = 0 AND rdb$view_blr IS NULL;";

const EXPORT_DELIMITER: &str = "|";

#[derive(Debug, Clone)]
pub struct FirebirdExportConfig {
    pub isql_path: String,
    pub uri: String,
    pub username: String,
    pub password: String,
    pub output_dir: PathBuf,
    pub encoding: String,
    pub compress: bool,
}

impl Validate for FirebirdExportConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("isql_path", &self.isql_path)?;
        validate_non_empty_string("uri", &self.uri)?;
        validate_non_empty_string("username", &self.username)?;
        validate_path("output_dir", &self.output_dir.to_string_lossy())?;
        lookup_encoding(&self.encoding)?;
        Ok(())
    }
}

fn lookup_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| EtlError::InvalidConfigValueError {
        field: "encoding".to_string(),
        value: label.to_string(),
        reason: "Unknown encoding label (try utf-8, latin-1 or cp1252)".to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableExportOutcome {
    Exported { file: PathBuf, rows: usize },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableExport {
    pub table: String,
    pub outcome: TableExportOutcome,
}

/// isql 查詢結果中的空行、`====` 分隔線與系統欄位標題
pub fn is_junk_line(line: &str) -> bool {
    let stripped = line.trim();
    stripped.is_empty()
        || stripped.chars().all(|c| c == '=')
        || stripped == "RDB$RELATION_NAME"
        || stripped == "RDB$FIELD_NAME"
}

pub fn clean_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !is_junk_line(line))
        .map(|line| line.trim().to_string())
        .collect()
}

pub fn export_query(table: &str, columns: &[String]) -> String {
    let select_parts = columns
        .iter()
        .map(|col| {
            format!(
                "COALESCE(CAST({} AS VARCHAR(1024)), '')",
                quote_ident(Dialect::Postgres, col)
            )
        })
        .collect::<Vec<_>>()
        .join(&format!(" || {} || ", quote_literal(EXPORT_DELIMITER)));

    format!(
        "SET HEADING OFF; SELECT {} FROM {};",
        select_parts,
        quote_ident(Dialect::Postgres, table)
    )
}

fn encoding_error(encoding: &'static Encoding) -> EtlError {
    EtlError::EncodingError {
        encoding: encoding.name().to_string(),
        message: "the database output contains byte sequences that cannot be decoded".to_string(),
    }
}

/// 逐行解碼 isql 輸出，解碼器狀態跨行保留
struct LineDecoder {
    encoding: &'static Encoding,
    decoder: Decoder,
    text: String,
}

impl LineDecoder {
    fn new(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            decoder: encoding.new_decoder_without_bom_handling(),
            text: String::new(),
        }
    }

    fn decode(&mut self, bytes: &[u8], last: bool) -> Result<&str> {
        self.text.clear();
        let needed = self
            .decoder
            .max_utf8_buffer_length_without_replacement(bytes.len())
            .ok_or_else(|| encoding_error(self.encoding))?;
        self.text.reserve(needed);

        let (result, _) = self
            .decoder
            .decode_to_string_without_replacement(bytes, &mut self.text, last);
        match result {
            DecoderResult::InputEmpty => Ok(&self.text),
            DecoderResult::Malformed(_, _) | DecoderResult::OutputFull => {
                Err(encoding_error(self.encoding))
            }
        }
    }

    /// 輸出結尾若有不完整的多位元組序列則視為解碼錯誤
    fn finish(&mut self) -> Result<()> {
        self.decode(&[], true).map(|_| ())
    }
}

/// 寫到輸出目錄內的暫存檔，成功後才改名為正式檔名
enum ExportWriter {
    Plain(BufWriter<NamedTempFile>),
    Gzip(GzEncoder<BufWriter<NamedTempFile>>),
}

impl ExportWriter {
    fn create(dir: &Path, compress: bool) -> Result<Self> {
        let file = BufWriter::new(NamedTempFile::new_in(dir)?);
        Ok(if compress {
            Self::Gzip(GzEncoder::new(file, Compression::default()))
        } else {
            Self::Plain(file)
        })
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        match self {
            Self::Plain(w) => writeln!(w, "{}", line)?,
            Self::Gzip(w) => writeln!(w, "{}", line)?,
        }
        Ok(())
    }

    fn finish(self) -> Result<NamedTempFile> {
        let buffered = match self {
            Self::Plain(w) => w,
            Self::Gzip(w) => w.finish()?,
        };
        buffered
            .into_inner()
            .map_err(|e| EtlError::IoError(e.into_error()))
    }
}

/// 以 `isql` 把 Firebird 使用者資料表匯出為 `|` 分隔的 CSV
pub struct FirebirdExporter<R: CommandRunner = SystemRunner> {
    config: FirebirdExportConfig,
    encoding: &'static Encoding,
    runner: R,
}

impl FirebirdExporter<SystemRunner> {
    pub fn new(config: FirebirdExportConfig) -> Result<Self> {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: CommandRunner> FirebirdExporter<R> {
    pub fn with_runner(config: FirebirdExportConfig, runner: R) -> Result<Self> {
        config.validate()?;
        let encoding = lookup_encoding(&config.encoding)?;
        Ok(Self {
            config,
            encoding,
            runner,
        })
    }

    fn isql(&self, input: String) -> CommandSpec {
        CommandSpec::new(&self.config.isql_path)
            .arg(&self.config.uri)
            .arg("-u")
            .arg(&self.config.username)
            .arg("-p")
            .arg(&self.config.password)
            .arg("-q")
            .stdin(input)
            .secret(&self.config.password)
    }

    async fn query_raw(&self, sql: &str) -> Result<String> {
        let output = self.runner.run(&self.isql(sql.to_string())).await?;
        self.decode(&output.stdout)
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        self.encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned())
            .ok_or_else(|| encoding_error(self.encoding))
    }

    pub async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(clean_lines(&self.query_raw(LIST_TABLES_SQL).await?))
    }

    pub async fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT rdb$field_name FROM rdb$relation_fields WHERE rdb$relation_name = {} ORDER BY rdb$field_position;",
            quote_literal(table)
        );
        Ok(clean_lines(&self.query_raw(&sql).await?))
    }

    fn output_path(&self, table: &str) -> PathBuf {
        let extension = if self.config.compress { "csv.gz" } else { "csv" };
        self.config.output_dir.join(format!("{}.{}", table, extension))
    }

    /// 匯出單一資料表；資料逐行寫進暫存檔，查詢成功後才改名為正式檔名
    pub async fn export_table(&self, table: &str) -> Result<TableExportOutcome> {
        let columns = self.list_columns(table).await?;
        if columns.is_empty() {
            tracing::warn!(
                "Could not find columns for table '{}'. Skipping.",
                table
            );
            return Ok(TableExportOutcome::Skipped {
                reason: "no columns found".to_string(),
            });
        }

        let mut writer = ExportWriter::create(&self.config.output_dir, self.config.compress)?;
        writer.write_line(&columns.join(EXPORT_DELIMITER))?;

        let mut decoder = LineDecoder::new(self.encoding);
        let mut rows = 0usize;
        {
            let mut on_line = |bytes: &[u8]| -> Result<()> {
                let row = decoder.decode(bytes, false)?.trim_end();
                if row.trim().is_empty() {
                    return Ok(());
                }
                writer.write_line(row)?;
                rows += 1;
                Ok(())
            };
            let spec = self.isql(export_query(table, &columns));
            self.runner.run_streaming(&spec, &mut on_line).await?;
        }
        decoder.finish()?;

        let path = self.output_path(table);
        writer
            .finish()?
            .persist(&path)
            .map_err(|e| EtlError::IoError(e.error))?;

        tracing::info!(
            "Successfully exported {} rows to {}",
            rows,
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        );
        Ok(TableExportOutcome::Exported { file: path, rows })
    }

    /// 匯出全部資料表；單一資料表失敗不影響其他資料表
    pub async fn export_all(&self) -> Result<Vec<TableExport>> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        tracing::info!(
            "Output files will be saved in: {}",
            self.config.output_dir.display()
        );

        tracing::info!(
            "Fetching table list from Firebird database (using {} encoding)...",
            self.encoding.name()
        );
        let tables = self.list_tables().await?;
        tracing::info!("Found {} tables.", tables.len());

        let mut results = Vec::with_capacity(tables.len());
        for table in tables {
            tracing::info!("Processing table: {}...", table);
            let outcome = match self.export_table(&table).await {
                Ok(outcome) => outcome,
                Err(e @ (EtlError::ToolNotFound { .. } | EtlError::EncodingError { .. })) => {
                    return Err(e)
                }
                Err(e) => {
                    tracing::error!(
                        "An error occurred while processing table '{}': {}",
                        table,
                        e
                    );
                    TableExportOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            results.push(TableExport { table, outcome });
        }

        Ok(results)
    }
}
