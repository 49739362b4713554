use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 一個待匯入的檔案 (.csv 或 .csv.gz)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvSource {
    pub path: PathBuf,
    pub compressed: bool,
    pub table_name: String,
}

impl CsvSource {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// 由標頭列推得的資料表結構，所有欄位皆為 TEXT
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<String>,
}

/// `position` 是來源檔在探索結果中的順序，報表依此排序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    pub position: usize,
    pub source: CsvSource,
    pub schema: TableSchema,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub position: usize,
    pub report: FileReport,
}

/// transform 階段的結果：可匯入的計畫，以及已經決定跳過或失敗的檔案
#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub plans: Vec<ImportPlan>,
    pub rejected: Vec<RejectedFile>,
}

impl TransformResult {
    pub fn reject(&mut self, position: usize, source: &CsvSource, outcome: FileOutcome) {
        self.rejected.push(RejectedFile {
            position,
            report: FileReport::new(source, outcome),
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Imported,
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub file: String,
    pub table: String,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn new(source: &CsvSource, outcome: FileOutcome) -> Self {
        Self {
            file: source.file_name(),
            table: source.table_name.clone(),
            outcome,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub files: Vec<FileReport>,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Imported))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }
}
