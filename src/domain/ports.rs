use crate::domain::model::{CsvSource, ImportReport, TableSchema, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 目標資料庫的建表與批次載入
#[async_trait]
pub trait BulkLoader: Send + Sync {
    /// 報表與日誌中使用的目標名稱
    fn target(&self) -> &str;

    /// 依目標資料庫的命名規則轉換表名
    fn table_name(&self, raw: &str) -> String {
        raw.to_string()
    }

    async fn ensure_table(&self, schema: &TableSchema) -> Result<()>;

    async fn bulk_load(&self, source: &CsvSource, schema: &TableSchema, delimiter: u8) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn input_dir(&self) -> &str;
    fn delimiter(&self) -> u8;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<CsvSource>>;
    async fn transform(&self, sources: Vec<CsvSource>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<ImportReport>;
}
