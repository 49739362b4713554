use crate::core::{BulkLoader, ConfigProvider, CsvSource, Pipeline, TransformResult};
use crate::domain::model::{FileOutcome, FileReport, ImportPlan, ImportReport, TableSchema};
use crate::source::{discover, read_header};
use crate::utils::error::{EtlError, Result};
use chrono::Utc;

/// 目錄 -> 標頭 -> 建表 -> 批次載入，一次處理一個檔案
pub struct ImportPipeline<L: BulkLoader, C: ConfigProvider> {
    loader: L,
    config: C,
}

impl<L: BulkLoader, C: ConfigProvider> ImportPipeline<L, C> {
    pub fn new(loader: L, config: C) -> Self {
        Self { loader, config }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    async fn import_one(&self, plan: &ImportPlan) -> Result<FileOutcome> {
        if let Err(e) = self.loader.ensure_table(&plan.schema).await {
            if matches!(e, EtlError::ToolNotFound { .. }) {
                return Err(e);
            }
            tracing::error!(
                "Failed to create table '{}'. Skipping import for this file: {}",
                plan.schema.table_name,
                e
            );
            return Ok(FileOutcome::Failed {
                error: format!("create table failed: {}", e),
            });
        }

        match self
            .loader
            .bulk_load(&plan.source, &plan.schema, self.config.delimiter())
            .await
        {
            Ok(()) => {
                tracing::info!(
                    "Successfully imported data into table '{}'.",
                    plan.schema.table_name
                );
                Ok(FileOutcome::Imported)
            }
            Err(e @ EtlError::ToolNotFound { .. }) => Err(e),
            Err(e) => {
                tracing::error!(
                    "Failed to import data for table '{}': {}",
                    plan.schema.table_name,
                    e
                );
                Ok(FileOutcome::Failed {
                    error: e.to_string(),
                })
            }
        }
    }
}

#[async_trait::async_trait]
impl<L: BulkLoader, C: ConfigProvider> Pipeline for ImportPipeline<L, C> {
    async fn extract(&self) -> Result<Vec<CsvSource>> {
        let mut sources = discover(self.config.input_dir())?;
        for source in &mut sources {
            source.table_name = self.loader.table_name(&source.table_name);
        }

        tracing::info!(
            "Found {} files to import into {} target.",
            sources.len(),
            self.loader.target()
        );
        Ok(sources)
    }

    async fn transform(&self, sources: Vec<CsvSource>) -> Result<TransformResult> {
        let mut result = TransformResult::default();

        for (position, source) in sources.into_iter().enumerate() {
            match read_header(&source, self.config.delimiter()) {
                Ok(Some(columns)) => {
                    tracing::debug!(
                        "{}: {} columns ({})",
                        source.file_name(),
                        columns.len(),
                        columns.join(", ")
                    );
                    let schema = TableSchema {
                        table_name: source.table_name.clone(),
                        columns,
                    };
                    result.plans.push(ImportPlan {
                        position,
                        source,
                        schema,
                    });
                }
                Ok(None) => {
                    tracing::warn!(
                        "File '{}' is empty or has no header. Skipping.",
                        source.path.display()
                    );
                    result.reject(
                        position,
                        &source,
                        FileOutcome::Skipped {
                            reason: "empty file or missing header".to_string(),
                        },
                    );
                }
                Err(e) => {
                    tracing::error!(
                        "Could not read header of '{}': {}",
                        source.file_name(),
                        e
                    );
                    result.reject(
                        position,
                        &source,
                        FileOutcome::Failed {
                            error: e.to_string(),
                        },
                    );
                }
            }
        }

        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<ImportReport> {
        let started_at = Utc::now();
        let TransformResult { plans, rejected } = result;
        let mut files: Vec<(usize, FileReport)> = rejected
            .into_iter()
            .map(|rejected| (rejected.position, rejected.report))
            .collect();

        for plan in &plans {
            tracing::info!(
                "Processing '{}' into table '{}'...",
                plan.source.file_name(),
                plan.schema.table_name
            );
            let outcome = self.import_one(plan).await?;
            files.push((plan.position, FileReport::new(&plan.source, outcome)));
        }
        files.sort_by_key(|(position, _)| *position);

        Ok(ImportReport {
            target: self.loader.target().to_string(),
            started_at,
            finished_at: Utc::now(),
            files: files.into_iter().map(|(_, report)| report).collect(),
        })
    }
}
