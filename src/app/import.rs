use crate::config::ImportSettings;
use crate::core::etl::EtlEngine;
use crate::core::pipeline::ImportPipeline;
use crate::domain::model::{FileOutcome, ImportReport, TransformResult};
use crate::domain::ports::{BulkLoader, Pipeline};
use crate::utils::error::{EtlError, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub monitor: bool,
    pub report_path: Option<PathBuf>,
}

/// 建立 pipeline 並執行；有指定報表路徑時寫出 JSON 報表
pub async fn run_import<L: BulkLoader>(
    loader: L,
    settings: ImportSettings,
    options: &RunOptions,
) -> Result<ImportReport> {
    if options.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = ImportPipeline::new(loader, settings);
    let engine = EtlEngine::new_with_monitoring(pipeline, options.monitor);
    let report = engine.run().await?;

    if let Some(path) = &options.report_path {
        write_report(&report, path)?;
        tracing::info!("📁 Report saved to: {}", path.display());
    }

    Ok(report)
}

/// 只執行 extract 與 transform，不接觸資料庫 (`--dry-run`)
pub async fn plan_import<L: BulkLoader>(loader: L, settings: ImportSettings) -> Result<TransformResult> {
    let pipeline = ImportPipeline::new(loader, settings);
    let sources = pipeline.extract().await?;
    pipeline.transform(sources).await
}

pub fn write_report(report: &ImportReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// 輸出結果並回傳程序結束碼
pub fn finish(result: Result<ImportReport>) -> i32 {
    match result {
        Ok(report) => {
            for file in &report.files {
                match &file.outcome {
                    FileOutcome::Imported => {}
                    FileOutcome::Skipped { reason } => {
                        println!("  ⚠️  {} -> {}: skipped ({})", file.file, file.table, reason)
                    }
                    FileOutcome::Failed { error } => {
                        eprintln!("  ❌ {} -> {}: {}", file.file, file.table, error)
                    }
                }
            }
            println!(
                "\n{} import process complete: {} imported, {} skipped, {} failed.",
                report.target,
                report.imported(),
                report.skipped(),
                report.failed()
            );
            if report.is_success() {
                0
            } else {
                1
            }
        }
        Err(e) => report_error(&e),
    }
}

pub fn report_error(e: &EtlError) -> i32 {
    tracing::error!(
        "❌ Import failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    e.exit_code()
}
