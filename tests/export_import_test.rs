use csv2db::app::{run_import, RunOptions};
use csv2db::domain::model::FileOutcome;
use csv2db::exporters::{FirebirdExportConfig, FirebirdExporter, TableExportOutcome};
use csv2db::loaders::testing::RecordingRunner;
use csv2db::loaders::CommandOutput;
use csv2db::source::{discover, read_header};
use csv2db::{ImportSettings, SqliteLoader};
use tempfile::TempDir;

/// 模擬 isql：兩張表，INVOICES 的資料查詢失敗
fn fake_isql() -> RecordingRunner {
    RecordingRunner::with_responder(|spec| {
        let sql = spec.stdin.clone().unwrap_or_default();
        let stdout: &[u8] = if sql.contains("FROM rdb$relations") {
            b"\nRDB$RELATION_NAME\n==================\nCLIENTES\nINVOICES\n"
        } else if sql.contains("'CLIENTES'") {
            b"RDB$FIELD_NAME\n==============\nID\nNOMBRE\n"
        } else if sql.contains("'INVOICES'") {
            b"RDB$FIELD_NAME\n==============\nID\n"
        } else if sql.contains("FROM \"CLIENTES\"") {
            // latin-1 編碼的 "José"
            b"1|Jos\xe9     \n2|Ana      \n"
        } else {
            return Err(csv2db::EtlError::CommandFailed {
                tool: spec.tool_name(),
                command: "isql".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "Statement failed".to_string(),
            });
        };
        Ok(CommandOutput {
            stdout: stdout.to_vec(),
            stderr: String::new(),
        })
    })
}

#[tokio::test]
async fn test_exported_files_can_be_imported() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let out = dir.path().join("export");
    let exporter = FirebirdExporter::with_runner(
        FirebirdExportConfig {
            isql_path: "isql-fb".to_string(),
            uri: "localhost:/srv/legacy.fdb".to_string(),
            username: "SYSDBA".to_string(),
            password: "masterkey".to_string(),
            output_dir: out.clone(),
            encoding: "latin1".to_string(),
            compress: true,
        },
        fake_isql(),
    )?;

    let exports = exporter.export_all().await?;

    assert_eq!(exports.len(), 2);
    assert_eq!(
        exports[0].outcome,
        TableExportOutcome::Exported {
            file: out.join("CLIENTES.csv.gz"),
            rows: 2
        }
    );
    assert!(matches!(exports[1].outcome, TableExportOutcome::Failed { .. }));
    assert!(!out.join("INVOICES.csv.gz").exists());

    // 匯出的檔案就是匯入端的輸入
    let sources = discover(&out)?;
    assert_eq!(sources.len(), 1);
    assert!(sources[0].compressed);
    assert_eq!(
        read_header(&sources[0], b'|')?,
        Some(vec!["ID".to_string(), "NOMBRE".to_string()])
    );

    let runner = RecordingRunner::succeeding();
    let loader = SqliteLoader::with_runner(dir.path().join("legacy.db"), runner.clone());
    let report = run_import(
        loader,
        ImportSettings::new(out.to_string_lossy()),
        &RunOptions::default(),
    )
    .await?;

    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].table, "CLIENTES");
    assert_eq!(report.files[0].outcome, FileOutcome::Imported);

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].args[1].contains("CREATE TABLE IF NOT EXISTS \"CLIENTES\" (\"ID\" TEXT, \"NOMBRE\" TEXT);"));
    let script = calls[1].stdin.clone().unwrap_or_default();
    assert!(script.contains(".import --skip 1"));
    assert!(script.ends_with("\"CLIENTES\"\n"));
    Ok(())
}

#[tokio::test]
async fn test_undecodable_output_aborts_export() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let exporter = FirebirdExporter::with_runner(
        FirebirdExportConfig {
            isql_path: "isql".to_string(),
            uri: "localhost:/srv/legacy.fdb".to_string(),
            username: "SYSDBA".to_string(),
            password: "masterkey".to_string(),
            output_dir: dir.path().join("export"),
            encoding: "utf-8".to_string(),
            compress: false,
        },
        fake_isql(),
    )?;

    let err = exporter.export_all().await.unwrap_err();
    assert!(matches!(err, csv2db::EtlError::EncodingError { .. }));
    assert!(!dir.path().join("export/CLIENTES.csv").exists());
    Ok(())
}
