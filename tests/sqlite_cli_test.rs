//! 需要系統上有 sqlite3 (3.32 以上，支援 `.import --skip`)；找不到時略過

use csv2db::app::{run_import, RunOptions};
use csv2db::config::toml_config::{Target, TomlConfig};
use csv2db::tools::{ToolChecker, ToolStatus};
use csv2db::utils::validation::Validate;
use csv2db::SqliteLoader;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn sqlite3_available() -> bool {
    if !matches!(ToolChecker::default().check("sqlite3"), ToolStatus::OnPath { .. }) {
        eprintln!("sqlite3 not on PATH, skipping");
        return false;
    }

    let version = Command::new("sqlite3")
        .arg("-version")
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).into_owned())
        .unwrap_or_default();
    let mut parts = version
        .split_whitespace()
        .next()
        .unwrap_or("0")
        .split('.')
        .map(|p| p.parse::<u32>().unwrap_or(0));
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    if (major, minor) < (3, 32) {
        eprintln!("sqlite3 {} is too old for .import --skip, skipping", version.trim());
        return false;
    }
    true
}

fn query(db: &Path, sql: &str) -> anyhow::Result<String> {
    let output = Command::new("sqlite3").arg(db).arg(sql).output()?;
    anyhow::ensure!(
        output.status.success(),
        "sqlite3 failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(String::from_utf8(output.stdout)?)
}

#[tokio::test]
async fn test_import_into_real_sqlite_database() -> anyhow::Result<()> {
    if !sqlite3_available() {
        return Ok(());
    }

    let dir = TempDir::new()?;
    let input = dir.path().join("data");
    std::fs::create_dir_all(&input)?;
    std::fs::write(
        input.join("people.csv"),
        "id|name|note\n1|Ada|\"likes | pipes\"\n2|Grace|\n",
    )?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"sku|qty\nA-1|3\nB-2|7\n")?;
    std::fs::write(input.join("stock.csv.gz"), encoder.finish()?)?;

    let db = dir.path().join("out.db");
    let settings = csv2db::ImportSettings::new(input.to_string_lossy());

    let report = run_import(SqliteLoader::new(&db), settings.clone(), &RunOptions::default()).await?;
    assert_eq!(report.imported(), 2);

    assert_eq!(
        query(&db, "SELECT name || ':' || note FROM people ORDER BY id;")?,
        "Ada:likes | pipes\nGrace:\n"
    );
    assert_eq!(query(&db, "SELECT sum(qty) FROM stock;")?, "10\n");

    // 暫存的解壓檔不會留在輸入目錄
    let leftovers: Vec<_> = std::fs::read_dir(&input)?.collect();
    assert_eq!(leftovers.len(), 2);

    // 資料表已存在時再次匯入會追加資料
    run_import(SqliteLoader::new(&db), settings, &RunOptions::default()).await?;
    assert_eq!(query(&db, "SELECT count(*) FROM people;")?, "4\n");
    Ok(())
}

#[tokio::test]
async fn test_toml_config_drives_sqlite_import() -> anyhow::Result<()> {
    if !sqlite3_available() {
        return Ok(());
    }

    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("cities.csv"), "name;country\nOslo;NO\nLima;PE\n")?;
    let db = dir.path().join("cities.db");

    std::env::set_var("CSV2DB_IT_SQLITE_DB", db.to_string_lossy().as_ref());
    let config = TomlConfig::from_toml_str(&format!(
        "[import]\ninput_dir = {:?}\ndelimiter = \";\"\n\n[target]\nkind = \"sqlite\"\ndatabase = \"${{CSV2DB_IT_SQLITE_DB}}\"\n",
        dir.path().to_string_lossy()
    ))?;
    std::env::remove_var("CSV2DB_IT_SQLITE_DB");

    config.validate()?;
    let target = config.target()?;
    assert_eq!(target, Target::Sqlite(db.clone()));

    let Target::Sqlite(path) = target else {
        anyhow::bail!("expected an sqlite target");
    };
    let report = run_import(SqliteLoader::new(path), config.settings()?, &RunOptions::default()).await?;

    assert!(report.is_success());
    assert_eq!(
        query(&db, "SELECT country FROM cities ORDER BY name;")?,
        "PE\nNO\n"
    );
    Ok(())
}
