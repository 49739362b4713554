use crate::domain::model::CsvSource;
use crate::utils::error::{EtlError, Result};
use std::path::{Path, PathBuf};

/// 列出目錄下所有 `*.csv`，接著是所有 `*.csv.gz`（不遞迴）
pub fn discover(dir: impl AsRef<Path>) -> Result<Vec<CsvSource>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(EtlError::NoInputFiles {
            dir: dir.display().to_string(),
        });
    }

    let mut sources = Vec::new();
    for (pattern, compressed) in [("*.csv", false), ("*.csv.gz", true)] {
        for path in matching_files(dir, pattern)? {
            let table_name = table_name_for(&path);
            sources.push(CsvSource {
                path,
                compressed,
                table_name,
            });
        }
    }

    if sources.is_empty() {
        return Err(EtlError::NoInputFiles {
            dir: dir.display().to_string(),
        });
    }

    tracing::debug!("Discovered {} input files in {}", sources.len(), dir.display());
    Ok(sources)
}

/// 隱藏檔 (`.orders.csv`、macOS 的 `._orders.csv`) 不算輸入
const MATCH_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

fn matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let full = Path::new(&escaped).join(pattern);

    let mut files: Vec<PathBuf> = glob::glob_with(&full.to_string_lossy(), MATCH_OPTIONS)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// 檔名第一個 `.` 之前的部分：`orders.2024.csv.gz` -> `orders`
pub fn table_name_for(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    file_name.split('.').next().unwrap_or_default().to_string()
}
