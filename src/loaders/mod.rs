pub mod command;
pub mod mysql;
pub mod postgres;
pub mod sql;
pub mod sqlite;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use command::{CommandOutput, CommandRunner, CommandSpec, LineSink, SystemRunner};
pub use mysql::{MySqlConnection, MySqlLoader};
pub use postgres::{PostgresConnection, PostgresLoader};
pub use sqlite::SqliteLoader;

use crate::domain::model::CsvSource;
use crate::source::open_source;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// 需要實體檔案的載入方式 (sqlite3 `.import`、MySQL `LOAD DATA`) 用的來源路徑。
/// 壓縮檔會先解壓到暫存檔，暫存檔在 `StagedFile` drop 時刪除。
pub struct StagedFile {
    path: PathBuf,
    _temp: Option<NamedTempFile>,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self._temp.is_some()
    }
}

pub fn stage_source(source: &CsvSource) -> Result<StagedFile> {
    if !source.compressed {
        return Ok(StagedFile {
            path: absolute(&source.path)?,
            _temp: None,
        });
    }

    let mut reader = open_source(&source.path, true)?;
    let mut temp = tempfile::Builder::new()
        .prefix("csv2db-")
        .suffix(".csv")
        .tempfile()?;
    let bytes = std::io::copy(&mut reader, temp.as_file_mut())?;
    tracing::debug!(
        "Decompressed {} ({} bytes) to {}",
        source.file_name(),
        bytes,
        temp.path().display()
    );

    Ok(StagedFile {
        path: temp.path().to_path_buf(),
        _temp: Some(temp),
    })
}

pub fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_stage_plain_file_is_absolute_and_not_temporary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.csv");
        std::fs::write(&path, "x|y\n1|2\n").unwrap();

        let staged = stage_source(&CsvSource {
            path: path.clone(),
            compressed: false,
            table_name: "a".to_string(),
        })
        .unwrap();

        assert!(!staged.is_temporary());
        assert!(staged.path().is_absolute());
    }

    #[test]
    fn test_stage_gzip_file_is_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.csv.gz");
        let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::fast());
        encoder.write_all(b"x|y\n1|2\n").unwrap();
        encoder.finish().unwrap();

        let staged = stage_source(&CsvSource {
            path,
            compressed: true,
            table_name: "a".to_string(),
        })
        .unwrap();
        let staged_path = staged.path().to_path_buf();

        assert!(staged.is_temporary());
        assert_eq!(std::fs::read_to_string(&staged_path).unwrap(), "x|y\n1|2\n");

        drop(staged);
        assert!(!staged_path.exists());
    }
}
