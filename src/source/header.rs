use crate::domain::model::CsvSource;
use crate::utils::error::{EtlError, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

const UTF8_BOM: &str = "\u{feff}";

/// 開啟來源檔案，`.gz` 透明解壓
pub fn open_source(path: &Path, compressed: bool) -> Result<Box<dyn Read>> {
    let file = File::open(path)?;
    if compressed {
        Ok(Box::new(GzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(file))
    }
}

/// 讀取第一行作為欄位名稱；空檔或空白標頭回傳 `None`
pub fn read_header(source: &CsvSource, delimiter: u8) -> Result<Option<Vec<String>>> {
    let reader = open_source(&source.path, source.compressed)?;
    parse_header(BufReader::new(reader), delimiter)
}

pub fn parse_header<R: BufRead>(mut reader: R, delimiter: u8) -> Result<Option<Vec<String>>> {
    let mut line = String::new();
    reader.read_line(&mut line).map_err(|e| match e.kind() {
        std::io::ErrorKind::InvalidData => EtlError::ProcessingError {
            message: format!("header is not valid UTF-8: {}", e),
        },
        _ => EtlError::IoError(e),
    })?;

    let line = line.strip_prefix(UTF8_BOM).unwrap_or(&line);
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(line.as_bytes());

    let mut record = csv::StringRecord::new();
    if !csv_reader.read_record(&mut record)? {
        return Ok(None);
    }

    let columns = record
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = name.trim();
            if name.is_empty() {
                format!("column_{}", idx + 1)
            } else {
                name.to_string()
            }
        })
        .collect();

    Ok(Some(columns))
}
