#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_existing_dir, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DELIMITER: u8 = b'|';

/// 匯入流程所需的設定：輸入目錄與分隔符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub input_dir: String,
    pub delimiter: u8,
}

impl ImportSettings {
    pub fn new(input_dir: impl Into<String>) -> Self {
        Self {
            input_dir: input_dir.into(),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl ConfigProvider for ImportSettings {
    fn input_dir(&self) -> &str {
        &self.input_dir
    }

    fn delimiter(&self) -> u8 {
        self.delimiter
    }
}

impl Validate for ImportSettings {
    fn validate(&self) -> Result<()> {
        validate_existing_dir("input_dir", &self.input_dir)
    }
}
