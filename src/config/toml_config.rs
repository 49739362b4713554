use crate::config::{ImportSettings, DEFAULT_DELIMITER};
use crate::loaders::{MySqlConnection, PostgresConnection};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_delimiter, validate_non_empty_string, validate_path, validate_port,
    validate_required_field, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub import: ImportSection,
    pub target: TargetConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSection {
    pub input_dir: String,
    pub delimiter: Option<String>,
    pub report: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Postgres,
    Sqlite,
    Mysql,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub kind: TargetKind,
    /// PostgreSQL/MySQL 的資料庫名稱，或 SQLite 的檔案路徑
    pub database: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

/// 解析後的目標資料庫
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Postgres(PostgresConnection),
    Sqlite(PathBuf),
    MySql(MySqlConnection),
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PGPASSWORD})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn delimiter(&self) -> Result<u8> {
        match &self.import.delimiter {
            Some(d) => validate_delimiter("import.delimiter", d),
            None => Ok(DEFAULT_DELIMITER),
        }
    }

    pub fn settings(&self) -> Result<ImportSettings> {
        Ok(ImportSettings {
            input_dir: self.import.input_dir.clone(),
            delimiter: self.delimiter()?,
        })
    }

    pub fn target(&self) -> Result<Target> {
        let t = &self.target;
        validate_non_empty_string("target.database", &t.database)?;

        match t.kind {
            TargetKind::Sqlite => Ok(Target::Sqlite(PathBuf::from(&t.database))),
            TargetKind::Postgres => Ok(Target::Postgres(PostgresConnection {
                host: self.host(),
                port: self.port(5432)?,
                dbname: t.database.clone(),
                user: validate_required_field("target.user", &t.user)?.clone(),
                password: t.password.clone().unwrap_or_default(),
            })),
            TargetKind::Mysql => Ok(Target::MySql(MySqlConnection {
                host: self.host(),
                port: self.port(3306)?,
                database: t.database.clone(),
                user: validate_required_field("target.user", &t.user)?.clone(),
                password: t.password.clone().unwrap_or_default(),
            })),
        }
    }

    fn host(&self) -> String {
        self.target
            .host
            .clone()
            .unwrap_or_else(|| "localhost".to_string())
    }

    fn port(&self, default: u16) -> Result<u16> {
        let port = self.target.port.unwrap_or(default);
        validate_port("target.port", port)?;
        Ok(port)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_path("import.input_dir", &self.import.input_dir)?;
        self.settings()?.validate()?;
        self.target()?;
        if let Some(password) = &self.target.password {
            if password.starts_with("${") {
                tracing::warn!("target.password references an unset environment variable");
            }
        }
        Ok(())
    }
}
