use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid search pattern: {0}")]
    PatternError(#[from] glob::PatternError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("No .csv or .csv.gz files found in '{dir}'")]
    NoInputFiles { dir: String },

    #[error("'{tool}' command not found")]
    ToolNotFound { tool: String },

    #[error("{tool} exited with {status}: {stderr}")]
    CommandFailed {
        tool: String,
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Output is not valid '{encoding}': {message}")]
    EncodingError { encoding: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    ExternalTool,
    Database,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::PatternError(_) => ErrorCategory::Configuration,
            EtlError::CsvError(_)
            | EtlError::NoInputFiles { .. }
            | EtlError::EncodingError { .. }
            | EtlError::ProcessingError { .. } => ErrorCategory::Input,
            EtlError::ToolNotFound { .. } => ErrorCategory::ExternalTool,
            EtlError::CommandFailed { .. } => ErrorCategory::Database,
            EtlError::IoError(_) | EtlError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Database => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::ExternalTool | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 退出碼: Low 0, Medium 2, High 1, Critical 3
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::NoInputFiles { .. } => {
                "Check --input-dir; only *.csv and *.csv.gz files are picked up".to_string()
            }
            EtlError::ToolNotFound { tool } => format!(
                "Install the '{}' client tools and make sure they are on your PATH (run db_checker)",
                tool
            ),
            EtlError::CommandFailed { .. } => {
                "Check the database credentials and the stderr output above".to_string()
            }
            EtlError::EncodingError { .. } => {
                "Try a different encoding with --encoding, such as 'latin-1' or 'cp1252'".to_string()
            }
            EtlError::CsvError(_) => {
                "Make sure the first line of every file is a delimited header".to_string()
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::PatternError(_) => "Review the configuration file and arguments".to_string(),
            EtlError::IoError(_) => "Check that the paths exist and are readable".to_string(),
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                "Re-run with --verbose for more details".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ToolNotFound { tool } => format!(
                "Error: '{}' command not found. Please ensure the client tools are installed and in your system's PATH.",
                tool
            ),
            EtlError::NoInputFiles { dir } => {
                format!("Error: No .csv or .csv.gz files found in '{}'.", dir)
            }
            EtlError::CommandFailed { tool, stderr, .. } => {
                format!("Error executing {} command. Stderr: {}", tool, stderr.trim())
            }
            other => format!("Error: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
