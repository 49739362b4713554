use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
}

pub const DATABASE_TOOLS: [ToolSpec; 4] = [
    ToolSpec {
        name: "psql",
        description: "PostgreSQL Client",
    },
    ToolSpec {
        name: "mysql",
        description: "MySQL Client",
    },
    ToolSpec {
        name: "isql",
        description: "Firebird SQL Client",
    },
    ToolSpec {
        name: "sqlite3",
        description: "SQLite3 Client",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolStatus {
    /// 在 PATH 上找到
    OnPath { path: PathBuf },
    /// 不在 PATH，但在常見安裝目錄找到
    InKnownLocation { path: PathBuf },
    NotFound,
}

impl ToolStatus {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ToolStatus::OnPath { path } | ToolStatus::InKnownLocation { path } => Some(path),
            ToolStatus::NotFound => None,
        }
    }
}

/// 各作業系統不在 PATH 上的常見安裝目錄，Windows 路徑可含 glob 萬用字元
pub fn search_dirs(os: &str, tool: &str) -> &'static [&'static str] {
    match (os, tool) {
        ("macos", "psql") => &[
            "/Applications/Postgres.app/Contents/Versions/latest/bin",
            "/usr/local/bin",
            "/opt/homebrew/bin",
        ],
        ("macos", "mysql") => &["/usr/local/mysql/bin", "/usr/local/bin", "/opt/homebrew/bin"],
        ("macos", "isql") => &[
            "/Library/Frameworks/Firebird.framework/Versions/Current/Resources/bin",
            "/usr/local/bin",
            "/opt/firebird/bin",
        ],
        ("macos", "sqlite3") => &["/usr/bin"],
        ("linux", "psql") => &["/usr/bin", "/usr/local/bin", "/opt/postgresql/bin"],
        ("linux", "mysql") => &["/usr/bin", "/usr/local/bin"],
        ("linux", "isql") => &["/opt/firebird/bin", "/usr/bin", "/usr/local/bin"],
        ("linux", "sqlite3") => &["/usr/bin"],
        ("windows", "psql") => &["C:\\Program Files\\PostgreSQL\\*\\bin"],
        ("windows", "mysql") => &["C:\\Program Files\\MySQL\\MySQL Server *\\bin"],
        ("windows", "isql") => &["C:\\Program Files\\Firebird\\Firebird_*"],
        ("windows", "sqlite3") => &["C:\\sqlite"],
        _ => &[],
    }
}

pub struct ToolChecker {
    os: String,
    path_var: Option<OsString>,
}

impl Default for ToolChecker {
    fn default() -> Self {
        Self::new(std::env::consts::OS, std::env::var_os("PATH"))
    }
}

impl ToolChecker {
    pub fn new(os: impl Into<String>, path_var: Option<OsString>) -> Self {
        Self {
            os: os.into(),
            path_var,
        }
    }

    pub fn check(&self, tool: &str) -> ToolStatus {
        if let Some(path) = self.find_on_path(tool) {
            return ToolStatus::OnPath { path };
        }

        tracing::debug!("{} not on PATH, searching common directories", tool);
        for pattern in search_dirs(&self.os, tool) {
            for dir in expand(pattern) {
                if let Some(path) = executable_in(&dir, tool) {
                    return ToolStatus::InKnownLocation { path };
                }
            }
        }

        ToolStatus::NotFound
    }

    pub fn check_all(&self) -> Vec<(ToolSpec, ToolStatus)> {
        DATABASE_TOOLS
            .iter()
            .map(|spec| (*spec, self.check(spec.name)))
            .collect()
    }

    fn find_on_path(&self, tool: &str) -> Option<PathBuf> {
        let path_var = self.path_var.as_ref()?;
        std::env::split_paths(path_var).find_map(|dir| executable_in(&dir, tool))
    }
}

fn expand(pattern: &str) -> Vec<PathBuf> {
    if !pattern.contains(['*', '?']) {
        return vec![PathBuf::from(pattern)];
    }
    match glob::glob(pattern) {
        Ok(paths) => paths.filter_map(|p| p.ok()).collect(),
        Err(e) => {
            tracing::debug!("Invalid search pattern {}: {}", pattern, e);
            Vec::new()
        }
    }
}

fn executable_in(dir: &Path, tool: &str) -> Option<PathBuf> {
    [tool.to_string(), format!("{}.exe", tool)]
        .into_iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}
