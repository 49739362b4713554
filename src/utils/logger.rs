use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 函式庫與各執行檔的 tracing target
const LOG_TARGETS: &[&str] = &[
    "csv2db",
    "import_postgresql",
    "import_sqlite",
    "import_mysql",
    "export_firebird",
    "db_checker",
];

fn default_directives(level: &str) -> String {
    let mut directives: Vec<String> = LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect();
    directives.push("info".to_string());
    directives.join(",")
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose { filter("debug") } else { filter("info") };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// JSON 格式日誌，方便給排程器或集中式日誌系統收集
pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(filter("info"))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_cover_binaries() {
        let directives = default_directives("info");
        for target in ["csv2db=info", "import_sqlite=info", "export_firebird=info", "db_checker=info"] {
            assert!(directives.contains(target), "missing {}", target);
        }
        assert!(directives.ends_with(",info"));
    }

    #[test]
    fn test_verbose_directives_parse() {
        let directives = default_directives("debug");
        assert!(directives.contains("import_postgresql=debug"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
