pub mod import;

pub use import::{finish, plan_import, report_error, run_import, write_report, RunOptions};
