pub mod checker;

pub use checker::{ToolChecker, ToolSpec, ToolStatus, DATABASE_TOOLS};
