pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod exporters;
pub mod loaders;
pub mod source;
pub mod tools;
pub mod utils;

pub use config::ImportSettings;
pub use core::{etl::EtlEngine, pipeline::ImportPipeline};
pub use loaders::{MySqlLoader, PostgresLoader, SqliteLoader};
pub use utils::error::{EtlError, Result};
