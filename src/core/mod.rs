pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{CsvSource, ImportReport, TransformResult};
pub use crate::domain::ports::{BulkLoader, ConfigProvider, Pipeline};
pub use crate::utils::error::Result;
