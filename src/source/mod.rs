pub mod discovery;
pub mod header;

pub use discovery::{discover, table_name_for};
pub use header::{open_source, read_header};
