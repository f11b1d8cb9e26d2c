pub mod error;
pub mod export;
pub mod loader;
pub mod table;

pub use error::LoadError;
pub use export::ExportKind;
pub use loader::{ExportSet, load_exports};
pub use table::{Column, Row, Table};
