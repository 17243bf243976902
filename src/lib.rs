pub mod aggregate;
pub mod classify;
pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod extract;
pub mod form1040;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod tax;
pub mod text;

pub use core::model::{DocumentType, FieldValue, ParsedDocument, RawDocument, Summary, TaxResult};
pub use pipeline::{BatchOutcome, Pipeline};
pub use tax::{compute_tax_summary, FilingStatus};
