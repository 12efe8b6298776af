//! Report persistence: JSON results, the readable text summary and CSV data exports

pub mod data;
pub mod summary;
pub mod writer;

pub use data::DataWriter;
pub use summary::render_summary;
pub use writer::{ReportFiles, ReportWriter};
