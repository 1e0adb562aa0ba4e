//! Export - 导出用例与回退策略

mod errors;
mod service;

pub use errors::ExportError;
pub use service::{ExportConfig, ExportMode, ExportOutcome, ExportService};
