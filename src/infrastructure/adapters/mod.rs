//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod engine;
pub mod recorder;
pub mod saver;

pub use engine::*;
pub use recorder::*;
pub use saver::*;
