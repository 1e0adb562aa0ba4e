//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SpeechEngine、AudioRecorder、FileSaver）
//! - playback: 播放控制器与事件循环
//! - export: 导出与回退策略
//! - capability: 启动时能力检测
//! - error: 应用层错误定义

pub mod capability;
pub mod error;
pub mod export;
pub mod playback;
pub mod ports;

// Re-exports
pub use capability::{SpeechFeature, SpeechStudio};
pub use error::ApplicationError;
pub use export::{ExportConfig, ExportError, ExportMode, ExportOutcome, ExportService};
pub use playback::{
    PlaybackCommand, PlaybackController, PlaybackHandle, PlaybackStatus, PlaybackWorker,
    PlaybackWorkerConfig,
};
pub use ports::{
    // Audio recorder
    AudioRecorderPort,
    CaptureSession,
    RecorderError,
    // File saver
    FileSaveError,
    FileSaverPort,
    SavedFile,
    // Speech engine
    EngineCapability,
    EngineError,
    EngineEvent,
    SpeechEnginePort,
    Utterance,
};
