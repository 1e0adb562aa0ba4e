//! Application Ports - 出站端口定义
//!
//! 定义应用层与外部协作者（合成引擎、录音、文件保存）的抽象接口

mod audio_recorder;
mod file_saver;
mod speech_engine;

pub use audio_recorder::{AudioRecorderPort, CaptureSession, RecorderError};
pub use file_saver::{FileSaveError, FileSaverPort, SavedFile};
pub use speech_engine::{
    EngineCapability, EngineError, EngineEvent, SpeechEnginePort, Utterance,
};
