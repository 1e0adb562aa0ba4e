//! Speechpad - 文本朗读与导出
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Speech Context: 文本校验、语音参数、时长估算、语音列表
//! - Playback Context: 播放状态机与进度
//! - Export Context: 导出产物、文本说明、静音 WAV
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SpeechEngine, AudioRecorder, FileSaver）
//! - Playback: 播放控制器与单任务事件循环
//! - Export: 导出与回退策略
//! - Capability: 启动时能力检测
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: TTS 占位接口
//! - Adapters: 进程内引擎、录制器、文件保存
//! - Events: 播放事件广播

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
