//! Capability - 启动时的能力检测
//!
//! 引擎能力只检测一次。不支持时整个功能进入 `Unavailable` 状态，
//! 而不是在各个命令里分别判断。

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::application::error::ApplicationError;
use crate::application::export::{ExportConfig, ExportService};
use crate::application::playback::{PlaybackHandle, PlaybackWorker, PlaybackWorkerConfig};
use crate::application::ports::{
    AudioRecorderPort, EngineCapability, FileSaverPort, SpeechEnginePort,
};
use crate::infrastructure::events::EventPublisher;

/// 可用时的功能组合
pub struct SpeechStudio {
    pub playback: PlaybackHandle,
    pub export: Arc<ExportService>,
    pub events: Arc<EventPublisher>,
    worker: JoinHandle<()>,
}

impl SpeechStudio {
    /// Stop：停止朗读并取消进行中的录制
    pub async fn stop_all(&self) -> Result<(), ApplicationError> {
        self.export.cancel();
        self.playback.stop().await?;
        Ok(())
    }

    /// 关闭 worker
    pub async fn shutdown(self) {
        self.export.cancel();
        drop(self.playback);
        if let Err(e) = self.worker.await {
            tracing::error!(error = %e, "Playback worker panicked");
        }
    }
}

/// 语音功能状态
pub enum SpeechFeature {
    Ready(SpeechStudio),
    Unavailable { reason: String },
}

impl SpeechFeature {
    /// 检测引擎能力并在可用时启动播放 worker
    ///
    /// 需要在 tokio 运行时内调用
    pub fn initialize(
        engine: Arc<dyn SpeechEnginePort>,
        recorder: Arc<dyn AudioRecorderPort>,
        saver: Arc<dyn FileSaverPort>,
        playback_config: PlaybackWorkerConfig,
        export_config: ExportConfig,
    ) -> Self {
        if let EngineCapability::Unsupported { reason } = engine.capability() {
            tracing::error!(reason = %reason, "Speech synthesis unavailable");
            return Self::Unavailable { reason };
        }

        let events = Arc::new(EventPublisher::new());
        let (worker, playback) = PlaybackWorker::new(playback_config, engine.clone(), events.clone());
        let worker = tokio::spawn(worker.run());
        let export = Arc::new(ExportService::new(engine, recorder, saver, export_config));

        tracing::info!("Speech synthesis ready");
        Self::Ready(SpeechStudio {
            playback,
            export,
            events,
            worker,
        })
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// 取出可用的功能组合，不可用时返回 `EngineUnsupported`
    pub fn ready(self) -> Result<SpeechStudio, ApplicationError> {
        match self {
            Self::Ready(studio) => Ok(studio),
            Self::Unavailable { reason } => Err(ApplicationError::EngineUnsupported(reason)),
        }
    }
}
