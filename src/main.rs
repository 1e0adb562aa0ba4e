//! Speechpad - 文本朗读与导出
//!
//! 二进制只提供 TTS 占位 HTTP 服务。
//! 朗读与导出核心（`SpeechFeature`）由嵌入方在进程内驱动，这里只探测引擎能力。

use speechpad::application::{EngineCapability, SpeechEnginePort};
use speechpad::config::{load_config, print_config, LogConfig};
use speechpad::domain::speech::VoiceDescriptor;
use speechpad::infrastructure::adapters::{FakeSpeechEngine, FakeSpeechEngineConfig};
use speechpad::infrastructure::http::{AppState, HttpServer, ServerConfig};

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},speechpad={},tower_http=debug", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);
    tracing::info!("Speechpad - text to speech playback and export");
    print_config(&config);

    let estimator = config.playback.estimator();

    // 进程内引擎：GET /api/tts 据此报告引擎是否可用
    let engine = FakeSpeechEngine::new(
        FakeSpeechEngineConfig::timed()
            .with_voices(vec![VoiceDescriptor::new("Speechpad Default", "en-US").as_default()]),
    );
    let engine_available = match engine.capability() {
        EngineCapability::Supported => {
            tracing::info!(voices = engine.voices().len(), "Speech engine available");
            true
        }
        EngineCapability::Unsupported { reason } => {
            tracing::warn!(reason = %reason, "Continuing without speech synthesis");
            false
        }
    };

    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(estimator, engine_available);
    let server = HttpServer::new(server_config, state);

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
