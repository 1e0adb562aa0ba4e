//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::{ExportConfig as ExportServiceConfig, PlaybackWorkerConfig};
use crate::domain::export::WavFormat;
use crate::domain::speech::{DurationEstimator, BASE_WPM};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 播放配置
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// 导出配置
    #[serde(default)]
    pub export: ExportConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5060
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 播放配置
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    /// 语速 1.0 时的每分钟词数
    #[serde(default = "default_base_wpm")]
    pub base_wpm: f64,

    /// 进度刷新间隔（毫秒）
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// 命令队列长度
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_base_wpm() -> f64 {
    BASE_WPM
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_queue_capacity() -> usize {
    32
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            base_wpm: default_base_wpm(),
            tick_interval_ms: default_tick_interval_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl PlaybackConfig {
    pub fn estimator(&self) -> DurationEstimator {
        DurationEstimator::new(self.base_wpm)
    }

    /// 转换为播放 worker 配置
    pub fn worker_config(&self) -> PlaybackWorkerConfig {
        PlaybackWorkerConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            queue_capacity: self.queue_capacity,
            estimator: self.estimator(),
        }
    }
}

/// 导出配置
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// 录制开始到朗读开始的等待（毫秒）
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,

    /// 录制超时 = 估算时长 + 安全余量（秒）
    #[serde(default = "default_safety_margin_secs")]
    pub safety_margin_secs: u64,

    /// 静音占位 WAV 采样率
    #[serde(default = "default_placeholder_sample_rate")]
    pub placeholder_sample_rate: u32,

    /// 静音占位 WAV 最短时长（秒）
    #[serde(default = "default_min_placeholder_secs")]
    pub min_placeholder_secs: f64,

    /// 导出文件保存目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_startup_delay_ms() -> u64 {
    500
}

fn default_safety_margin_secs() -> u64 {
    10
}

fn default_placeholder_sample_rate() -> u32 {
    22050
}

fn default_min_placeholder_secs() -> f64 {
    1.0
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/exports")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            startup_delay_ms: default_startup_delay_ms(),
            safety_margin_secs: default_safety_margin_secs(),
            placeholder_sample_rate: default_placeholder_sample_rate(),
            min_placeholder_secs: default_min_placeholder_secs(),
            output_dir: default_output_dir(),
        }
    }
}

impl ExportConfig {
    /// 转换为导出服务配置，时长估算与播放共用同一 WPM
    pub fn service_config(&self, estimator: DurationEstimator) -> ExportServiceConfig {
        ExportServiceConfig {
            startup_delay: Duration::from_millis(self.startup_delay_ms),
            safety_margin: Duration::from_secs(self.safety_margin_secs),
            placeholder_format: WavFormat::mono(self.placeholder_sample_rate),
            min_placeholder_secs: self.min_placeholder_secs,
            estimator,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
