//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "SPEECHPAD";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `SPEECHPAD_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `SPEECHPAD_SERVER__PORT=8080`
/// - `SPEECHPAD_PLAYBACK__BASE_WPM=170`
/// - `SPEECHPAD_EXPORT__OUTPUT_DIR=/tmp/exports`
/// - `SPEECHPAD_LOG__JSON=true`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5060)?
        .set_default("playback.base_wpm", 155.0)?
        .set_default("playback.tick_interval_ms", 100)?
        .set_default("playback.queue_capacity", 32)?
        .set_default("export.startup_delay_ms", 500)?
        .set_default("export.safety_margin_secs", 10)?
        .set_default("export.placeholder_sample_rate", 22050)?
        .set_default("export.min_placeholder_secs", 1.0)?
        .set_default("export.output_dir", "data/exports")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if !config.playback.base_wpm.is_finite() || config.playback.base_wpm <= 0.0 {
        return Err(ConfigError::ValidationError(
            "Base WPM must be a positive number".to_string(),
        ));
    }

    // tokio interval 不接受 0 周期
    if config.playback.tick_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Tick interval cannot be 0".to_string(),
        ));
    }

    if config.playback.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Command queue capacity cannot be 0".to_string(),
        ));
    }

    if config.export.placeholder_sample_rate == 0 {
        return Err(ConfigError::ValidationError(
            "Placeholder sample rate cannot be 0".to_string(),
        ));
    }

    if config.export.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Export output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Base WPM: {}", config.playback.base_wpm);
    tracing::info!("Tick Interval: {}ms", config.playback.tick_interval_ms);
    tracing::info!("Export Startup Delay: {}ms", config.export.startup_delay_ms);
    tracing::info!("Export Safety Margin: {}s", config.export.safety_margin_secs);
    tracing::info!("Export Directory: {:?}", config.export.output_dir);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
