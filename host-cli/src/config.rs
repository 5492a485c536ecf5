//! # Config 模块
//!
//! 播放器配置管理，集中管理所有配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use novel_runtime::DEFAULT_CHARS_PER_SECOND;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// 播放器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// 存档目录
    #[serde(default = "default_saves_dir")]
    pub saves_dir: PathBuf,

    /// 文本显示配置
    #[serde(default)]
    pub text: TextConfig,

    /// 音频配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 调试配置
    #[serde(default)]
    pub debug: DebugConfig,
}

/// 文本显示配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    /// 逐字显示速度（字/秒）
    #[serde(default = "default_chars_per_second")]
    pub chars_per_second: f32,

    /// 是否逐字显示；关闭时文本立即完整显示
    #[serde(default = "default_animate")]
    pub animate: bool,
}

/// 音频配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// BGM 淡出时长（毫秒）
    #[serde(default = "default_fade_out_ms")]
    pub fade_out_ms: u64,
}

/// 调试配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// 启动时是否检查作品内容
    ///
    /// - debug build 默认开启，release build 默认关闭
    /// - 检查结果只输出诊断，不阻塞启动
    #[serde(default = "default_novel_check")]
    pub novel_check: bool,

    /// 日志级别（`RUST_LOG` 优先）
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// 默认值函数
fn default_saves_dir() -> PathBuf {
    PathBuf::from("saves")
}

fn default_chars_per_second() -> f32 {
    DEFAULT_CHARS_PER_SECOND
}

fn default_animate() -> bool {
    true
}

fn default_fade_out_ms() -> u64 {
    1500
}

fn default_novel_check() -> bool {
    cfg!(debug_assertions)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            saves_dir: default_saves_dir(),
            text: TextConfig::default(),
            audio: AudioConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            chars_per_second: default_chars_per_second(),
            animate: default_animate(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            fade_out_ms: default_fade_out_ms(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            novel_check: default_novel_check(),
            log_level: default_log_level(),
        }
    }
}

impl PlayerConfig {
    /// 读取配置文件
    ///
    /// 文件不存在返回 `Ok(None)`。不输出日志，可在日志初始化之前调用。
    pub fn read(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = serde_json::from_str(&content)
            .map_err(|e| ConfigError::Deserialization(e.to_string()))?;
        Ok(Some(config))
    }

    /// 加载配置文件
    ///
    /// 如果文件不存在、解析失败或验证失败，返回默认配置并输出警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(Some(config)) => match config.validate() {
                Ok(()) => {
                    info!(path = ?path, "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(path = ?path, error = %e, "配置无效，使用默认配置");
                    Self::default()
                }
            },
            Ok(None) => {
                warn!(path = ?path, "配置文件不存在，使用默认配置");
                Self::default()
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialization(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::Io(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let speed = self.text.chars_per_second;
        if speed.is_nan() || speed <= 0.0 {
            return Err(ConfigError::Validation("文字速度必须大于 0".to_string()));
        }

        if self.audio.fade_out_ms == 0 {
            return Err(ConfigError::Validation("淡出时长必须大于 0".to_string()));
        }

        if self.saves_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("存档目录不能为空".to_string()));
        }

        Ok(())
    }

    /// 淡出时长
    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.audio.fade_out_ms)
    }
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    Serialization(String),

    /// 解析失败
    #[error("配置解析失败: {0}")]
    Deserialization(String),

    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(String),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    Validation(String),
}
