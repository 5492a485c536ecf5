//! # Novel CLI
//!
//! 无界面的播放宿主：在终端里播放作品、存读档、检查作品内容。
//!
//! ## 模块结构
//!
//! - [`config`]：配置文件
//! - [`loader`]：作品加载
//! - [`save_store`]：文件存档存储
//! - [`audio`]：日志音频引擎
//! - [`player`]：播放会话
//! - [`input`]：输入解析
//! - [`render`]：文本渲染
//! - [`session`]：交互式播放循环

pub mod audio;
pub mod config;
pub mod input;
pub mod loader;
pub mod player;
pub mod render;
pub mod save_store;
pub mod session;

pub use audio::{AudioEvent, TracingAudioEngine};
pub use config::{AudioConfig, ConfigError, DebugConfig, PlayerConfig, TextConfig};
pub use input::{InputError, PlayerInput};
pub use loader::{LoadError, load_novel, parse_novel};
pub use player::{ClickOutcome, LoadOutcome, Player, PlayerError, PlayerOptions};
pub use render::{render_frame, render_history};
pub use save_store::FileSaveStore;
pub use session::{Flow, handle_input, run};
