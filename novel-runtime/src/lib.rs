//! # Novel Runtime
//!
//! 分支叙事（视觉小说）播放引擎的核心运行时库。
//!
//! ## 架构概述
//!
//! `novel-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! Host 调用解释器，解释器返回新的等待状态和需要执行的音频指令：
//!
//! ```text
//! Host                                 Runtime
//!   │                                     │
//!   │──── advance / choose / jump ──────►│
//!   │                                     │ 入场预读 / 跳过导演节点
//!   │◄─── Step { commands, waiting } ────│
//!   │                                     │
//!   │──── snapshot() ───────────────────►│
//!   │◄─── 当前交互节点 + 演出状态 ────────│
//! ```
//!
//! ## 核心类型
//!
//! - [`Novel`]：作品内容模型
//! - [`NovelRuntime`]：播放解释器
//! - [`PresentationState`]：演出状态（背景、角色、BGM）
//! - [`Command`]：Runtime 向 Host 发出的音频指令
//! - [`SaveData`]：存档数据
//!
//! ## 使用示例
//!
//! ```ignore
//! use novel_runtime::{Novel, NovelRuntime, WaitingReason};
//!
//! let novel = Novel::from_json(&json)?;
//! let (mut runtime, step) = NovelRuntime::start(novel)?;
//! audio.execute_all(&step.commands);
//!
//! loop {
//!     let snapshot = runtime.snapshot();
//!     render(&snapshot);
//!
//!     let step = match snapshot.waiting {
//!         WaitingReason::WaitForClick => {
//!             wait_for_click();
//!             runtime.advance()?
//!         }
//!         WaitingReason::WaitForChoice { .. } => runtime.choose(&wait_for_choice())?,
//!         WaitingReason::Ended => break,
//!     };
//!     audio.execute_all(&step.commands);
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`novel`]：内容模型（作品、场景、节点）
//! - [`state`]：游标、演出状态和等待状态
//! - [`command`]：音频指令定义
//! - [`runtime`]：解释器与导演节点归约
//! - [`save`]：存档数据与存储端口
//! - [`audio`]：音频指令执行与淡出计时
//! - [`typewriter`]：文本逐字显示
//! - [`history`]：历史记录
//! - [`diagnostic`]：作品静态检查
//! - [`assets`]：资源地址解析
//! - [`error`]：错误类型定义

pub mod assets;
pub mod audio;
pub mod command;
pub mod diagnostic;
pub mod error;
pub mod history;
pub mod novel;
pub mod runtime;
pub mod save;
pub mod state;
pub mod typewriter;

// 重导出核心类型
pub use assets::AssetResolver;
pub use audio::{AudioController, AudioEngine};
pub use command::Command;
pub use diagnostic::{Diagnostic, DiagnosticLevel, DiagnosticResult, analyze_novel};
pub use error::{
    ContentError, PlaybackWarning, ReferenceKind, RuntimeError, SaveError, VnError, VnResult,
};
pub use history::{History, HistoryEvent};
pub use novel::{
    AudioAction, AudioAsset, AudioKind, Background, BackgroundNode, BackgroundTransition, Chapter,
    Character, CharacterAction, CharacterNode, CharacterSprite, ChoiceNode, ChoiceOption,
    DialogueNode, JumpNode, NarrationNode, Novel, Position, Scene, SceneNode,
};
pub use runtime::{Director, DirectorOutput, NovelRuntime, Snapshot, Step};
pub use save::{MemorySaveStore, SAVE_KEY_PREFIX, SaveData, SaveSlots, SaveStore};
pub use state::{OnScreenCharacter, PlaybackCursor, PresentationState, WaitingReason};
pub use typewriter::{DEFAULT_CHARS_PER_SECOND, TextReveal};
