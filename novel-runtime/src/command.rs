//! # Command 模块
//!
//! Runtime 向 Host 发出的音频指令。
//!
//! 画面相关的状态（背景、角色）直接体现在演出状态里，Host 每一步重新渲染即可；
//! 音频是唯一有外部副作用的指令，需要 Host 交给音频系统执行。
//!
//! ## 设计原则
//!
//! - **声明式**：Command 描述"做什么"，不描述"怎么做"
//! - **无副作用**：Command 本身不执行任何操作

use serde::{Deserialize, Serialize};

/// Runtime 向 Host 发出的指令
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// 播放/切换背景音乐（循环）
    PlayBgm { audio_id: String },

    /// 立即停止背景音乐
    StopBgm,

    /// 淡出后停止背景音乐
    ///
    /// 不阻塞解释器，淡出完成的清理由音频控制器负责。
    FadeOutBgm { audio_id: String },

    /// 播放音效（单次，不影响状态）
    PlaySfx { audio_id: String },
}
