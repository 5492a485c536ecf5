//! # State 模块
//!
//! 定义播放游标、演出状态和等待模型。
//!
//! ## 设计原则
//!
//! - 演出状态是**派生状态**，不保存在作品中
//! - 所有状态必须**可序列化**（支持存档/读档）
//! - 不允许隐式全局状态

use serde::{Deserialize, Serialize};

use crate::novel::Position;

/// 等待原因
///
/// Host 根据此状态决定可以接受哪种输入。
///
/// ```text
/// WaitForClick  -> 当前是对话/旁白，advance() 继续
/// WaitForChoice -> 当前是选择，choose() 继续
/// Ended         -> 场景没有后续的交互节点
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitingReason {
    /// 等待用户点击
    WaitForClick,

    /// 等待用户选择
    ///
    /// `choice_count` 记录选项数量，用于验证输入合法性
    WaitForChoice { choice_count: usize },

    /// 没有可继续的内容
    Ended,
}

impl WaitingReason {
    /// 是否在等待选择
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::WaitForChoice { .. })
    }

    /// 创建等待选择状态
    pub fn choice(count: usize) -> Self {
        Self::WaitForChoice {
            choice_count: count,
        }
    }
}

/// 播放游标
///
/// `node_index` 总是指向一个交互节点，或者场景的最后一个节点（没有后续交互节点时）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackCursor {
    /// 当前场景
    pub scene_id: String,
    /// 当前节点索引
    pub node_index: usize,
}

impl PlaybackCursor {
    /// 创建新的游标
    pub fn new(scene_id: impl Into<String>, node_index: usize) -> Self {
        Self {
            scene_id: scene_id.into(),
            node_index,
        }
    }

    /// 场景开头
    pub fn start(scene_id: impl Into<String>) -> Self {
        Self::new(scene_id, 0)
    }
}

/// 在场角色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnScreenCharacter {
    pub character_id: String,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
}

/// 演出状态
///
/// 当前画面上的内容：背景、在场角色（有序，每个角色至多一条）。
/// 进入新场景时整体清空。BGM 不属于演出状态，由 Runtime 单独持有。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationState {
    pub on_screen_characters: Vec<OnScreenCharacter>,
    pub current_background_id: Option<String>,
}

impl PresentationState {
    /// 创建空状态
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否完全为空
    pub fn is_empty(&self) -> bool {
        self.on_screen_characters.is_empty() && self.current_background_id.is_none()
    }

    /// 查找在场角色
    pub fn character(&self, character_id: &str) -> Option<&OnScreenCharacter> {
        self.on_screen_characters
            .iter()
            .find(|c| c.character_id == character_id)
    }

    pub(crate) fn character_mut(&mut self, character_id: &str) -> Option<&mut OnScreenCharacter> {
        self.on_screen_characters
            .iter_mut()
            .find(|c| c.character_id == character_id)
    }

    /// 角色是否在场
    pub fn is_on_screen(&self, character_id: &str) -> bool {
        self.character(character_id).is_some()
    }

    /// 位置是否已被占用
    pub fn is_occupied(&self, position: Position) -> bool {
        self.on_screen_characters
            .iter()
            .any(|c| c.position == position)
    }

    /// 自动入场位置
    ///
    /// 依次尝试中、左、右，全部占用时回退到中央（允许重叠）。
    pub fn free_position(&self) -> Position {
        Position::AUTO_PLACEMENT_ORDER
            .into_iter()
            .find(|p| !self.is_occupied(*p))
            .unwrap_or(Position::Center)
    }
}
