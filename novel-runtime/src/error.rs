//! # Error 模块
//!
//! 定义 novel-runtime 中使用的错误类型。
//!
//! 所有错误都在公共 API 边界以 `Result` 返回，不会 panic；
//! 运行时错误发生时，解释器状态保持调用前的样子。

use thiserror::Error;

/// 作品内容错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    /// 作品数据无法解析
    #[error("作品数据解析失败: {message}")]
    Malformed { message: String },
}

/// 运行时错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// 场景未找到
    #[error("场景 '{scene_id}' 未找到")]
    SceneNotFound { scene_id: String },

    /// 作品没有任何章节或场景
    #[error("作品为空：没有任何章节或场景")]
    EmptyNovel,

    /// 场景没有任何节点
    #[error("场景 '{scene_id}' 没有任何内容")]
    EmptyScene { scene_id: String },

    /// 入场跳转链形成循环
    #[error("入场跳转形成循环: {}", chain.join(" -> "))]
    CyclicEntryJump { chain: Vec<String> },

    /// 选项不存在
    #[error("选项 '{option_id}' 不存在")]
    ChoiceOptionNotFound { option_id: String },

    /// 状态不匹配
    #[error("当前状态不允许此操作：期望 {expected}，实际 {actual}")]
    StateMismatch { expected: String, actual: String },

    /// 存档指向的位置无效
    #[error("存档位置无效: 场景 '{scene_id}' 第 {node_index} 个节点")]
    InvalidSavePosition { scene_id: String, node_index: usize },
}

/// 存档错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveError {
    /// 序列化失败
    #[error("序列化失败: {0}")]
    Serialization(String),

    /// 存档内容损坏（JSON 无效或缺少字段）
    #[error("存档已损坏: {0}")]
    Malformed(String),

    /// 存储后端失败
    #[error("存储操作失败: {0}")]
    Storage(String),

    /// 存档键不能用作文件名
    #[error("非法的存档键: {0:?}")]
    InvalidKey(String),
}

/// 引用缺失的资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Character,
    Background,
    Audio,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Character => write!(f, "角色"),
            Self::Background => write!(f, "背景"),
            Self::Audio => write!(f, "音频"),
        }
    }
}

/// 播放警告
///
/// 引用无法解析时，对应的指令按空操作处理，播放继续。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("节点 '{node_id}' 引用的{kind} '{id}' 不存在")]
pub struct PlaybackWarning {
    pub kind: ReferenceKind,
    pub id: String,
    pub node_id: String,
}

impl PlaybackWarning {
    pub fn missing(kind: ReferenceKind, id: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            node_id: node_id.into(),
        }
    }
}

/// novel-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VnError {
    /// 内容错误
    #[error("内容错误: {0}")]
    Content(#[from] ContentError),

    /// 运行时错误
    #[error("运行时错误: {0}")]
    Runtime(#[from] RuntimeError),

    /// 存档错误
    #[error("存档错误: {0}")]
    Save(#[from] SaveError),
}

/// Result 类型别名
pub type VnResult<T> = Result<T, VnError>;
