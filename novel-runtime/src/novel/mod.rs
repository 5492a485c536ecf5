//! # Novel 模块
//!
//! 作品内容模型：角色、背景、音频资源、章节 → 场景 → 节点。
//!
//! 作品由外部加载器整体构造，运行时只读。
//!
//! ## 模块结构
//!
//! - [`node`]：场景节点定义

pub mod node;

pub use node::*;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// 角色立绘
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSprite {
    pub id: String,
    /// 表情标签（如 "neutral"、"happy"），不是枚举
    pub emotion: String,
    #[serde(default)]
    pub image_url: String,
}

/// 角色
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    /// 内部名称
    pub name: String,
    /// 显示名称，可独立于 id 修改
    pub display_name: String,
    /// 名字颜色，仅用于显示
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub sprites: Vec<CharacterSprite>,
}

impl Character {
    /// 按表情查找立绘
    ///
    /// 取第一个匹配的表情；找不到时回退到第一个 "neutral"，再回退到第一张立绘。
    pub fn sprite_for(&self, emotion: Option<&str>) -> Option<&CharacterSprite> {
        emotion
            .and_then(|e| self.sprites.iter().find(|s| s.emotion == e))
            .or_else(|| self.sprites.iter().find(|s| s.emotion == "neutral"))
            .or_else(|| self.sprites.first())
    }
}

/// 背景资源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
}

/// 音频类型
///
/// 音频指令的行为取决于资源本身的类型，而不只是节点上的动作。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioKind {
    /// 背景音乐（循环）
    Bgm,
    /// 音效（单次）
    Sfx,
}

/// 音频资源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAsset {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AudioKind,
    #[serde(default)]
    pub audio_url: String,
}

/// 场景
///
/// 节点顺序即叙事顺序。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    /// 获取指定索引的节点
    pub fn get_node(&self, index: usize) -> Option<&SceneNode> {
        self.nodes.get(index)
    }

    /// 节点数量
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 是否没有任何节点
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 最后一个节点的索引（空场景返回 0）
    pub fn last_index(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// 入场时会触发的跳转目标
    ///
    /// 即第一个交互节点之前出现的 `jump` 节点。
    pub fn entry_jump(&self) -> Option<&str> {
        self.nodes
            .iter()
            .take_while(|n| !n.is_interactive())
            .find_map(|n| match n {
                SceneNode::Jump(j) => Some(j.target_scene_id.as_str()),
                _ => None,
            })
    }
}

/// 章节
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

/// 作品（根聚合）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Novel {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,

    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub backgrounds: Vec<Background>,
    #[serde(default)]
    pub audio: Vec<AudioAsset>,

    #[serde(default)]
    pub chapters: Vec<Chapter>,

    /// 起始场景
    #[serde(default)]
    pub start_scene_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Novel {
    /// 从 JSON 解析作品
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        serde_json::from_str(json).map_err(|e| ContentError::Malformed {
            message: e.to_string(),
        })
    }

    /// 序列化为 JSON 字符串
    pub fn to_json(&self) -> Result<String, ContentError> {
        serde_json::to_string_pretty(self).map_err(|e| ContentError::Malformed {
            message: e.to_string(),
        })
    }

    /// 按章节顺序遍历所有场景
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.chapters.iter().flat_map(|c| c.scenes.iter())
    }

    /// 查找场景
    pub fn scene(&self, scene_id: &str) -> Option<&Scene> {
        self.scenes().find(|s| s.id == scene_id)
    }

    /// 第一章第一个场景
    pub fn first_scene_id(&self) -> Option<&str> {
        self.scenes().next().map(|s| s.id.as_str())
    }

    pub fn character(&self, character_id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == character_id)
    }

    pub fn background(&self, background_id: &str) -> Option<&Background> {
        self.backgrounds.iter().find(|b| b.id == background_id)
    }

    pub fn audio_asset(&self, audio_id: &str) -> Option<&AudioAsset> {
        self.audio.iter().find(|a| a.id == audio_id)
    }
}
