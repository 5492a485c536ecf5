//! # Node 模块
//!
//! 场景节点定义。节点种类是封闭的七种，所有处理节点的地方都做穷尽匹配。

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 角色立绘位置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// 左侧
    Left,
    /// 中央
    #[default]
    Center,
    /// 右侧
    Right,
}

impl Position {
    /// 自动入场时尝试的位置顺序
    pub const AUTO_PLACEMENT_ORDER: [Position; 3] = [Self::Center, Self::Left, Self::Right];

    /// 从字符串解析位置（便捷方法）
    pub fn parse(s: &str) -> Option<Self> {
        Self::from_str(s).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl FromStr for Position {
    type Err = ();

    /// 从字符串解析位置（不区分大小写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" | "middle" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(()),
        }
    }
}

/// 背景切换效果（仅用于显示）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundTransition {
    Fade,
    Instant,
    Dissolve,
}

/// 角色指令动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterAction {
    Enter,
    Exit,
    Move,
}

/// 音频指令动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioAction {
    Play,
    Stop,
    FadeOut,
}

/// 对话
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueNode {
    pub id: String,
    pub character_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    pub text: String,
}

/// 旁白
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationNode {
    pub id: String,
    pub text: String,
}

/// 选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub id: String,
    pub text: String,
    pub target_scene_id: String,
    /// 预留字段，当前不参与求值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// 选择分支
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
}

impl ChoiceNode {
    pub fn option(&self, option_id: &str) -> Option<&ChoiceOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

/// 背景切换
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundNode {
    pub id: String,
    pub background_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<BackgroundTransition>,
}

/// 角色入场/退场/移动
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterNode {
    pub id: String,
    pub character_id: String,
    pub action: CharacterAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
}

/// 音频控制
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioNode {
    pub id: String,
    pub audio_id: String,
    pub action: AudioAction,
}

/// 跳转到其他场景
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JumpNode {
    pub id: String,
    pub target_scene_id: String,
}

/// 场景节点
///
/// JSON 中以 `type` 字段区分种类：
///
/// ```text
/// { "type": "dialogue", "id": "n1", "characterId": "alice", "text": "..." }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SceneNode {
    Dialogue(DialogueNode),
    Narration(NarrationNode),
    Choice(ChoiceNode),
    Background(BackgroundNode),
    Character(CharacterNode),
    Audio(AudioNode),
    Jump(JumpNode),
}

impl SceneNode {
    pub fn id(&self) -> &str {
        match self {
            Self::Dialogue(n) => &n.id,
            Self::Narration(n) => &n.id,
            Self::Choice(n) => &n.id,
            Self::Background(n) => &n.id,
            Self::Character(n) => &n.id,
            Self::Audio(n) => &n.id,
            Self::Jump(n) => &n.id,
        }
    }

    /// 节点种类名（与 JSON 中的 `type` 一致）
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Dialogue(_) => "dialogue",
            Self::Narration(_) => "narration",
            Self::Choice(_) => "choice",
            Self::Background(_) => "background",
            Self::Character(_) => "character",
            Self::Audio(_) => "audio",
            Self::Jump(_) => "jump",
        }
    }

    /// 是否为交互节点（对话、旁白、选择）
    ///
    /// 交互节点会停止自动推进，等待 Host 输入。
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Dialogue(_) | Self::Narration(_) | Self::Choice(_))
    }

    /// 是否为导演节点（背景、角色、音频、跳转）
    pub fn is_director(&self) -> bool {
        !self.is_interactive()
    }

    /// 需要逐字显示的文本
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Dialogue(n) => Some(&n.text),
            Self::Narration(n) => Some(&n.text),
            Self::Choice(n) => n.prompt.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parse() {
        assert_eq!(Position::parse("LEFT"), Some(Position::Left));
        assert_eq!(Position::parse("middle"), Some(Position::Center));
        assert_eq!(Position::parse("nearleft"), None);
        assert_eq!(Position::default(), Position::Center);
    }

    #[test]
    fn test_node_json_shape() {
        let json = r#"[
            { "id": "n1", "type": "audio", "audioId": "bgm-1", "action": "fade-out" },
            { "id": "n2", "type": "character", "characterId": "alice", "action": "enter" },
            { "id": "n3", "type": "choice", "options": [
                { "id": "o1", "text": "好", "targetSceneId": "s2", "condition": "unused" }
            ] }
        ]"#;
        let nodes: Vec<SceneNode> = serde_json::from_str(json).unwrap();

        assert!(matches!(
            &nodes[0],
            SceneNode::Audio(AudioNode { action: AudioAction::FadeOut, .. })
        ));
        assert!(matches!(
            &nodes[1],
            SceneNode::Character(CharacterNode { position: None, .. })
        ));
        let SceneNode::Choice(choice) = &nodes[2] else {
            panic!("expected choice");
        };
        assert_eq!(choice.option("o1").unwrap().target_scene_id, "s2");
        assert!(choice.option("o2").is_none());
    }

    #[test]
    fn test_interactive_kinds() {
        let narration = SceneNode::Narration(NarrationNode {
            id: "n".to_string(),
            text: "夜深了".to_string(),
        });
        let jump = SceneNode::Jump(JumpNode {
            id: "j".to_string(),
            target_scene_id: "s".to_string(),
        });

        assert!(narration.is_interactive());
        assert_eq!(narration.text(), Some("夜深了"));
        assert!(jump.is_director());
        assert_eq!(jump.kind_name(), "jump");
        assert_eq!(jump.text(), None);
    }
}
