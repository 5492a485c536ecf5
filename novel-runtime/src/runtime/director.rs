//! # Director 模块
//!
//! 演出状态归约：把导演节点（角色、背景、音频）应用到演出状态上。
//!
//! ## 职责
//!
//! - 读取导演节点
//! - 更新 [`PresentationState`]（角色、背景）和当前 BGM
//! - 产生音频 [`Command`]（唯一有外部副作用的指令）
//!
//! BGM 与演出状态分开传入：切换场景只清空演出状态，音乐继续播放。
//!
//! 引用无法解析时不修改状态，只产生 [`PlaybackWarning`]。

use crate::command::Command;
use crate::error::{PlaybackWarning, ReferenceKind};
use crate::novel::{
    AudioAction, AudioKind, AudioNode, BackgroundNode, CharacterAction, CharacterNode,
    DialogueNode, Novel, SceneNode,
};
use crate::state::{OnScreenCharacter, PresentationState};

/// 归约结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectorOutput {
    /// 产生的音频指令
    pub commands: Vec<Command>,
    /// 无法解析的引用
    pub warnings: Vec<PlaybackWarning>,
}

impl DirectorOutput {
    /// 创建空结果
    fn empty() -> Self {
        Self::default()
    }

    /// 创建带命令的结果
    fn with_command(command: Command) -> Self {
        Self {
            commands: vec![command],
            warnings: Vec::new(),
        }
    }

    /// 创建带警告的结果
    fn with_warning(warning: PlaybackWarning) -> Self {
        Self {
            commands: Vec::new(),
            warnings: vec![warning],
        }
    }

    /// 合并到另一个结果
    pub fn append_to(self, other: &mut DirectorOutput) {
        other.commands.extend(self.commands);
        other.warnings.extend(self.warnings);
    }
}

/// 导演节点归约器
pub struct Director<'a> {
    novel: &'a Novel,
}

impl<'a> Director<'a> {
    pub fn new(novel: &'a Novel) -> Self {
        Self { novel }
    }

    /// 应用单个导演节点
    ///
    /// `bgm` 为当前播放的 BGM id。
    /// 交互节点与跳转节点不在这里处理，原样返回空结果。
    pub fn apply(
        &self,
        state: &mut PresentationState,
        bgm: &mut Option<String>,
        node: &SceneNode,
    ) -> DirectorOutput {
        match node {
            SceneNode::Character(n) => self.apply_character(state, n),
            SceneNode::Background(n) => self.apply_background(state, n),
            SceneNode::Audio(n) => self.apply_audio(bgm, n),
            SceneNode::Dialogue(_)
            | SceneNode::Narration(_)
            | SceneNode::Choice(_)
            | SceneNode::Jump(_) => DirectorOutput::empty(),
        }
    }

    /// 说话角色不在场时，自动入场
    ///
    /// 位置依次尝试中、左、右，取第一个空位。
    pub fn enter_speaker(
        &self,
        state: &mut PresentationState,
        dialogue: &DialogueNode,
    ) -> DirectorOutput {
        if state.is_on_screen(&dialogue.character_id) {
            return DirectorOutput::empty();
        }
        if self.novel.character(&dialogue.character_id).is_none() {
            return DirectorOutput::with_warning(PlaybackWarning::missing(
                ReferenceKind::Character,
                &dialogue.character_id,
                &dialogue.id,
            ));
        }

        let position = state.free_position();
        state.on_screen_characters.push(OnScreenCharacter {
            character_id: dialogue.character_id.clone(),
            position,
            emotion: dialogue.emotion.clone(),
        });
        DirectorOutput::empty()
    }

    fn apply_character(&self, state: &mut PresentationState, node: &CharacterNode) -> DirectorOutput {
        if self.novel.character(&node.character_id).is_none() {
            return DirectorOutput::with_warning(PlaybackWarning::missing(
                ReferenceKind::Character,
                &node.character_id,
                &node.id,
            ));
        }

        match node.action {
            CharacterAction::Enter => {
                let position = node.position.unwrap_or_default();
                match state.character_mut(&node.character_id) {
                    // 已在场：原地更新，不重复、不改变顺序
                    Some(existing) => {
                        existing.position = position;
                        existing.emotion = node.emotion.clone();
                    }
                    None => state.on_screen_characters.push(OnScreenCharacter {
                        character_id: node.character_id.clone(),
                        position,
                        emotion: node.emotion.clone(),
                    }),
                }
            }
            CharacterAction::Exit => {
                state
                    .on_screen_characters
                    .retain(|c| c.character_id != node.character_id);
            }
            CharacterAction::Move => {
                // 不在场时 move 不会隐式入场
                if let Some(existing) = state.character_mut(&node.character_id) {
                    existing.position = node.position.unwrap_or_default();
                    if let Some(emotion) = &node.emotion {
                        existing.emotion = Some(emotion.clone());
                    }
                }
            }
        }
        DirectorOutput::empty()
    }

    fn apply_background(
        &self,
        state: &mut PresentationState,
        node: &BackgroundNode,
    ) -> DirectorOutput {
        if self.novel.background(&node.background_id).is_none() {
            return DirectorOutput::with_warning(PlaybackWarning::missing(
                ReferenceKind::Background,
                &node.background_id,
                &node.id,
            ));
        }
        state.current_background_id = Some(node.background_id.clone());
        DirectorOutput::empty()
    }

    fn apply_audio(&self, bgm: &mut Option<String>, node: &AudioNode) -> DirectorOutput {
        let Some(asset) = self.novel.audio_asset(&node.audio_id) else {
            return DirectorOutput::with_warning(PlaybackWarning::missing(
                ReferenceKind::Audio,
                &node.audio_id,
                &node.id,
            ));
        };

        match (asset.kind, node.action) {
            (AudioKind::Bgm, AudioAction::Play) => {
                // 同一首已在播放时不重新开始
                if bgm.as_deref() == Some(asset.id.as_str()) {
                    return DirectorOutput::empty();
                }
                *bgm = Some(asset.id.clone());
                DirectorOutput::with_command(Command::PlayBgm {
                    audio_id: asset.id.clone(),
                })
            }
            (AudioKind::Bgm, AudioAction::Stop) => match bgm.take() {
                Some(_) => DirectorOutput::with_command(Command::StopBgm),
                None => DirectorOutput::empty(),
            },
            (AudioKind::Bgm, AudioAction::FadeOut) => match bgm.take() {
                Some(playing) => {
                    DirectorOutput::with_command(Command::FadeOutBgm { audio_id: playing })
                }
                None => DirectorOutput::empty(),
            },
            (AudioKind::Sfx, AudioAction::Play) => DirectorOutput::with_command(Command::PlaySfx {
                audio_id: asset.id.clone(),
            }),
            // 音效只响应 play
            (AudioKind::Sfx, AudioAction::Stop | AudioAction::FadeOut) => DirectorOutput::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::novel::{AudioAsset, Background, Character, Position};

    fn test_novel() -> Novel {
        let character = |id: &str| Character {
            id: id.to_string(),
            name: id.to_string(),
            display_name: id.to_uppercase(),
            color: String::new(),
            sprites: Vec::new(),
        };
        Novel {
            id: "novel".to_string(),
            title: "测试".to_string(),
            author: String::new(),
            description: String::new(),
            cover_image_url: None,
            characters: vec![character("alice"), character("bob"), character("carol"), character("dave")],
            backgrounds: vec![Background {
                id: "bg-1".to_string(),
                name: "房间".to_string(),
                image_url: String::new(),
            }],
            audio: vec![
                AudioAsset {
                    id: "bgm-1".to_string(),
                    name: "主题".to_string(),
                    kind: AudioKind::Bgm,
                    audio_url: String::new(),
                },
                AudioAsset {
                    id: "sfx-knock".to_string(),
                    name: "敲门".to_string(),
                    kind: AudioKind::Sfx,
                    audio_url: String::new(),
                },
            ],
            chapters: Vec::new(),
            start_scene_id: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    fn character_node(
        character_id: &str,
        action: CharacterAction,
        position: Option<Position>,
        emotion: Option<&str>,
    ) -> SceneNode {
        SceneNode::Character(CharacterNode {
            id: format!("{character_id}-{action:?}"),
            character_id: character_id.to_string(),
            action,
            position,
            emotion: emotion.map(str::to_string),
        })
    }

    fn audio_node(audio_id: &str, action: AudioAction) -> SceneNode {
        SceneNode::Audio(AudioNode {
            id: "audio".to_string(),
            audio_id: audio_id.to_string(),
            action,
        })
    }

    #[test]
    fn test_enter_defaults_to_center() {
        let novel = test_novel();
        let director = Director::new(&novel);
        let mut state = PresentationState::new();
        let mut bgm = None;

        director.apply(&mut state, &mut bgm, &character_node("alice", CharacterAction::Enter, None, None));

        let alice = state.character("alice").unwrap();
        assert_eq!(alice.position, Position::Center);
        assert_eq!(alice.emotion, None);
    }

    #[test]
    fn test_repeated_enter_updates_in_place() {
        let novel = test_novel();
        let director = Director::new(&novel);
        let mut state = PresentationState::new();
        let mut bgm = None;

        director.apply(
            &mut state,
            &mut bgm,
            &character_node("alice", CharacterAction::Enter, Some(Position::Left), None),
        );
        director.apply(
            &mut state,
            &mut bgm,
            &character_node("bob", CharacterAction::Enter, Some(Position::Right), None),
        );
        director.apply(
            &mut state,
            &mut bgm,
            &character_node("alice", CharacterAction::Enter, Some(Position::Center), Some("happy")),
        );

        assert_eq!(state.on_screen_characters.len(), 2);
        // 顺序不变
        assert_eq!(state.on_screen_characters[0].character_id, "alice");
        assert_eq!(state.on_screen_characters[0].position, Position::Center);
        assert_eq!(state.on_screen_characters[0].emotion.as_deref(), Some("happy"));
    }

    #[test]
    fn test_exit_removes_and_ignores_absent() {
        let novel = test_novel();
        let director = Director::new(&novel);
        let mut state = PresentationState::new();
        let mut bgm = None;

        director.apply(&mut state, &mut bgm, &character_node("alice", CharacterAction::Enter, None, None));
        director.apply(&mut state, &mut bgm, &character_node("bob", CharacterAction::Exit, None, None));
        assert_eq!(state.on_screen_characters.len(), 1);

        director.apply(&mut state, &mut bgm, &character_node("alice", CharacterAction::Exit, None, None));
        assert!(state.on_screen_characters.is_empty());
    }

    #[test]
    fn test_move_keeps_emotion_unless_given() {
        let novel = test_novel();
        let director = Director::new(&novel);
        let mut state = PresentationState::new();
        let mut bgm = None;

        director.apply(
            &mut state,
            &mut bgm,
            &character_node("alice", CharacterAction::Enter, Some(Position::Left), Some("sad")),
        );
        director.apply(
            &mut state,
            &mut bgm,
            &character_node("alice", CharacterAction::Move, Some(Position::Right), None),
        );
        let alice = state.character("alice").unwrap();
        assert_eq!(alice.position, Position::Right);
        assert_eq!(alice.emotion.as_deref(), Some("sad"));

        director.apply(
            &mut state,
            &mut bgm,
            &character_node("alice", CharacterAction::Move, Some(Position::Center), Some("happy")),
        );
        assert_eq!(state.character("alice").unwrap().emotion.as_deref(), Some("happy"));
    }

    #[test]
    fn test_move_absent_is_noop() {
        let novel = test_novel();
        let director = Director::new(&novel);
        let mut state = PresentationState::new();
        let mut bgm = None;

        let output = director.apply(
            &mut state,
            &mut bgm,
            &character_node("bob", CharacterAction::Move, Some(Position::Left), None),
        );
        assert_eq!(state, PresentationState::new());
        assert_eq!(output, DirectorOutput::default());
    }

    #[test]
    fn test_unknown_character_warns() {
        let novel = test_novel();
        let director = Director::new(&novel);
        let mut state = PresentationState::new();
        let mut bgm = None;

        let output = director.apply(
            &mut state,
            &mut bgm,
            &character_node("ghost", CharacterAction::Enter, None, None),
        );
        assert!(state.on_screen_characters.is_empty());
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].kind, ReferenceKind::Character);
    }

    #[test]
    fn test_background_overwrites() {
        let novel = test_novel();
        let director = Director::new(&novel);
        let mut state = PresentationState::new();
        let mut bgm = None;

        let node = SceneNode::Background(BackgroundNode {
            id: "b".to_string(),
            background_id: "bg-1".to_string(),
            transition: None,
        });
        director.apply(&mut state, &mut bgm, &node);
        assert_eq!(state.current_background_id.as_deref(), Some("bg-1"));

        let missing = SceneNode::Background(BackgroundNode {
            id: "b2".to_string(),
            background_id: "bg-404".to_string(),
            transition: None,
        });
        let output = director.apply(&mut state, &mut bgm, &missing);
        assert_eq!(state.current_background_id.as_deref(), Some("bg-1"));
        assert_eq!(output.warnings[0].kind, ReferenceKind::Background);
    }

    #[test]
    fn test_bgm_play_is_idempotent() {
        let novel = test_novel();
        let director = Director::new(&novel);
        let mut state = PresentationState::new();
        let mut bgm = None;

        let first = director.apply(&mut state, &mut bgm, &audio_node("bgm-1", AudioAction::Play));
        let second = director.apply(&mut state, &mut bgm, &audio_node("bgm-1", AudioAction::Play));

        assert_eq!(
            first.commands,
            vec![Command::PlayBgm {
                audio_id: "bgm-1".to_string()
            }]
        );
        assert!(second.commands.is_empty());
        assert_eq!(bgm.as_deref(), Some("bgm-1"));
    }

    #[test]
    fn test_bgm_stop_and_fade() {
        let novel = test_novel();
        let director = Director::new(&novel);
        let mut state = PresentationState::new();
        let mut bgm = None;

        director.apply(&mut state, &mut bgm, &audio_node("bgm-1", AudioAction::Play));
        let output = director.apply(&mut state, &mut bgm, &audio_node("bgm-1", AudioAction::FadeOut));
        assert_eq!(
            output.commands,
            vec![Command::FadeOutBgm {
                audio_id: "bgm-1".to_string()
            }]
        );
        assert!(bgm.is_none());

        // 没有音乐时 stop 不产生指令
        let output = director.apply(&mut state, &mut bgm, &audio_node("bgm-1", AudioAction::Stop));
        assert!(output.commands.is_empty());

        director.apply(&mut state, &mut bgm, &audio_node("bgm-1", AudioAction::Play));
        let output = director.apply(&mut state, &mut bgm, &audio_node("bgm-1", AudioAction::Stop));
        assert_eq!(output.commands, vec![Command::StopBgm]);
    }

    #[test]
    fn test_sfx_only_plays() {
        let novel = test_novel();
        let director = Director::new(&novel);
        let mut state = PresentationState::new();
        let mut bgm = None;

        let output = director.apply(&mut state, &mut bgm, &audio_node("sfx-knock", AudioAction::Play));
        assert_eq!(
            output.commands,
            vec![Command::PlaySfx {
                audio_id: "sfx-knock".to_string()
            }]
        );
        assert!(bgm.is_none());

        let output = director.apply(&mut state, &mut bgm, &audio_node("sfx-knock", AudioAction::Stop));
        assert!(output.commands.is_empty());
        let output = director.apply(&mut state, &mut bgm, &audio_node("sfx-knock", AudioAction::FadeOut));
        assert!(output.commands.is_empty());
    }

    #[test]
    fn test_unknown_audio_is_noop() {
        let novel = test_novel();
        let director = Director::new(&novel);
        let mut state = PresentationState::new();
        let mut bgm = None;

        let output = director.apply(&mut state, &mut bgm, &audio_node("nope", AudioAction::Play));
        assert!(output.commands.is_empty());
        assert_eq!(output.warnings[0].kind, ReferenceKind::Audio);
        assert!(state.is_empty());
    }

    #[test]
    fn test_enter_speaker_picks_free_position() {
        let novel = test_novel();
        let director = Director::new(&novel);
        let mut state = PresentationState::new();

        for id in ["alice", "bob", "carol", "dave"] {
            director.enter_speaker(
                &mut state,
                &DialogueNode {
                    id: format!("d-{id}"),
                    character_id: id.to_string(),
                    emotion: None,
                    text: "……".to_string(),
                },
            );
        }

        let positions: Vec<Position> = state
            .on_screen_characters
            .iter()
            .map(|c| c.position)
            .collect();
        assert_eq!(
            positions,
            vec![Position::Center, Position::Left, Position::Right, Position::Center]
        );
    }
}
