//! 文本渲染
//!
//! 把当前快照渲染成终端文本。

use novel_runtime::{
    AssetResolver, AudioEngine, History, HistoryEvent, Novel, Position, SaveStore, SceneNode,
};

use crate::player::Player;

/// 没有背景图时显示的占位
const DEFAULT_BACKGROUND: &str = "默认画面";

fn position_label(position: Position) -> &'static str {
    match position {
        Position::Left => "左",
        Position::Center => "中",
        Position::Right => "右",
    }
}

fn speaker_name<'a>(novel: &'a Novel, character_id: &'a str) -> &'a str {
    novel
        .character(character_id)
        .map_or(character_id, |c| c.display_name.as_str())
}

/// 渲染当前画面
pub fn render_frame<E: AudioEngine, S: SaveStore>(player: &Player<E, S>) -> String {
    let runtime = player.runtime();
    let novel = runtime.novel();
    let snapshot = runtime.snapshot();
    let state = snapshot.presentation;
    let mut lines = Vec::new();

    let scene_name = novel
        .scene(snapshot.scene_id)
        .map_or(snapshot.scene_id, |s| s.name.as_str());
    lines.push(format!("── {} ──", scene_name));

    let background = match state.current_background_id.as_deref() {
        None => "（无）".to_string(),
        Some(id) => match (novel.background(id), novel.background_url(id)) {
            (Some(bg), Some(_)) => bg.name.clone(),
            (Some(bg), None) => format!("{}（{}）", bg.name, DEFAULT_BACKGROUND),
            (None, _) => DEFAULT_BACKGROUND.to_string(),
        },
    };
    lines.push(format!("背景: {}", background));

    if !state.on_screen_characters.is_empty() {
        let characters: Vec<String> = state
            .on_screen_characters
            .iter()
            .map(|c| {
                let name = speaker_name(novel, &c.character_id);
                match &c.emotion {
                    Some(emotion) => format!("{}[{} {}]", name, position_label(c.position), emotion),
                    None => format!("{}[{}]", name, position_label(c.position)),
                }
            })
            .collect();
        lines.push(format!("角色: {}", characters.join("  ")));
    }

    if let Some(bgm) = snapshot.current_bgm_id {
        let name = novel.audio_asset(bgm).map_or(bgm, |a| a.name.as_str());
        lines.push(format!("BGM: {}", name));
    }

    lines.push(String::new());
    let text = player.reveal().visible_text();
    match snapshot.node {
        Some(SceneNode::Dialogue(dialogue)) => {
            lines.push(format!(
                "{}：{}",
                speaker_name(novel, &dialogue.character_id),
                text
            ));
        }
        Some(SceneNode::Narration(_)) => lines.push(text.to_string()),
        Some(SceneNode::Choice(choice)) => {
            if !text.is_empty() {
                lines.push(text.to_string());
            }
            if player.choices_visible() {
                for (i, option) in choice.options.iter().enumerate() {
                    lines.push(format!("  {}. {}", i + 1, option.text));
                }
            }
        }
        _ => {}
    }

    if player.is_revealing() {
        lines.push("……".to_string());
    } else if player.can_advance() {
        lines.push("▼".to_string());
    } else if runtime.is_finished() {
        lines.push("【完】".to_string());
    }

    lines.join("\n")
}

/// 渲染历史记录（最近 count 条事件）
pub fn render_history(novel: &Novel, history: &History, count: usize) -> String {
    let events = history.events();
    let start = events.len().saturating_sub(count);

    events[start..]
        .iter()
        .map(|event| match event {
            HistoryEvent::Line {
                speaker: Some(speaker),
                text,
                ..
            } => format!("{}：{}", speaker_name(novel, speaker), text),
            HistoryEvent::Line {
                speaker: None,
                text,
                ..
            } => text.clone(),
            HistoryEvent::ChoiceMade { option, .. } => format!("> {}", option),
            HistoryEvent::SceneEntered { scene_id, .. } => {
                let name = novel.scene(scene_id).map_or(scene_id.as_str(), |s| s.name.as_str());
                format!("== {} ==", name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
