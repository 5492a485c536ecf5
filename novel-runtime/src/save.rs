//! # Save 模块
//!
//! 存档/读档系统的数据模型与存储端口。
//!
//! ## 设计原则
//!
//! - 只保存恢复播放所需的最小状态：游标 + 演出状态
//! - 每部作品一个存档槽，新存档覆盖旧存档
//! - 存储后端是显式注入的 [`SaveStore`]，不使用进程级全局存储
//!
//! ## 存档 JSON 格式
//!
//! ```text
//! {
//!   "currentSceneId": "scene-1",
//!   "currentNodeIndex": 3,
//!   "onScreenCharacters": [{ "characterId": "alice", "position": "left", "emotion": "happy" }],
//!   "currentBackgroundId": "bg-1",
//!   "currentBgmId": null,
//!   "savedAt": "2026-01-01T00:00:00Z"
//! }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SaveError;
use crate::state::{OnScreenCharacter, PlaybackCursor, PresentationState};

/// 存档键前缀
pub const SAVE_KEY_PREFIX: &str = "novel_save_";

/// 存档数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    pub current_scene_id: String,
    pub current_node_index: usize,
    pub on_screen_characters: Vec<OnScreenCharacter>,
    pub current_background_id: Option<String>,
    pub current_bgm_id: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl SaveData {
    /// 从游标、演出状态和当前 BGM 创建存档（深拷贝）
    pub fn new(
        cursor: &PlaybackCursor,
        presentation: &PresentationState,
        current_bgm_id: Option<&str>,
    ) -> Self {
        Self::at(cursor, presentation, current_bgm_id, Utc::now())
    }

    /// 指定保存时间创建存档
    pub fn at(
        cursor: &PlaybackCursor,
        presentation: &PresentationState,
        current_bgm_id: Option<&str>,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            current_scene_id: cursor.scene_id.clone(),
            current_node_index: cursor.node_index,
            on_screen_characters: presentation.on_screen_characters.clone(),
            current_background_id: presentation.current_background_id.clone(),
            current_bgm_id: current_bgm_id.map(str::to_string),
            saved_at,
        }
    }

    /// 存档中的游标
    pub fn cursor(&self) -> PlaybackCursor {
        PlaybackCursor::new(&self.current_scene_id, self.current_node_index)
    }

    /// 存档中的演出状态
    pub fn presentation(&self) -> PresentationState {
        PresentationState {
            on_screen_characters: self.on_screen_characters.clone(),
            current_background_id: self.current_background_id.clone(),
        }
    }

    /// 序列化为 JSON 字符串
    pub fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string(self).map_err(|e| SaveError::Serialization(e.to_string()))
    }

    /// 从 JSON 字符串反序列化
    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        serde_json::from_str(json).map_err(|e| SaveError::Malformed(e.to_string()))
    }
}

/// 存档存储端口
///
/// 最小的键值接口，值是不透明的字符串。
pub trait SaveStore {
    /// 读取；不存在时返回 `Ok(None)`
    fn get(&self, key: &str) -> Result<Option<String>, SaveError>;

    /// 写入（覆盖）
    fn set(&mut self, key: &str, blob: String) -> Result<(), SaveError>;

    /// 是否存在
    fn has(&self, key: &str) -> bool;

    /// 删除；不存在时不报错
    fn remove(&mut self, key: &str) -> Result<(), SaveError>;
}

/// 内存存储
#[derive(Debug, Clone, Default)]
pub struct MemorySaveStore {
    entries: HashMap<String, String>,
}

impl MemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemorySaveStore {
    fn get(&self, key: &str) -> Result<Option<String>, SaveError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, blob: String) -> Result<(), SaveError> {
        self.entries.insert(key.to_string(), blob);
        Ok(())
    }

    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn remove(&mut self, key: &str) -> Result<(), SaveError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// 按作品划分的存档槽
///
/// 每部作品一个槽位，键为 `"novel_save_" + novel_id`。
#[derive(Debug, Clone)]
pub struct SaveSlots<S> {
    store: S,
}

impl<S: SaveStore> SaveSlots<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 存档键
    pub fn key(novel_id: &str) -> String {
        format!("{SAVE_KEY_PREFIX}{novel_id}")
    }

    /// 写入存档（覆盖旧存档）
    pub fn write(&mut self, novel_id: &str, data: &SaveData) -> Result<(), SaveError> {
        let json = data.to_json()?;
        self.store.set(&Self::key(novel_id), json)
    }

    /// 读取存档
    ///
    /// 没有存档是正常情况，返回 `Ok(None)`；内容损坏返回 [`SaveError::Malformed`]。
    pub fn read(&self, novel_id: &str) -> Result<Option<SaveData>, SaveError> {
        match self.store.get(&Self::key(novel_id))? {
            Some(json) => SaveData::from_json(&json).map(Some),
            None => Ok(None),
        }
    }

    /// 是否有存档
    pub fn has(&self, novel_id: &str) -> bool {
        self.store.has(&Self::key(novel_id))
    }

    /// 删除存档
    pub fn delete(&mut self, novel_id: &str) -> Result<(), SaveError> {
        self.store.remove(&Self::key(novel_id))
    }

    /// 存档时间（不可读时返回 None）
    pub fn saved_at(&self, novel_id: &str) -> Option<DateTime<Utc>> {
        self.read(novel_id).ok().flatten().map(|d| d.saved_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::novel::Position;
    use chrono::TimeZone;

    fn sample() -> SaveData {
        let cursor = PlaybackCursor::new("scene-1", 3);
        let presentation = PresentationState {
            on_screen_characters: vec![OnScreenCharacter {
                character_id: "alice".to_string(),
                position: Position::Left,
                emotion: Some("happy".to_string()),
            }],
            current_background_id: Some("bg-1".to_string()),
        };
        let saved_at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        SaveData::at(&cursor, &presentation, Some("bgm-1"), saved_at)
    }

    #[test]
    fn test_save_json_shape() {
        let json = sample().to_json().unwrap();
        insta::assert_snapshot!(
            json,
            @r#"{"currentSceneId":"scene-1","currentNodeIndex":3,"onScreenCharacters":[{"characterId":"alice","position":"left","emotion":"happy"}],"currentBackgroundId":"bg-1","currentBgmId":"bgm-1","savedAt":"2026-01-02T03:04:05Z"}"#
        );
    }

    #[test]
    fn test_save_key() {
        insta::assert_snapshot!(SaveSlots::<MemorySaveStore>::key("novel-1"), @"novel_save_novel-1");
    }

    #[test]
    fn test_malformed_save() {
        assert!(matches!(
            SaveData::from_json("not json"),
            Err(SaveError::Malformed(_))
        ));
        // 缺少必需字段
        assert!(matches!(
            SaveData::from_json(r#"{ "currentSceneId": "s1" }"#),
            Err(SaveError::Malformed(_))
        ));
    }

    #[test]
    fn test_slots_overwrite_and_delete() {
        let mut slots = SaveSlots::new(MemorySaveStore::new());
        assert!(!slots.has("novel-1"));
        assert_eq!(slots.read("novel-1").unwrap(), None);

        let mut data = sample();
        slots.write("novel-1", &data).unwrap();
        data.current_node_index = 7;
        slots.write("novel-1", &data).unwrap();

        let loaded = slots.read("novel-1").unwrap().unwrap();
        assert_eq!(loaded.current_node_index, 7);
        assert_eq!(loaded.presentation(), data.presentation());
        assert_eq!(slots.saved_at("novel-1"), Some(data.saved_at));
        // 其他作品互不影响
        assert!(!slots.has("novel-2"));

        slots.delete("novel-1").unwrap();
        assert!(!slots.has("novel-1"));
        slots.delete("novel-1").unwrap();
    }

    #[test]
    fn test_slots_malformed_blob() {
        let mut store = MemorySaveStore::new();
        store.set("novel_save_novel-1", "{".to_string()).unwrap();
        let slots = SaveSlots::new(store);

        assert!(matches!(slots.read("novel-1"), Err(SaveError::Malformed(_))));
        assert_eq!(slots.saved_at("novel-1"), None);
    }
}
