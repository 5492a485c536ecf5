//! # History 模块
//!
//! 历史记录数据模型，用于支持回看（backlog）。
//!
//! ## 设计原则
//!
//! - 记录玩家实际看到的内容（台词、选择、进入的场景）
//! - 不记录演出细节（角色站位、音频）
//! - 有上限，超出时丢弃最早的事件

use serde::{Deserialize, Serialize};

/// 默认最多记录的事件数
pub const DEFAULT_MAX_EVENTS: usize = 1000;

/// 历史事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// 台词（对话或旁白）
    Line {
        /// 说话角色 id（None 表示旁白）
        speaker: Option<String>,
        /// 文本
        text: String,
        /// 时间戳（Unix 秒）
        timestamp: i64,
    },

    /// 选择事件
    ChoiceMade {
        /// 选择前的提问
        prompt: Option<String>,
        /// 选中的选项文本
        option: String,
        timestamp: i64,
    },

    /// 进入场景
    SceneEntered { scene_id: String, timestamp: i64 },
}

impl HistoryEvent {
    /// 获取事件时间戳
    pub fn timestamp(&self) -> i64 {
        match self {
            HistoryEvent::Line { timestamp, .. } => *timestamp,
            HistoryEvent::ChoiceMade { timestamp, .. } => *timestamp,
            HistoryEvent::SceneEntered { timestamp, .. } => *timestamp,
        }
    }

    /// 创建台词事件
    pub fn line(speaker: Option<String>, text: String) -> Self {
        HistoryEvent::Line {
            speaker,
            text,
            timestamp: current_timestamp(),
        }
    }

    /// 创建选择事件
    pub fn choice_made(prompt: Option<String>, option: String) -> Self {
        HistoryEvent::ChoiceMade {
            prompt,
            option,
            timestamp: current_timestamp(),
        }
    }

    /// 创建进入场景事件
    pub fn scene_entered(scene_id: String) -> Self {
        HistoryEvent::SceneEntered {
            scene_id,
            timestamp: current_timestamp(),
        }
    }
}

/// 历史记录容器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    /// 事件列表（按时间顺序）
    events: Vec<HistoryEvent>,
    /// 最大记录数（防止内存无限增长）
    max_events: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// 创建新的历史记录
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            max_events: DEFAULT_MAX_EVENTS,
        }
    }

    /// 设置最大记录数
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// 添加事件
    pub fn push(&mut self, event: HistoryEvent) {
        self.events.push(event);

        if self.events.len() > self.max_events {
            let overflow = self.events.len() - self.max_events;
            self.events.drain(..overflow);
        }
    }

    /// 获取所有事件
    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    /// 台词数量
    pub fn line_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HistoryEvent::Line { .. }))
            .count()
    }

    /// 最近的 N 条台词（按时间顺序）
    pub fn recent_lines(&self, count: usize) -> Vec<&HistoryEvent> {
        let mut lines: Vec<&HistoryEvent> = self
            .events
            .iter()
            .rev()
            .filter(|e| matches!(e, HistoryEvent::Line { .. }))
            .take(count)
            .collect();
        lines.reverse();
        lines
    }

    /// 访问过的场景（按进入顺序，可能重复）
    pub fn visited_scenes(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HistoryEvent::SceneEntered { scene_id, .. } => Some(scene_id.as_str()),
                _ => None,
            })
            .collect()
    }

    /// 清空历史
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// 获取事件总数
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
