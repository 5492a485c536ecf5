//! # Audio 模块
//!
//! 无声的音频引擎：不输出声音，只记录并以日志形式报告播放动作。

use std::collections::HashMap;
use std::time::Duration;

use novel_runtime::{AssetResolver, AudioEngine, Novel};
use tracing::{debug, warn};

/// 音频动作记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    Loop(String),
    Stop,
    FadeOut(Duration),
    OneShot(String),
}

/// 日志音频引擎
#[derive(Debug, Clone, Default)]
pub struct TracingAudioEngine {
    /// 音频 id -> 地址
    urls: HashMap<String, String>,
    current: Option<String>,
    events: Vec<AudioEvent>,
}

impl TracingAudioEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预先解析作品中的音频地址
    pub fn for_novel(novel: &Novel) -> Self {
        let urls = novel
            .audio
            .iter()
            .filter_map(|asset| {
                novel
                    .audio_url(&asset.id)
                    .map(|url| (asset.id.clone(), url.to_string()))
            })
            .collect();
        Self {
            urls,
            ..Self::default()
        }
    }

    /// 已执行的动作
    pub fn events(&self) -> &[AudioEvent] {
        &self.events
    }

    fn url(&self, audio_id: &str) -> &str {
        self.urls.get(audio_id).map_or("", String::as_str)
    }
}

impl AudioEngine for TracingAudioEngine {
    fn play_loop(&mut self, audio_id: &str) {
        if !self.urls.contains_key(audio_id) {
            warn!(audio = %audio_id, "音频没有可播放的地址，静音播放");
        }
        debug!(audio = %audio_id, url = %self.url(audio_id), "播放 BGM");
        self.current = Some(audio_id.to_string());
        self.events.push(AudioEvent::Loop(audio_id.to_string()));
    }

    fn stop(&mut self) {
        debug!(audio = ?self.current, "停止 BGM");
        self.current = None;
        self.events.push(AudioEvent::Stop);
    }

    fn fade_out_and_stop(&mut self, duration: Duration) {
        debug!(audio = ?self.current, duration_ms = duration.as_millis() as u64, "淡出 BGM");
        self.events.push(AudioEvent::FadeOut(duration));
    }

    fn play_one_shot(&mut self, audio_id: &str) {
        debug!(audio = %audio_id, url = %self.url(audio_id), "播放音效");
        self.events.push(AudioEvent::OneShot(audio_id.to_string()));
    }

    fn current_loop_id(&self) -> Option<&str> {
        self.current.as_deref()
    }
}
