//! # Assets 模块
//!
//! 资源 id 到可显示/可播放地址的解析。
//!
//! 运行时只携带 id；地址为空视为缺失，由 Host 回退到默认画面或静音。

use crate::novel::Novel;

/// 资源解析接口
pub trait AssetResolver {
    /// 背景图片地址
    fn background_url(&self, background_id: &str) -> Option<&str>;

    /// 音频地址
    fn audio_url(&self, audio_id: &str) -> Option<&str>;

    /// 角色立绘地址（按表情回退）
    fn sprite_url(&self, character_id: &str, emotion: Option<&str>) -> Option<&str>;
}

fn non_empty(url: &str) -> Option<&str> {
    (!url.is_empty()).then_some(url)
}

impl AssetResolver for Novel {
    fn background_url(&self, background_id: &str) -> Option<&str> {
        self.background(background_id)
            .and_then(|b| non_empty(&b.image_url))
    }

    fn audio_url(&self, audio_id: &str) -> Option<&str> {
        self.audio_asset(audio_id)
            .and_then(|a| non_empty(&a.audio_url))
    }

    fn sprite_url(&self, character_id: &str, emotion: Option<&str>) -> Option<&str> {
        self.character(character_id)
            .and_then(|c| c.sprite_for(emotion))
            .and_then(|s| non_empty(&s.image_url))
    }
}
