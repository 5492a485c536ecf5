//! # Typewriter 模块
//!
//! 文本逐字显示计时器。
//!
//! 只处理 `(文本, 速度)`，不知道节点、角色或场景。
//! 由 Host 每帧调用 [`TextReveal::advance`] 推进。

/// 默认显示速度（字/秒）
pub const DEFAULT_CHARS_PER_SECOND: f32 = 33.0;

/// 逐字显示状态
#[derive(Debug, Clone, PartialEq)]
pub struct TextReveal {
    text: String,
    total_chars: usize,
    visible_chars: usize,
    chars_per_second: f32,
    /// 未满一个字的累计进度
    timer: f32,
}

impl Default for TextReveal {
    fn default() -> Self {
        Self::new(DEFAULT_CHARS_PER_SECOND)
    }
}

impl TextReveal {
    pub fn new(chars_per_second: f32) -> Self {
        Self {
            text: String::new(),
            total_chars: 0,
            visible_chars: 0,
            chars_per_second,
            timer: 0.0,
        }
    }

    /// 换成新文本，从空开始重新显示
    pub fn restart(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.total_chars = self.text.chars().count();
        self.visible_chars = 0;
        self.timer = 0.0;
    }

    /// 推进 dt 秒，返回是否已显示完
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.is_complete() {
            return true;
        }
        if self.chars_per_second <= 0.0 {
            self.skip_to_end();
            return true;
        }

        self.timer += dt * self.chars_per_second;
        while self.timer >= 1.0 && self.visible_chars < self.total_chars {
            self.timer -= 1.0;
            self.visible_chars += 1;
        }
        self.is_complete()
    }

    /// 立即显示全部文本
    pub fn skip_to_end(&mut self) {
        self.visible_chars = self.total_chars;
        self.timer = 0.0;
    }

    pub fn is_complete(&self) -> bool {
        self.visible_chars >= self.total_chars
    }

    /// 当前可见的前缀
    pub fn visible_text(&self) -> &str {
        match self.text.char_indices().nth(self.visible_chars) {
            Some((byte_index, _)) => &self.text[..byte_index],
            None => &self.text,
        }
    }

    pub fn visible_chars(&self) -> usize {
        self.visible_chars
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
