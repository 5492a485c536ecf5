//! # Player 模块
//!
//! 一次播放会话：解释器 + 文本逐字显示 + 音频 + 存档槽。
//!
//! ## 点击语义
//!
//! ```text
//! 文本未显示完 -> click() 立即显示全部（不推进）
//! 文本已显示完 -> click() 推进到下一个交互节点
//! ```
//!
//! 选项只在提问文本显示完后才出现，也只有这时才接受选择。

use std::time::Duration;

use novel_runtime::{
    AudioController, AudioEngine, Novel, NovelRuntime, RuntimeError, SaveError, SaveSlots,
    SaveStore, SceneNode, Step, TextReveal, WaitingReason,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::PlayerConfig;

/// 会话选项
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerOptions {
    pub chars_per_second: f32,
    pub animate: bool,
    pub fade_out: Duration,
}

impl From<&PlayerConfig> for PlayerOptions {
    fn from(config: &PlayerConfig) -> Self {
        Self {
            chars_per_second: config.text.chars_per_second,
            animate: config.text.animate,
            fade_out: config.fade_out(),
        }
    }
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self::from(&PlayerConfig::default())
    }
}

/// 点击结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// 文本立即显示完整
    RevealedAll,
    /// 推进到了新的节点
    Advanced,
    /// 没有可推进的内容（等待选择或已到结尾）
    Stayed,
}

/// 读档结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// 没有存档（包括存档损坏）
    NoSave,
}

/// 会话错误
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Save(#[from] SaveError),

    /// 选项尚未显示
    #[error("文本尚未显示完，选项不可用")]
    ChoicesHidden,

    /// 当前不是选择节点
    #[error("当前没有可选择的选项")]
    NotChoosing,

    #[error("选项序号 {index} 超出范围（共 {count} 项）")]
    InvalidChoice { index: usize, count: usize },
}

/// 播放会话
pub struct Player<E, S> {
    runtime: NovelRuntime,
    reveal: TextReveal,
    animate: bool,
    audio: AudioController<E>,
    slots: SaveSlots<S>,
}

impl<E: AudioEngine, S: SaveStore> Player<E, S> {
    /// 从起始场景开始新会话
    pub fn start(
        novel: Novel,
        options: &PlayerOptions,
        engine: E,
        store: S,
    ) -> Result<Self, PlayerError> {
        let (runtime, step) = NovelRuntime::start(novel)?;
        info!(
            novel = %runtime.novel().id,
            scene = %runtime.cursor().scene_id,
            "开始播放"
        );

        let mut player = Self {
            runtime,
            reveal: TextReveal::new(options.chars_per_second),
            animate: options.animate,
            audio: AudioController::new(engine, options.fade_out),
            slots: SaveSlots::new(store),
        };
        player.apply_step(step);
        Ok(player)
    }

    /// 点击
    pub fn click(&mut self) -> Result<ClickOutcome, PlayerError> {
        if self.is_revealing() {
            self.reveal.skip_to_end();
            return Ok(ClickOutcome::RevealedAll);
        }

        let step = self.runtime.advance()?;
        let moved = step.node_changed;
        self.apply_step(step);

        Ok(if moved {
            ClickOutcome::Advanced
        } else {
            ClickOutcome::Stayed
        })
    }

    /// 按菜单序号（从 0 开始）选择
    pub fn choose_index(&mut self, index: usize) -> Result<(), PlayerError> {
        let option_id = {
            let Some(SceneNode::Choice(choice)) = self.runtime.current_node() else {
                return Err(PlayerError::NotChoosing);
            };
            if !self.choices_visible() {
                return Err(PlayerError::ChoicesHidden);
            }
            let option = choice.options.get(index).ok_or(PlayerError::InvalidChoice {
                index,
                count: choice.options.len(),
            })?;
            option.id.clone()
        };

        let step = self.runtime.choose(&option_id)?;
        info!(option = %option_id, scene = %self.runtime.cursor().scene_id, "选择");
        self.apply_step(step);
        Ok(())
    }

    /// 跳转到指定场景
    pub fn jump(&mut self, scene_id: &str) -> Result<(), PlayerError> {
        let step = self.runtime.jump(scene_id)?;
        info!(scene = %scene_id, "跳转");
        self.apply_step(step);
        Ok(())
    }

    /// 从头开始
    pub fn restart(&mut self) -> Result<(), PlayerError> {
        let step = self.runtime.restart()?;
        info!(scene = %self.runtime.cursor().scene_id, "重新开始");
        self.apply_step(step);
        Ok(())
    }

    /// 存档（覆盖旧存档）
    pub fn save(&mut self) -> Result<(), PlayerError> {
        let data = self.runtime.save();
        self.slots.write(&self.runtime.novel().id, &data)?;
        info!(
            scene = %data.current_scene_id,
            node_index = data.current_node_index,
            "存档成功"
        );
        Ok(())
    }

    /// 读档
    ///
    /// 没有存档或存档损坏都返回 [`LoadOutcome::NoSave`]。
    pub fn load(&mut self) -> Result<LoadOutcome, PlayerError> {
        let data = match self.slots.read(&self.runtime.novel().id) {
            Ok(Some(data)) => data,
            Ok(None) => return Ok(LoadOutcome::NoSave),
            Err(SaveError::Malformed(e)) => {
                warn!(error = %e, "存档已损坏，按无存档处理");
                return Ok(LoadOutcome::NoSave);
            }
            Err(e) => return Err(e.into()),
        };

        let step = self.runtime.load(&data)?;
        info!(
            scene = %data.current_scene_id,
            node_index = data.current_node_index,
            "读档成功"
        );
        self.apply_step(step);
        Ok(LoadOutcome::Loaded)
    }

    /// 删除存档
    pub fn delete_save(&mut self) -> Result<(), PlayerError> {
        self.slots.delete(&self.runtime.novel().id)?;
        Ok(())
    }

    pub fn has_save(&self) -> bool {
        self.slots.has(&self.runtime.novel().id)
    }

    /// 推进 dt 秒（文本显示与 BGM 淡出）
    pub fn tick(&mut self, dt: f32) {
        self.reveal.advance(dt);
        self.audio.tick(dt);
    }

    /// 文本是否仍在逐字显示
    pub fn is_revealing(&self) -> bool {
        !self.reveal.is_complete()
    }

    /// 是否显示"继续"提示
    pub fn can_advance(&self) -> bool {
        !self.is_revealing()
            && self.runtime.waiting() == WaitingReason::WaitForClick
            && !self.runtime.is_finished()
    }

    /// 是否显示选项
    pub fn choices_visible(&self) -> bool {
        !self.is_revealing() && self.runtime.waiting().is_choice()
    }

    pub fn runtime(&self) -> &NovelRuntime {
        &self.runtime
    }

    pub fn reveal(&self) -> &TextReveal {
        &self.reveal
    }

    pub fn audio(&self) -> &AudioController<E> {
        &self.audio
    }

    pub fn slots(&self) -> &SaveSlots<S> {
        &self.slots
    }

    /// 执行一步的结果：音频指令、警告，以及必要时重新开始逐字显示
    fn apply_step(&mut self, step: Step) {
        for warning in &step.warnings {
            warn!(
                kind = %warning.kind,
                id = %warning.id,
                node = %warning.node_id,
                "引用的资源不存在，已忽略"
            );
        }
        self.audio.execute_all(&step.commands);

        if step.node_changed {
            let text = self
                .runtime
                .snapshot()
                .node
                .and_then(SceneNode::text)
                .unwrap_or_default()
                .to_string();
            self.reveal.restart(text);
            if !self.animate {
                self.reveal.skip_to_end();
            }
        }
    }
}
