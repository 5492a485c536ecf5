//! # Audio 模块
//!
//! 把 Runtime 的音频指令交给外部音频引擎执行。
//!
//! 淡出不阻塞解释器：控制器记录一个待完成的淡出，由 Host 每帧调用
//! [`AudioController::tick`] 推进；淡出结束时只有当被淡出的 BGM
//! 仍是当前循环时才真正停止。新的播放或停止会取消待完成的淡出。

use std::time::Duration;

use crate::command::Command;

/// 外部音频引擎接口
pub trait AudioEngine {
    /// 循环播放（切换当前 BGM）
    fn play_loop(&mut self, audio_id: &str);

    /// 立即停止当前循环
    fn stop(&mut self);

    /// 开始淡出当前循环
    ///
    /// 淡出结束后的停止由 [`AudioController`] 负责调用 [`AudioEngine::stop`]。
    fn fade_out_and_stop(&mut self, duration: Duration);

    /// 播放一次性音效
    fn play_one_shot(&mut self, audio_id: &str);

    /// 当前循环的音频 id
    fn current_loop_id(&self) -> Option<&str>;
}

/// 待完成的淡出
#[derive(Debug, Clone, PartialEq)]
struct PendingFade {
    audio_id: String,
    /// 剩余时间（秒）
    remaining: f32,
}

/// 音频控制器
#[derive(Debug)]
pub struct AudioController<E> {
    engine: E,
    fade_out: Duration,
    pending_fade: Option<PendingFade>,
}

impl<E: AudioEngine> AudioController<E> {
    /// 创建控制器
    ///
    /// `fade_out` 为 `FadeOutBgm` 的淡出时长。
    pub fn new(engine: E, fade_out: Duration) -> Self {
        Self {
            engine,
            fade_out,
            pending_fade: None,
        }
    }

    /// 执行一条指令
    pub fn execute(&mut self, command: &Command) {
        match command {
            Command::PlayBgm { audio_id } => {
                let fading = self.pending_fade.take().is_some();
                // 同一首且没有在淡出：不重新播放
                if !fading && self.engine.current_loop_id() == Some(audio_id.as_str()) {
                    return;
                }
                self.engine.play_loop(audio_id);
            }
            Command::StopBgm => {
                self.pending_fade = None;
                self.engine.stop();
            }
            Command::FadeOutBgm { audio_id } => {
                if self.engine.current_loop_id() != Some(audio_id.as_str()) {
                    return;
                }
                self.engine.fade_out_and_stop(self.fade_out);
                self.pending_fade = Some(PendingFade {
                    audio_id: audio_id.clone(),
                    remaining: self.fade_out.as_secs_f32(),
                });
            }
            Command::PlaySfx { audio_id } => self.engine.play_one_shot(audio_id),
        }
    }

    /// 批量执行指令
    pub fn execute_all<'a>(&mut self, commands: impl IntoIterator<Item = &'a Command>) {
        for command in commands {
            self.execute(command);
        }
    }

    /// 推进淡出计时（dt 单位为秒）
    pub fn tick(&mut self, dt: f32) {
        let Some(fade) = self.pending_fade.as_mut() else {
            return;
        };
        fade.remaining -= dt;
        if fade.remaining > 0.0 {
            return;
        }

        if let Some(fade) = self.pending_fade.take()
            && self.engine.current_loop_id() == Some(fade.audio_id.as_str())
        {
            self.engine.stop();
        }
    }

    /// 是否有淡出正在进行
    pub fn is_fading(&self) -> bool {
        self.pending_fade.is_some()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}
