//! 交互式播放循环
//!
//! 读取一行输入，交给 [`Player`]，再把新画面写到输出。
//! 错误只报告给玩家，不中断播放。

use std::io::{self, BufRead, Write};
use std::time::Instant;

use chrono::Local;
use novel_runtime::{AudioEngine, SaveStore};
use tracing::warn;

use crate::input::PlayerInput;
use crate::player::{LoadOutcome, Player, PlayerError};
use crate::render::{render_frame, render_history};

/// 历史记录显示条数
const LOG_LINES: usize = 20;

/// 处理完一条输入后的走向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// 处理一条输入
pub fn handle_input<E: AudioEngine, S: SaveStore, W: Write>(
    player: &mut Player<E, S>,
    input: PlayerInput,
    out: &mut W,
) -> io::Result<Flow> {
    let result: Result<Option<&str>, PlayerError> = match input {
        PlayerInput::Quit => return Ok(Flow::Quit),
        PlayerInput::Log => {
            let runtime = player.runtime();
            writeln!(out, "{}", render_history(runtime.novel(), runtime.history(), LOG_LINES))?;
            return Ok(Flow::Continue);
        }
        PlayerInput::Click => player.click().map(|_| None),
        PlayerInput::Choose(index) => player.choose_index(index).map(|()| None),
        PlayerInput::Jump(scene_id) => player.jump(&scene_id).map(|()| None),
        PlayerInput::Restart => player.restart().map(|()| None),
        PlayerInput::Save => player.save().map(|()| Some("已存档")),
        PlayerInput::Load => player.load().map(|outcome| match outcome {
            LoadOutcome::Loaded => Some("已读档"),
            LoadOutcome::NoSave => Some("没有存档"),
        }),
    };

    match result {
        Ok(Some(message)) => match saved_at(player) {
            Some(time) => writeln!(out, "* {} ({})", message, time)?,
            None => writeln!(out, "* {}", message)?,
        },
        Ok(None) => {}
        Err(e) => {
            warn!(error = %e, "操作失败");
            writeln!(out, "! {}", e)?;
        }
    }

    writeln!(out, "{}", render_frame(player))?;
    Ok(Flow::Continue)
}

/// 当前存档的本地时间
fn saved_at<E: AudioEngine, S: SaveStore>(player: &Player<E, S>) -> Option<String> {
    player
        .slots()
        .saved_at(&player.runtime().novel().id)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
}

/// 运行播放循环直到输入结束或退出
///
/// 两次输入之间经过的真实时间会推进文本显示和音频淡出。
pub fn run<E: AudioEngine, S: SaveStore, R: BufRead, W: Write>(
    player: &mut Player<E, S>,
    input: R,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "{}", render_frame(player))?;
    let mut last = Instant::now();

    for line in input.lines() {
        let line = line?;
        let now = Instant::now();
        player.tick(now.duration_since(last).as_secs_f32());
        last = now;

        let input = match PlayerInput::parse(&line) {
            Ok(input) => input,
            Err(e) => {
                writeln!(out, "! {}", e)?;
                continue;
            }
        };
        if handle_input(player, input, out)? == Flow::Quit {
            break;
        }
    }

    Ok(())
}
