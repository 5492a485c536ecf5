//! # Engine 模块
//!
//! 播放解释器：在作品的场景图上移动游标，维护演出状态。
//!
//! ## 执行模型
//!
//! ```text
//! start / advance / choose / jump / load  ->  Result<Step, RuntimeError>
//! ```
//!
//! 1. 导演节点（角色、背景、音频）自动应用并跳过
//! 2. 交互节点（对话、旁白、选择）停下等待 Host 输入
//! 3. 跳转节点立即切换场景，并在新场景上重新执行入场预读
//!
//! 每次调用先在副本上计算，成功后才提交；失败时状态保持调用前的样子。

use crate::command::Command;
use crate::error::{PlaybackWarning, RuntimeError};
use crate::history::{History, HistoryEvent};
use crate::novel::{Novel, Scene, SceneNode};
use crate::runtime::director::{Director, DirectorOutput};
use crate::save::SaveData;
use crate::state::{PlaybackCursor, PresentationState, WaitingReason};

/// 一次调用的结果
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// 需要 Host 执行的音频指令
    pub commands: Vec<Command>,
    /// 无法解析的引用（非致命）
    pub warnings: Vec<PlaybackWarning>,
    /// 新的等待状态
    pub waiting: WaitingReason,
    /// 游标是否落到了新的节点上（包括重新进入同一场景）
    pub node_changed: bool,
}

/// 可直接渲染的快照
#[derive(Debug, Clone)]
pub struct Snapshot<'a> {
    pub scene_id: &'a str,
    pub node_index: usize,
    /// 当前的交互节点（场景已无交互节点时为 None）
    pub node: Option<&'a SceneNode>,
    pub presentation: &'a PresentationState,
    pub current_bgm_id: Option<&'a str>,
    pub waiting: WaitingReason,
}

/// 转场/推进的计算结果，提交前不影响 Runtime
struct Landing {
    cursor: PlaybackCursor,
    presentation: PresentationState,
    current_bgm_id: Option<String>,
    output: DirectorOutput,
}

/// 作品播放 Runtime
///
/// # 使用示例
///
/// ```ignore
/// let (mut runtime, step) = NovelRuntime::start(novel)?;
/// host.execute(step.commands);
///
/// loop {
///     render(runtime.snapshot());
///     let step = match wait_input() {
///         Input::Click => runtime.advance()?,
///         Input::Choose(id) => runtime.choose(&id)?,
///     };
///     host.execute(step.commands);
/// }
/// ```
pub struct NovelRuntime {
    /// 作品（只读）
    novel: Novel,
    /// 播放游标
    cursor: PlaybackCursor,
    /// 演出状态
    presentation: PresentationState,
    /// 当前 BGM（跨场景保留）
    current_bgm_id: Option<String>,
    /// 历史记录
    history: History,
}

impl NovelRuntime {
    /// 从起始场景开始播放
    ///
    /// 起始场景不存在、为空或入场跳转成环时返回错误，不会回退到其他场景。
    pub fn start(novel: Novel) -> Result<(Self, Step), RuntimeError> {
        if novel.scenes().next().is_none() {
            return Err(RuntimeError::EmptyNovel);
        }

        let landing = enter_scene(&novel, &novel.start_scene_id, None, DirectorOutput::default())?;

        let mut runtime = Self {
            cursor: PlaybackCursor::start(&novel.start_scene_id),
            novel,
            presentation: PresentationState::new(),
            current_bgm_id: None,
            history: History::new(),
        };
        let step = runtime.commit(landing, true);
        Ok((runtime, step))
    }

    /// 从存档恢复播放
    ///
    /// 不执行起始场景的入场预读。
    pub fn resume(novel: Novel, data: &SaveData) -> Result<(Self, Step), RuntimeError> {
        if novel.scenes().next().is_none() {
            return Err(RuntimeError::EmptyNovel);
        }

        let mut runtime = Self {
            cursor: PlaybackCursor::start(&novel.start_scene_id),
            novel,
            presentation: PresentationState::new(),
            current_bgm_id: None,
            history: History::new(),
        };
        let step = runtime.load(data)?;
        Ok((runtime, step))
    }

    /// 推进到下一个交互节点
    ///
    /// 调用前 Host 应确认当前文本已经完全显示。
    /// 已在最后一个节点或正在等待选择时，不做任何事。
    pub fn advance(&mut self) -> Result<Step, RuntimeError> {
        let scene = self.current_scene()?;
        if self.cursor.node_index >= scene.last_index()
            || matches!(scene.get_node(self.cursor.node_index), Some(SceneNode::Choice(_)))
        {
            return Ok(self.idle_step());
        }

        let director = Director::new(&self.novel);
        let mut presentation = self.presentation.clone();
        let mut bgm = self.current_bgm_id.clone();
        let mut output = DirectorOutput::default();
        let mut index = self.cursor.node_index;

        while let Some(node) = scene.get_node(index + 1) {
            index += 1;
            match node {
                SceneNode::Jump(jump) => {
                    let landing = enter_scene(&self.novel, &jump.target_scene_id, bgm, output)?;
                    return Ok(self.commit(landing, true));
                }
                SceneNode::Dialogue(dialogue) => {
                    director
                        .enter_speaker(&mut presentation, dialogue)
                        .append_to(&mut output);
                    break;
                }
                SceneNode::Narration(_) | SceneNode::Choice(_) => break,
                SceneNode::Background(_) | SceneNode::Character(_) | SceneNode::Audio(_) => {
                    director
                        .apply(&mut presentation, &mut bgm, node)
                        .append_to(&mut output);
                }
            }
        }

        let landing = Landing {
            cursor: PlaybackCursor::new(&scene.id, index),
            presentation,
            current_bgm_id: bgm,
            output,
        };
        Ok(self.commit(landing, false))
    }

    /// 选择当前选择节点中的选项
    pub fn choose(&mut self, option_id: &str) -> Result<Step, RuntimeError> {
        let choice = match self.current_node() {
            Some(SceneNode::Choice(choice)) => choice,
            other => {
                return Err(RuntimeError::StateMismatch {
                    expected: "choice".to_string(),
                    actual: other.map_or("end", SceneNode::kind_name).to_string(),
                });
            }
        };
        let option = choice
            .option(option_id)
            .ok_or_else(|| RuntimeError::ChoiceOptionNotFound {
                option_id: option_id.to_string(),
            })?;

        let event = HistoryEvent::choice_made(choice.prompt.clone(), option.text.clone());
        let landing = enter_scene(
            &self.novel,
            &option.target_scene_id,
            self.current_bgm_id.clone(),
            DirectorOutput::default(),
        )?;

        self.history.push(event);
        Ok(self.commit(landing, true))
    }

    /// 跳转到指定场景（如编辑器的"从这里预览"）
    pub fn jump(&mut self, target_scene_id: &str) -> Result<Step, RuntimeError> {
        let landing = enter_scene(
            &self.novel,
            target_scene_id,
            self.current_bgm_id.clone(),
            DirectorOutput::default(),
        )?;
        Ok(self.commit(landing, true))
    }

    /// 从头开始（停止音乐并清空历史）
    pub fn restart(&mut self) -> Result<Step, RuntimeError> {
        let mut output = DirectorOutput::default();
        if self.current_bgm_id.is_some() {
            output.commands.push(Command::StopBgm);
        }

        let landing = enter_scene(&self.novel, &self.novel.start_scene_id, None, output)?;
        self.history.clear();
        Ok(self.commit(landing, true))
    }

    /// 生成存档
    pub fn save(&self) -> SaveData {
        SaveData::new(&self.cursor, &self.presentation, self.current_bgm_id.as_deref())
    }

    /// 读取存档
    ///
    /// 游标和演出状态按原样恢复，不重新执行入场预读。
    /// 返回的指令用于恢复 BGM（音频系统本身不参与存档）。
    pub fn load(&mut self, data: &SaveData) -> Result<Step, RuntimeError> {
        let scene = self.novel.scene(&data.current_scene_id).ok_or_else(|| {
            RuntimeError::SceneNotFound {
                scene_id: data.current_scene_id.clone(),
            }
        })?;
        if data.current_node_index >= scene.len() {
            return Err(RuntimeError::InvalidSavePosition {
                scene_id: data.current_scene_id.clone(),
                node_index: data.current_node_index,
            });
        }

        self.cursor = data.cursor();
        self.presentation = data.presentation();
        self.current_bgm_id = data.current_bgm_id.clone();

        let command = match &self.current_bgm_id {
            Some(audio_id) => Command::PlayBgm {
                audio_id: audio_id.clone(),
            },
            None => Command::StopBgm,
        };
        Ok(Step {
            commands: vec![command],
            warnings: Vec::new(),
            waiting: self.waiting(),
            node_changed: true,
        })
    }

    /// 当前快照
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            scene_id: &self.cursor.scene_id,
            node_index: self.cursor.node_index,
            node: self.current_node().filter(|n| n.is_interactive()),
            presentation: &self.presentation,
            current_bgm_id: self.current_bgm_id.as_deref(),
            waiting: self.waiting(),
        }
    }

    /// 当前等待状态
    pub fn waiting(&self) -> WaitingReason {
        match self.current_node() {
            Some(SceneNode::Choice(choice)) => WaitingReason::choice(choice.options.len()),
            Some(SceneNode::Dialogue(_) | SceneNode::Narration(_)) => WaitingReason::WaitForClick,
            _ => WaitingReason::Ended,
        }
    }

    /// 场景是否已没有后续内容
    ///
    /// 选择节点永远不算结束。
    pub fn is_finished(&self) -> bool {
        let Some(scene) = self.novel.scene(&self.cursor.scene_id) else {
            return true;
        };
        self.cursor.node_index >= scene.last_index()
            && !matches!(self.current_node(), Some(SceneNode::Choice(_)))
    }

    /// 游标指向的节点
    pub fn current_node(&self) -> Option<&SceneNode> {
        self.novel
            .scene(&self.cursor.scene_id)
            .and_then(|s| s.get_node(self.cursor.node_index))
    }

    pub fn novel(&self) -> &Novel {
        &self.novel
    }

    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }

    pub fn presentation(&self) -> &PresentationState {
        &self.presentation
    }

    /// 当前播放的 BGM
    pub fn current_bgm_id(&self) -> Option<&str> {
        self.current_bgm_id.as_deref()
    }

    /// 获取历史记录
    pub fn history(&self) -> &History {
        &self.history
    }

    fn current_scene(&self) -> Result<&Scene, RuntimeError> {
        self.novel
            .scene(&self.cursor.scene_id)
            .ok_or_else(|| RuntimeError::SceneNotFound {
                scene_id: self.cursor.scene_id.clone(),
            })
    }

    fn idle_step(&self) -> Step {
        Step {
            commands: Vec::new(),
            warnings: Vec::new(),
            waiting: self.waiting(),
            node_changed: false,
        }
    }

    /// 提交计算结果，并记录历史
    fn commit(&mut self, landing: Landing, entered_scene: bool) -> Step {
        self.cursor = landing.cursor;
        self.presentation = landing.presentation;
        self.current_bgm_id = landing.current_bgm_id;

        if entered_scene {
            self.history
                .push(HistoryEvent::scene_entered(self.cursor.scene_id.clone()));
        }
        let line = match self.current_node() {
            Some(SceneNode::Dialogue(d)) => {
                Some(HistoryEvent::line(Some(d.character_id.clone()), d.text.clone()))
            }
            Some(SceneNode::Narration(n)) => Some(HistoryEvent::line(None, n.text.clone())),
            _ => None,
        };
        if let Some(event) = line {
            self.history.push(event);
        }

        Step {
            commands: landing.output.commands,
            warnings: landing.output.warnings,
            waiting: self.waiting(),
            node_changed: true,
        }
    }
}

/// 进入场景并执行入场预读
///
/// 演出状态从空开始，从索引 0 依次应用导演节点，停在第一个交互节点；
/// 遇到跳转节点则清空演出状态并转入目标场景。BGM 贯穿整个过程。
/// 同一次预读中再次进入已访问的场景视为循环。
fn enter_scene(
    novel: &Novel,
    target_scene_id: &str,
    mut bgm: Option<String>,
    mut output: DirectorOutput,
) -> Result<Landing, RuntimeError> {
    let director = Director::new(novel);
    let mut chain: Vec<String> = Vec::new();
    let mut scene_id = target_scene_id.to_string();

    'scenes: loop {
        if chain.contains(&scene_id) {
            chain.push(scene_id);
            return Err(RuntimeError::CyclicEntryJump { chain });
        }
        let scene = novel
            .scene(&scene_id)
            .ok_or_else(|| RuntimeError::SceneNotFound {
                scene_id: scene_id.clone(),
            })?;
        if scene.is_empty() {
            return Err(RuntimeError::EmptyScene { scene_id });
        }
        chain.push(scene_id.clone());
        let mut presentation = PresentationState::new();

        for (index, node) in scene.nodes.iter().enumerate() {
            match node {
                SceneNode::Jump(jump) => {
                    scene_id = jump.target_scene_id.clone();
                    continue 'scenes;
                }
                SceneNode::Dialogue(dialogue) => {
                    director
                        .enter_speaker(&mut presentation, dialogue)
                        .append_to(&mut output);
                    return Ok(Landing {
                        cursor: PlaybackCursor::new(&scene.id, index),
                        presentation,
                        current_bgm_id: bgm,
                        output,
                    });
                }
                SceneNode::Narration(_) | SceneNode::Choice(_) => {
                    return Ok(Landing {
                        cursor: PlaybackCursor::new(&scene.id, index),
                        presentation,
                        current_bgm_id: bgm,
                        output,
                    });
                }
                SceneNode::Background(_) | SceneNode::Character(_) | SceneNode::Audio(_) => {
                    director
                        .apply(&mut presentation, &mut bgm, node)
                        .append_to(&mut output);
                }
            }
        }

        // 没有交互节点：停在最后一个节点
        return Ok(Landing {
            cursor: PlaybackCursor::new(&scene.id, scene.last_index()),
            presentation,
            current_bgm_id: bgm,
            output,
        });
    }
}
