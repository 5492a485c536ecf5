//! # 诊断模块
//!
//! 提供作品内容的静态检查，不依赖 IO 或引擎。
//!
//! ## 设计原则
//!
//! - 纯函数 API，可在无 IO 环境下运行
//! - 诊断分级：Error（无法正常播放）、Warn（播放时会退化为空操作）、Info（信息提示）
//! - 与播放器的行为一致：播放器能容忍的问题只报 Warn

use std::collections::{HashSet, VecDeque};

use crate::novel::{AudioAction, AudioKind, Novel, Scene, SceneNode};

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（建议修复）
    Warn,
    /// 错误（必须修复）
    Error,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 场景 id（作品级问题为作品 id）
    pub location: String,
    /// 节点 id（如果可定位）
    pub node_id: Option<String>,
    /// 诊断消息
    pub message: String,
    /// 诊断详情（可选）
    pub detail: Option<String>,
}

impl Diagnostic {
    fn new(level: DiagnosticLevel, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            location: location.into(),
            node_id: None,
            message: message.into(),
            detail: None,
        }
    }

    /// 创建错误诊断
    pub fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, location, message)
    }

    /// 创建警告诊断
    pub fn warn(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warn, location, message)
    }

    /// 创建信息诊断
    pub fn info(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, location, message)
    }

    /// 设置节点
    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    /// 设置详情
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.location)?;
        if let Some(node_id) = &self.node_id {
            write!(f, "#{}", node_id)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n  | {}", detail)?;
        }
        Ok(())
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    /// 诊断条目列表
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    /// 创建空结果
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加诊断
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 合并另一个结果
    pub fn merge(&mut self, other: DiagnosticResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// 获取错误数量
    pub fn error_count(&self) -> usize {
        self.count(DiagnosticLevel::Error)
    }

    /// 获取警告数量
    pub fn warn_count(&self) -> usize {
        self.count(DiagnosticLevel::Warn)
    }

    fn count(&self, level: DiagnosticLevel) -> usize {
        self.diagnostics.iter().filter(|d| d.level == level).count()
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 按级别过滤
    pub fn filter_by_level(&self, min_level: DiagnosticLevel) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level >= min_level)
            .collect()
    }
}

//=============================================================================
// 作品分析 API
//=============================================================================

/// 分析作品，返回诊断结果
///
/// 执行以下检查：
/// - 作品为空、起始场景缺失
/// - 场景 id 重复、空场景
/// - 节点引用的角色/背景/音频/场景不存在
/// - 选择没有选项、选项 id 重复
/// - 入场跳转成环
/// - 从起始场景无法到达的场景
pub fn analyze_novel(novel: &Novel) -> DiagnosticResult {
    let mut result = DiagnosticResult::new();

    let Some(first_scene_id) = novel.first_scene_id() else {
        result.push(Diagnostic::error(&novel.id, "作品没有任何场景"));
        return result;
    };

    let start_scene_id = if novel.start_scene_id.is_empty() {
        result.push(Diagnostic::warn(
            &novel.id,
            "未设置起始场景，将从第一个场景开始",
        ));
        first_scene_id
    } else {
        if novel.scene(&novel.start_scene_id).is_none() {
            result.push(Diagnostic::error(
                &novel.id,
                format!("起始场景不存在: {}", novel.start_scene_id),
            ));
        }
        novel.start_scene_id.as_str()
    };

    let mut seen_scenes = HashSet::new();
    for scene in novel.scenes() {
        if !seen_scenes.insert(scene.id.as_str()) {
            result.push(Diagnostic::error(&scene.id, "场景 id 重复"));
        }
    }

    for scene in novel.scenes() {
        if scene.is_empty() {
            result.push(Diagnostic::error(&scene.id, "场景没有任何节点"));
            continue;
        }
        for node in &scene.nodes {
            check_node(novel, scene, node, &mut result);
        }
    }

    check_entry_cycles(novel, &mut result);

    if novel.scene(start_scene_id).is_some() {
        let reachable = reachable_scenes(novel, start_scene_id);
        for scene in novel.scenes() {
            if !reachable.contains(scene.id.as_str()) {
                result.push(Diagnostic::info(&scene.id, "场景无法从起始场景到达"));
            }
        }
    }

    result
}

/// 检查单个节点的引用
fn check_node(novel: &Novel, scene: &Scene, node: &SceneNode, result: &mut DiagnosticResult) {
    let at = |diagnostic: Diagnostic| diagnostic.with_node(node.id());

    match node {
        SceneNode::Dialogue(dialogue) => {
            if novel.character(&dialogue.character_id).is_none() {
                result.push(at(Diagnostic::warn(
                    &scene.id,
                    format!("角色不存在: {}", dialogue.character_id),
                )));
            }
        }
        SceneNode::Character(character) => {
            if novel.character(&character.character_id).is_none() {
                result.push(at(Diagnostic::warn(
                    &scene.id,
                    format!("角色不存在: {}", character.character_id),
                )));
            }
        }
        SceneNode::Background(background) => {
            if novel.background(&background.background_id).is_none() {
                result.push(at(Diagnostic::warn(
                    &scene.id,
                    format!("背景不存在: {}", background.background_id),
                )));
            }
        }
        SceneNode::Audio(audio) => match novel.audio_asset(&audio.audio_id) {
            None => result.push(at(Diagnostic::warn(
                &scene.id,
                format!("音频不存在: {}", audio.audio_id),
            ))),
            Some(asset) if asset.kind == AudioKind::Sfx && audio.action != AudioAction::Play => {
                result.push(at(Diagnostic::info(
                    &scene.id,
                    format!("音效 '{}' 只响应 play，该指令不会生效", audio.audio_id),
                )));
            }
            Some(_) => {}
        },
        SceneNode::Jump(jump) => {
            if novel.scene(&jump.target_scene_id).is_none() {
                result.push(at(Diagnostic::error(
                    &scene.id,
                    format!("跳转目标场景不存在: {}", jump.target_scene_id),
                )));
            }
        }
        SceneNode::Choice(choice) => {
            if choice.options.is_empty() {
                result.push(at(Diagnostic::error(&scene.id, "选择没有任何选项")));
            }
            let mut seen_options = HashSet::new();
            for option in &choice.options {
                if !seen_options.insert(option.id.as_str()) {
                    result.push(at(Diagnostic::error(
                        &scene.id,
                        format!("选项 id 重复: {}", option.id),
                    )));
                }
                if novel.scene(&option.target_scene_id).is_none() {
                    result.push(at(Diagnostic::error(
                        &scene.id,
                        format!(
                            "选项 '{}' 的目标场景不存在: {}",
                            option.id, option.target_scene_id
                        ),
                    )
                    .with_detail(option.text.clone())));
                }
            }
        }
        SceneNode::Narration(_) => {}
    }
}

/// 检查入场跳转环（每个环只报告一次）
fn check_entry_cycles(novel: &Novel, result: &mut DiagnosticResult) {
    let mut reported: HashSet<Vec<&str>> = HashSet::new();

    for scene in novel.scenes() {
        let mut chain = vec![scene.id.as_str()];
        let mut current = scene;

        while let Some(target) = current.entry_jump() {
            if let Some(pos) = chain.iter().position(|id| *id == target) {
                let cycle = &chain[pos..];
                let mut key = cycle.to_vec();
                key.sort_unstable();
                if reported.insert(key) {
                    result.push(Diagnostic::error(
                        cycle[0],
                        format!("入场跳转成环: {} -> {}", cycle.join(" -> "), target),
                    ));
                }
                break;
            }
            let Some(next) = novel.scene(target) else {
                break;
            };
            chain.push(target);
            current = next;
        }
    }
}

/// 从起始场景出发可到达的场景（经由跳转和选项）
fn reachable_scenes<'a>(novel: &'a Novel, start_scene_id: &'a str) -> HashSet<&'a str> {
    let mut reachable = HashSet::from([start_scene_id]);
    let mut queue = VecDeque::from([start_scene_id]);

    while let Some(scene_id) = queue.pop_front() {
        let Some(scene) = novel.scene(scene_id) else {
            continue;
        };
        for node in &scene.nodes {
            let targets: Vec<&str> = match node {
                SceneNode::Jump(jump) => vec![jump.target_scene_id.as_str()],
                SceneNode::Choice(choice) => choice
                    .options
                    .iter()
                    .map(|o| o.target_scene_id.as_str())
                    .collect(),
                _ => Vec::new(),
            };
            for target in targets {
                if reachable.insert(target) {
                    queue.push_back(target);
                }
            }
        }
    }

    reachable
}
