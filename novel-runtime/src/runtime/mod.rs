//! # Runtime 模块
//!
//! 播放引擎核心，负责游标推进和演出状态管理。
//!
//! ## 模块结构
//!
//! - [`engine`]：播放解释器
//! - [`director`]：导演节点到演出状态的归约

pub mod director;
pub mod engine;

pub use director::{Director, DirectorOutput};
pub use engine::{NovelRuntime, Snapshot, Step};
