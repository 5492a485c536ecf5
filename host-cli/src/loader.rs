//! 作品加载
//!
//! 从 JSON 文件读取作品，并补上缺省的起始场景。

use std::fs;
use std::path::{Path, PathBuf};

use novel_runtime::{ContentError, Novel};
use thiserror::Error;
use tracing::info;

/// 作品加载错误
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("无法读取作品文件 {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Content(#[from] ContentError),

    /// 没有任何场景
    #[error("作品 '{novel_id}' 没有任何场景")]
    Empty { novel_id: String },
}

/// 从文件加载作品
pub fn load_novel(path: impl AsRef<Path>) -> Result<Novel, LoadError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let novel = parse_novel(&json)?;
    info!(
        path = ?path,
        novel = %novel.id,
        scenes = novel.scenes().count(),
        "作品加载成功"
    );
    Ok(novel)
}

/// 解析作品 JSON
///
/// 未设置起始场景时使用第一章的第一个场景。
pub fn parse_novel(json: &str) -> Result<Novel, LoadError> {
    let mut novel = Novel::from_json(json)?;

    let Some(first_scene_id) = novel.first_scene_id().map(str::to_string) else {
        return Err(LoadError::Empty { novel_id: novel.id });
    };
    if novel.start_scene_id.is_empty() {
        info!(scene = %first_scene_id, "未设置起始场景，使用第一个场景");
        novel.start_scene_id = first_scene_id;
    }

    Ok(novel)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOVEL: &str = r#"{
        "id": "n", "title": "t",
        "chapters": [{ "id": "c", "title": "c", "scenes": [
            { "id": "first", "name": "1", "nodes": [{ "id": "a", "type": "narration", "text": "." }] },
            { "id": "second", "name": "2", "nodes": [{ "id": "b", "type": "narration", "text": "." }] }
        ] }]
    }"#;

    #[test]
    fn test_defaults_start_scene() {
        let novel = parse_novel(NOVEL).unwrap();
        assert_eq!(novel.start_scene_id, "first");
    }

    #[test]
    fn test_keeps_explicit_start_scene() {
        let json = NOVEL.replacen(r#""title": "t","#, r#""title": "t", "startSceneId": "second","#, 1);
        let novel = parse_novel(&json).unwrap();
        assert_eq!(novel.start_scene_id, "second");
    }

    #[test]
    fn test_rejects_empty_and_malformed() {
        assert!(matches!(
            parse_novel(r#"{ "id": "n", "title": "t", "chapters": [] }"#),
            Err(LoadError::Empty { novel_id }) if novel_id == "n"
        ));
        assert!(matches!(parse_novel("[]"), Err(LoadError::Content(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_novel(dir.path().join("none.json"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
