//! # SaveStore 模块
//!
//! 基于文件的存档存储，每个键一个文件。
//!
//! ## 文件布局
//!
//! ```text
//! saves/
//! ├── novel_save_demo.json
//! ├── novel_save_other.json
//! └── ...
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use novel_runtime::{SaveError, SaveStore};
use tracing::debug;

/// 文件存档存储
#[derive(Debug, Clone)]
pub struct FileSaveStore {
    /// 存档目录
    saves_dir: PathBuf,
}

impl FileSaveStore {
    /// 创建文件存储
    ///
    /// 目录在第一次写入时创建。
    pub fn new(saves_dir: impl AsRef<Path>) -> Self {
        Self {
            saves_dir: saves_dir.as_ref().to_path_buf(),
        }
    }

    /// 确保存档目录存在
    pub fn ensure_dir(&self) -> Result<(), SaveError> {
        if !self.saves_dir.exists() {
            fs::create_dir_all(&self.saves_dir)
                .map_err(|e| SaveError::Storage(format!("无法创建存档目录: {}", e)))?;
        }
        Ok(())
    }

    /// 键对应的文件路径
    ///
    /// 键只允许字母、数字、`-`、`_`、`.`，且不能以 `.` 开头，
    /// 保证文件落在存档目录内。
    pub fn path_for(&self, key: &str) -> Result<PathBuf, SaveError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(SaveError::InvalidKey(key.to_string()));
        }
        Ok(self.saves_dir.join(format!("{key}.json")))
    }

    pub fn saves_dir(&self) -> &Path {
        &self.saves_dir
    }
}

impl SaveStore for FileSaveStore {
    fn get(&self, key: &str) -> Result<Option<String>, SaveError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let blob = fs::read_to_string(&path)
            .map_err(|e| SaveError::Storage(format!("无法读取存档文件: {}", e)))?;
        debug!(path = ?path, "存档读取成功");
        Ok(Some(blob))
    }

    fn set(&mut self, key: &str, blob: String) -> Result<(), SaveError> {
        let path = self.path_for(key)?;
        self.ensure_dir()?;

        fs::write(&path, blob)
            .map_err(|e| SaveError::Storage(format!("无法写入存档文件: {}", e)))?;
        debug!(path = ?path, "存档写入成功");
        Ok(())
    }

    fn has(&self, key: &str) -> bool {
        self.path_for(key).is_ok_and(|path| path.exists())
    }

    fn remove(&mut self, key: &str) -> Result<(), SaveError> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| SaveError::Storage(format!("无法删除存档文件: {}", e)))?;
            debug!(path = ?path, "存档删除成功");
        }
        Ok(())
    }
}
