//! # 输出目录准备
//!
//! 每次运行开始前清空输出目录：不存在则创建，存在则删除其全部内容。
//!
//! ## 依赖关系
//! - 被 `commands/regress.rs` 调用
//! - 无外部 crate 依赖

use crate::error::{RegressError, Result};

use std::fs;
use std::path::Path;

/// 创建或清空输出目录，返回删除的条目数
pub fn prepare_output_dir(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| RegressError::FileWriteError {
            path: dir.display().to_string(),
            source: e,
        })?;
        return Ok(0);
    }

    if !dir.is_dir() {
        return Err(RegressError::NotADirectory {
            path: dir.display().to_string(),
        });
    }

    let entries = fs::read_dir(dir).map_err(|e| RegressError::FileReadError {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| RegressError::FileReadError {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();

        // 符号链接只删除链接本身
        let is_dir = entry
            .file_type()
            .map(|t| t.is_dir())
            .map_err(|e| RegressError::FileReadError {
                path: path.display().to_string(),
                source: e,
            })?;

        let result = if is_dir {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| RegressError::RemoveFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        removed += 1;
    }

    Ok(removed)
}
