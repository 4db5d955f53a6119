//! # 迁移阶段
//!
//! 全部调用结束后重新枚举输入目录（仅顶层），
//! 将名称以指定后缀结尾的条目移动到输出目录。
//!
//! 枚举与移动之间消失的条目会被跳过，因此重复运行不会在此阶段报错。
//!
//! ## 依赖关系
//! - 被 `commands/regress.rs` 调用
//! - 无外部 crate 依赖

use crate::error::{RegressError, Result};

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 一次迁移记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// 将输入目录中以 `suffix` 结尾的条目移动到输出目录
///
/// 目标位置已有同名条目（例如 default 模式产物）时会被覆盖。
pub fn relocate_by_suffix(
    inputs_dir: &Path,
    outputs_dir: &Path,
    suffix: &str,
) -> Result<Vec<Relocation>> {
    let entries = fs::read_dir(inputs_dir).map_err(|e| RegressError::FileReadError {
        path: inputs_dir.display().to_string(),
        source: e,
    })?;

    let mut candidates: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RegressError::FileReadError {
            path: inputs_dir.display().to_string(),
            source: e,
        })?;
        if entry.file_name().to_string_lossy().ends_with(suffix) {
            candidates.push(entry.path());
        }
    }
    candidates.sort();

    let mut moved = Vec::with_capacity(candidates.len());
    for from in candidates {
        let Some(name) = from.file_name() else {
            continue;
        };
        let to = outputs_dir.join(name);
        if move_entry(&from, &to)? {
            moved.push(Relocation { from, to });
        }
    }

    Ok(moved)
}

/// 移动单个条目，源已不存在时返回 `Ok(false)`
fn move_entry(from: &Path, to: &Path) -> Result<bool> {
    let move_err = |e: std::io::Error| RegressError::MoveFailed {
        from: from.display().to_string(),
        to: to.display().to_string(),
        source: e,
    };

    if fs::symlink_metadata(from).is_err() {
        return Ok(false);
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound && fs::symlink_metadata(from).is_err() => {
            Ok(false)
        }
        Err(e) => {
            // 跨文件系统时 rename 失败，退回到复制后删除（仅限普通文件）
            if !from.is_file() {
                return Err(move_err(e));
            }
            fs::copy(from, to).map_err(move_err)?;
            fs::remove_file(from).map_err(move_err)?;
            Ok(true)
        }
    }
}
