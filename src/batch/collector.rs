//! # 输入收集器
//!
//! 枚举输入目录中的待处理条目。
//!
//! ## 功能
//! - 默认收集顶层全部条目（不含 `.` 与 `..`）
//! - 可选递归搜索（仅收集普通文件）
//! - glob 模式过滤文件名
//! - 按文件名排序，保证运行顺序稳定
//!
//! ## 依赖关系
//! - 被 `commands/regress.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use crate::error::{RegressError, Result};

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 输入收集器
pub struct InputCollector {
    /// 输入目录
    input: PathBuf,
    /// 匹配模式列表（为空表示全部）
    patterns: Vec<Pattern>,
    /// 是否递归
    recursive: bool,
}

impl InputCollector {
    /// 创建新的输入收集器
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            patterns: Vec::new(),
            recursive: false,
        }
    }

    /// 设置匹配模式
    pub fn with_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        self.patterns = patterns
            .iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<std::result::Result<_, _>>()?;
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的条目
    ///
    /// 输入目录不存在或不可读属于环境错误。
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        ensure_directory(&self.input)?;

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.input)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
        {
            let entry = entry?;
            if self.recursive && !entry.file_type().is_file() {
                continue;
            }
            if self.matches_patterns(entry.path()) {
                entries.push(entry.into_path());
            }
        }

        Ok(entries)
    }

    /// 检查文件名是否匹配任一模式
    fn matches_patterns(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return true;
        }

        let filename = match path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => return false,
        };

        self.patterns.iter().any(|p| p.matches(&filename))
    }
}

/// 确认路径存在且为目录
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(RegressError::DirectoryNotFound {
            path: path.display().to_string(),
        });
    }
    if !path.is_dir() {
        return Err(RegressError::NotADirectory {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    fn layout() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("foo.s"), "nop").unwrap();
        fs::write(temp.path().join("bar.b"), "nop").unwrap();
        fs::write(temp.path().join("FIBO.EXE"), "MZ").unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested").join("DHAMP.exe"), "MZ").unwrap();
        temp
    }

    #[test]
    fn test_collects_all_top_level_entries_sorted() {
        let temp = layout();
        let found = InputCollector::new(temp.path()).collect().unwrap();
        assert_eq!(names(&found), vec!["FIBO.EXE", "bar.b", "foo.s", "nested"]);
    }

    #[test]
    fn test_pattern_filter() {
        let temp = layout();
        let found = InputCollector::new(temp.path())
            .with_patterns(&["*.exe", "*.EXE"])
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(names(&found), vec!["FIBO.EXE"]);
    }

    #[test]
    fn test_recursive_yields_files_only() {
        let temp = layout();
        let found = InputCollector::new(temp.path())
            .with_patterns(&["*.exe", "*.EXE"])
            .unwrap()
            .recursive(true)
            .collect()
            .unwrap();
        assert_eq!(names(&found), vec!["FIBO.EXE", "DHAMP.exe"]);
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let err = InputCollector::new(temp.path().join("inputs"))
            .collect()
            .unwrap_err();
        assert!(matches!(err, RegressError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = InputCollector::new(".").with_patterns(&["[abc"]);
        assert!(matches!(result, Err(RegressError::InvalidPattern(_))));
    }
}
