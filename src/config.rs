//! # 运行配置
//!
//! 将固定的目录布局表达为可覆盖的配置结构，便于在临时目录中隔离测试。
//!
//! ## 依赖关系
//! - 由 `cli::Cli` 转换而来
//! - 被 `commands/` 与 `batch/` 使用

use crate::cli::Cli;
use crate::error::{RegressError, Result};

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// 默认输入目录
pub const DEFAULT_INPUTS_DIR: &str = "./tests/inputs";
/// 默认输出目录
pub const DEFAULT_OUTPUTS_DIR: &str = "./tests/outputs";
/// 默认迁移后缀
pub const DEFAULT_RELOCATE_SUFFIX: &str = ".b";

/// 一次运行的完整配置
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// 被测可执行文件
    pub executable: PathBuf,
    /// 转发给 a2 / default 模式的额外参数
    pub extra_args: Vec<OsString>,
    /// 输入目录
    pub inputs_dir: PathBuf,
    /// 输出目录
    pub outputs_dir: PathBuf,
    /// 文件名匹配模式（为空表示全部）
    pub patterns: Vec<String>,
    /// 是否递归扫描输入目录
    pub recursive: bool,
    /// 运行结束后迁移到输出目录的文件后缀
    pub relocate_suffix: String,
    /// 单次调用超时
    pub timeout: Option<Duration>,
    /// CSV 报告路径
    pub report: Option<PathBuf>,
}

impl RunConfig {
    /// 使用默认目录布局创建配置
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: resolve_executable(&executable.into()),
            extra_args: Vec::new(),
            inputs_dir: PathBuf::from(DEFAULT_INPUTS_DIR),
            outputs_dir: PathBuf::from(DEFAULT_OUTPUTS_DIR),
            patterns: Vec::new(),
            recursive: false,
            relocate_suffix: DEFAULT_RELOCATE_SUFFIX.to_string(),
            timeout: None,
            report: None,
        }
    }

    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_inputs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.inputs_dir = dir.into();
        self
    }

    pub fn with_outputs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.outputs_dir = dir.into();
        self
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.patterns = pattern
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_relocate_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.relocate_suffix = suffix.into();
        self
    }

    /// 设置超时，`Duration::ZERO` 视为不限时
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn with_report(mut self, report: Option<PathBuf>) -> Self {
        self.report = report;
        self
    }

    /// 检查配置是否合法
    ///
    /// 输入目录不能与输出目录相同，也不能位于输出目录之下，
    /// 否则清空输出目录会连同输入一起删除。
    pub fn validate(&self) -> Result<()> {
        if self.relocate_suffix.is_empty() {
            return Err(RegressError::InvalidArgument(
                "relocate suffix must not be empty".to_string(),
            ));
        }
        if self.executable.as_os_str().is_empty() {
            return Err(RegressError::InvalidArgument(
                "executable path must not be empty".to_string(),
            ));
        }

        let inputs = normalize(&self.inputs_dir);
        let outputs = normalize(&self.outputs_dir);
        if inputs.starts_with(&outputs) {
            return Err(RegressError::InvalidArgument(format!(
                "inputs '{}' would be wiped with outputs '{}'",
                self.inputs_dir.display(),
                self.outputs_dir.display()
            )));
        }
        Ok(())
    }
}

/// 规范化路径；尚不存在的尾部分量接在最近的已存在祖先之后
fn normalize(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, name| acc.join(name));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
            }
            _ => return path.to_path_buf(),
        }
    }
}

impl TryFrom<Cli> for RunConfig {
    type Error = RegressError;

    fn try_from(cli: Cli) -> Result<Self> {
        let mut config = RunConfig::new(cli.executable)
            .with_extra_args(cli.extra_args)
            .with_inputs_dir(cli.inputs)
            .with_outputs_dir(cli.outputs)
            .recursive(cli.recursive)
            .with_relocate_suffix(cli.relocate_suffix)
            .with_timeout(cli.timeout.map(Duration::from_secs))
            .with_report(cli.report);

        if let Some(pattern) = cli.pattern.as_deref() {
            config = config.with_pattern(pattern);
        }

        config.validate()?;
        Ok(config)
    }
}

/// 单段的裸文件名相对当前目录解析，不走 `PATH` 查找
pub fn resolve_executable(path: &Path) -> PathBuf {
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Path::new(".").join(path),
        _ => path.to_path_buf(),
    }
}
