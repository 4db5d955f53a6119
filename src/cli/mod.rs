//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数。
//!
//! ## 参数结构
//! - 第一个位置参数：被测可执行文件路径（相对于当前目录）
//! - 其余位置参数：原样转发给 `a2` 与 `default` 两种模式
//! - 本工具自身的选项必须写在可执行文件之前
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 转换为 `config::RunConfig`

use crate::config::{DEFAULT_INPUTS_DIR, DEFAULT_OUTPUTS_DIR, DEFAULT_RELOCATE_SUFFIX};

use clap::{ArgAction, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// dcc-regress - 被测程序批量调用工具
#[derive(Parser, Debug)]
#[command(name = "dcc-regress")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(disable_version_flag = true, disable_help_flag = true)]
#[command(
    about = "Run an executable under test over every input file in three output modes",
    long_about = None
)]
pub struct Cli {
    /// Path to the executable under test (resolved against the current directory)
    pub executable: PathBuf,

    /// Extra flags forwarded verbatim to the a2 and default invocations
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub extra_args: Vec<OsString>,

    // ─────────────────────────────────────────────────────────────
    // Layout
    // ─────────────────────────────────────────────────────────────
    /// Directory containing the input files
    #[arg(long, env = "REGRESS_INPUTS", default_value = DEFAULT_INPUTS_DIR)]
    pub inputs: PathBuf,

    /// Directory receiving the artifacts (cleared at the start of each run)
    #[arg(long, env = "REGRESS_OUTPUTS", default_value = DEFAULT_OUTPUTS_DIR)]
    pub outputs: PathBuf,

    // ─────────────────────────────────────────────────────────────
    // Input selection
    // ─────────────────────────────────────────────────────────────
    /// Only process inputs whose file name matches (comma-separated globs, e.g. '*.exe,*.EXE')
    #[arg(long)]
    pub pattern: Option<String>,

    /// Recurse into subdirectories of the input directory
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Inputs whose name ends with this suffix are moved to the output directory after the run
    #[arg(long, default_value = DEFAULT_RELOCATE_SUFFIX)]
    pub relocate_suffix: String,

    // ─────────────────────────────────────────────────────────────
    // Execution control
    // ─────────────────────────────────────────────────────────────
    /// Kill an invocation after this many seconds (0 = no timeout)
    #[arg(long, env = "REGRESS_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Write one CSV row per invocation to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, default_value_t = false)]
    pub no_color: bool,

    // -h / -V 留给被测程序（dcc 的 -V 为 very verbose），本工具只接受长选项
    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Print version
    #[arg(long, action = ArgAction::Version)]
    pub version: Option<bool>,
}
