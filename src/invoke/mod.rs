//! # 调用模块
//!
//! 描述对被测程序的单次调用：模式、参数列表与执行结果。
//!
//! ## 三种模式
//! - `a1`: `<exe> -a1 -o<base>.a1 <input>`
//! - `a2`: `<exe> -a2 <extra...> -o<base>.a2 <input>`
//! - `default`: `<exe> <extra...> -o<base> <input>`
//!
//! 参数始终以离散列表传给子进程，不经过 shell 拼接。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 使用
//! - 子模块: process

pub mod process;

pub use process::execute;

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 输出模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// 汇编输出格式 1
    A1,
    /// 汇编输出格式 2，附加额外参数
    A2,
    /// 默认输出，附加额外参数
    Default,
}

impl Mode {
    /// 每个输入文件依次执行的模式
    pub const ALL: [Mode; 3] = [Mode::A1, Mode::A2, Mode::Default];

    pub fn label(self) -> &'static str {
        match self {
            Mode::A1 => "a1",
            Mode::A2 => "a2",
            Mode::Default => "default",
        }
    }

    /// 产物文件名后缀
    pub fn suffix(self) -> &'static str {
        match self {
            Mode::A1 => ".a1",
            Mode::A2 => ".a2",
            Mode::Default => "",
        }
    }

    fn fixed_flag(self) -> Option<&'static str> {
        match self {
            Mode::A1 => Some("-a1"),
            Mode::A2 => Some("-a2"),
            Mode::Default => None,
        }
    }

    fn forwards_extra_args(self) -> bool {
        !matches!(self, Mode::A1)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 一次调用的完整描述
#[derive(Debug, Clone)]
pub struct Invocation {
    pub mode: Mode,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// 被测程序应写出的产物路径
    pub output: PathBuf,
    pub input: PathBuf,
}

impl Invocation {
    /// 构造指定模式下的调用
    ///
    /// `output_base` 为 `<输出目录>/<输入文件名>`，模式后缀直接拼接其后。
    pub fn new(
        mode: Mode,
        program: &Path,
        extra_args: &[OsString],
        output_base: &Path,
        input: &Path,
    ) -> Self {
        let mut output = output_base.as_os_str().to_os_string();
        output.push(mode.suffix());
        let output = PathBuf::from(output);

        let mut args = Vec::with_capacity(extra_args.len() + 3);
        if let Some(flag) = mode.fixed_flag() {
            args.push(OsString::from(flag));
        }
        if mode.forwards_extra_args() {
            args.extend(extra_args.iter().cloned());
        }
        let mut out_flag = OsString::from("-o");
        out_flag.push(output.as_os_str());
        args.push(out_flag);
        args.push(input.as_os_str().to_os_string());

        Self {
            mode,
            program: program.to_path_buf(),
            args,
            output,
            input: input.to_path_buf(),
        }
    }

    /// 仅用于显示的命令行文本
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(OsStr::to_string_lossy)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 子进程的结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// 正常退出，带退出码
    Exited(i32),
    /// 被信号终止（非 Unix 平台无信号编号）
    Signaled(Option<i32>),
    /// 超时后被强制终止
    TimedOut,
}

impl ExitOutcome {
    pub fn code(&self) -> Option<i32> {
        match self {
            ExitOutcome::Exited(code) => Some(*code),
            _ => None,
        }
    }

    pub fn signal(&self) -> Option<i32> {
        match self {
            ExitOutcome::Signaled(signal) => *signal,
            _ => None,
        }
    }

    pub fn from_status(status: std::process::ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitOutcome::Exited(code);
        }

        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        ExitOutcome::Signaled(signal)
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Exited(code) => write!(f, "exit {}", code),
            ExitOutcome::Signaled(Some(signal)) => write!(f, "signal {}", signal),
            ExitOutcome::Signaled(None) => write!(f, "terminated"),
            ExitOutcome::TimedOut => write!(f, "timeout"),
        }
    }
}

/// 单次调用的结果，不做成败判断
#[derive(Debug, Clone)]
pub struct InvocationResult {
    pub invocation: Invocation,
    pub outcome: ExitOutcome,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

impl InvocationResult {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}
