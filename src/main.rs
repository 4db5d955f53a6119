//! # dcc-regress - 被测程序批量调用工具
//!
//! 对 `./tests/inputs` 中的每个条目，以三种输出模式调用被测的反编译器 / 汇编器，
//! 产物写入 `./tests/outputs`，最后将 `.b` 结尾的输入迁移到输出目录。
//! 不做期望输出比对，也不判定成败。
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── config.rs   (运行配置)
//!   ├── commands/   (运行流程)
//!   │     ├── batch/    (清空、收集、执行、迁移)
//!   │     └── invoke/   (模式、参数构造、子进程)
//!   ├── utils/      (输出、进度条、报告)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod config;
mod error;
mod invoke;
mod utils;

use clap::Parser;
use cli::Cli;
use config::RunConfig;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let result = RunConfig::try_from(cli).and_then(commands::run);

    if let Err(e) = result {
        utils::output::print_error(&format_chain(&e));
        std::process::exit(1);
    }
}

/// 拼接错误及其 source 链
fn format_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(&format!("\n  caused by: {}", cause));
        source = cause.source();
    }
    msg
}
