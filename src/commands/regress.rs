//! # 批量调用命令实现
//!
//! 对输入目录中的每个条目以三种模式调用被测程序，随后迁移指定后缀的输入。
//!
//! ## 流程
//! 1. 清空（或创建）输出目录
//! 2. 收集输入条目
//! 3. 每个条目依次执行 a1 / a2 / default，打印输出与退出状态
//! 4. 重新枚举输入目录，迁移后缀匹配的文件
//! 5. 打印汇总表，可选写出 CSV 报告
//!
//! ## 依赖关系
//! - 使用 `config.rs` 定义的运行配置
//! - 使用 `batch/` 各阶段
//! - 使用 `utils/output.rs`, `utils/report.rs`

use crate::batch::{self, BatchRunner, InputCollector, RunEvent};
use crate::config::RunConfig;
use crate::error::Result;
use crate::invoke::ExitOutcome;
use crate::utils::{output, report};

/// 执行一次完整运行
pub fn execute(config: RunConfig) -> Result<()> {
    output::print_header(&format!(
        "Regression tester {}",
        env!("CARGO_PKG_VERSION")
    ));

    batch::collector::ensure_directory(&config.inputs_dir)?;

    let removed = batch::prepare_output_dir(&config.outputs_dir)?;
    output::print_info(&format!(
        "Cleared '{}' ({} entries removed)",
        config.outputs_dir.display(),
        removed
    ));

    let inputs = InputCollector::new(&config.inputs_dir)
        .with_patterns(config.patterns.as_slice())?
        .recursive(config.recursive)
        .collect()?;

    if inputs.is_empty() {
        output::print_warning(&format!(
            "No inputs found under {}",
            config.inputs_dir.display()
        ));
    } else {
        output::print_info(&format!(
            "Invoking {} on {} input(s)",
            config.executable.display(),
            inputs.len()
        ));
    }

    let result = BatchRunner::new(&config).run(&inputs, print_event)?;

    output::print_separator();

    let moved = batch::relocate_by_suffix(
        &config.inputs_dir,
        &config.outputs_dir,
        &config.relocate_suffix,
    )?;
    if moved.is_empty() {
        output::print_skip(&format!(
            "No '*{}' inputs to relocate",
            config.relocate_suffix
        ));
    }
    for relocation in &moved {
        output::print_move(
            &relocation.from.display().to_string(),
            &relocation.to.display().to_string(),
        );
    }

    if !result.reports.is_empty() {
        println!("\n{}\n", report::summary_table(&result));
    }

    if let Some(path) = &config.report {
        report::write_csv(&result, path)?;
        output::print_success(&format!("Report written to '{}'", path.display()));
    }

    output::print_done(&format!(
        "{} invocation(s) on {} input(s): {} exit 0, {} nonzero, {} signaled, {} timed out; {} relocated",
        result.total(),
        result.reports.len(),
        result.zero_exit,
        result.nonzero_exit,
        result.signaled,
        result.timed_out,
        moved.len()
    ));

    Ok(())
}

/// 打印执行事件
fn print_event(event: RunEvent<'_>) {
    match event {
        RunEvent::Starting(invocation) => {
            output::print_command(invocation.mode.label(), &invocation.command_line());
        }
        RunEvent::Finished(result) => {
            output::print_captured(&result.stdout_text());
            output::print_captured(&result.stderr_text());

            let label = result.invocation.mode.label();
            match result.outcome {
                ExitOutcome::TimedOut => output::print_warning(&format!(
                    "Timeout while calling {}",
                    result.invocation.command_line()
                )),
                outcome => output::print_info(&format!(
                    "{}: {} ({:.2}s)",
                    label,
                    outcome,
                    result.elapsed.as_secs_f64()
                )),
            }
        }
        RunEvent::FileDone(report) => {
            output::print_done(&format!("Tests for {} done.", report.input.display()));
        }
    }
}
