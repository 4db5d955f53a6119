//! # 结果报告
//!
//! 运行结束后的汇总表与可选 CSV 报告。
//! 只记录每次调用的结束方式，不做成败判定。
//!
//! ## 依赖关系
//! - 被 `commands/regress.rs` 使用
//! - 使用 `tabled` 绘制终端表格，`csv` + `serde` 写出报告

use crate::batch::{BatchResult, FileReport};
use crate::error::{RegressError, Result};
use crate::invoke::{ExitOutcome, InvocationResult, Mode};

use serde::Serialize;
use std::path::Path;
use tabled::{Table, Tabled};

/// 汇总表的一行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "a1")]
    a1: String,
    #[tabled(rename = "a2")]
    a2: String,
    #[tabled(rename = "default")]
    default: String,
    #[tabled(rename = "Time (s)")]
    time: String,
}

impl From<&FileReport> for SummaryRow {
    fn from(report: &FileReport) -> Self {
        let outcome = |mode: Mode| {
            report
                .result(mode)
                .map(|r| r.outcome.to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        SummaryRow {
            file: report.name(),
            a1: outcome(Mode::A1),
            a2: outcome(Mode::A2),
            default: outcome(Mode::Default),
            time: format!("{:.2}", report.elapsed().as_secs_f64()),
        }
    }
}

/// 生成汇总表文本
pub fn summary_table(result: &BatchResult) -> String {
    let rows: Vec<SummaryRow> = result.reports.iter().map(SummaryRow::from).collect();
    Table::new(rows).to_string()
}

/// CSV 报告的一行（每次调用一行）
#[derive(Debug, Serialize)]
struct InvocationRecord {
    file: String,
    mode: &'static str,
    output: String,
    exit_code: Option<i32>,
    signal: Option<i32>,
    timed_out: bool,
    elapsed_ms: u64,
    stdout_bytes: usize,
    stderr_bytes: usize,
}

impl From<&InvocationResult> for InvocationRecord {
    fn from(result: &InvocationResult) -> Self {
        let inv = &result.invocation;
        InvocationRecord {
            file: inv.input.display().to_string(),
            mode: inv.mode.label(),
            output: inv.output.display().to_string(),
            exit_code: result.outcome.code(),
            signal: result.outcome.signal(),
            timed_out: matches!(result.outcome, ExitOutcome::TimedOut),
            elapsed_ms: result.elapsed.as_millis() as u64,
            stdout_bytes: result.stdout.len(),
            stderr_bytes: result.stderr.len(),
        }
    }
}

/// 写出 CSV 报告
pub fn write_csv(result: &BatchResult, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for report in &result.reports {
        for invocation in &report.results {
            wtr.serialize(InvocationRecord::from(invocation))?;
        }
    }

    wtr.flush().map_err(|e| RegressError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::Invocation;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn sample() -> BatchResult {
        let input = Path::new("tests/inputs/FIBO.EXE");
        let base = Path::new("tests/outputs/FIBO.EXE");
        let outcomes = [
            ExitOutcome::Exited(0),
            ExitOutcome::Exited(1),
            ExitOutcome::TimedOut,
        ];
        let results = Mode::ALL
            .iter()
            .zip(outcomes)
            .map(|(&mode, outcome)| InvocationResult {
                invocation: Invocation::new(mode, Path::new("./dcc"), &[], base, input),
                outcome,
                stdout: b"ok\n".to_vec(),
                stderr: Vec::new(),
                elapsed: Duration::from_millis(250),
            })
            .collect();

        let mut batch = BatchResult::default();
        batch.merge(FileReport {
            input: PathBuf::from(input),
            results,
        });
        batch
    }

    #[test]
    fn test_summary_table() {
        let table = summary_table(&sample());
        assert!(table.contains("FIBO.EXE"));
        assert!(table.contains("exit 0"));
        assert!(table.contains("exit 1"));
        assert!(table.contains("timeout"));
        assert!(table.contains("0.75"));
    }

    #[test]
    fn test_write_csv() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.csv");
        write_csv(&sample(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "file,mode,output,exit_code,signal,timed_out,elapsed_ms,stdout_bytes,stderr_bytes"
        );
        assert_eq!(
            lines[1],
            "tests/inputs/FIBO.EXE,a1,tests/outputs/FIBO.EXE.a1,0,,false,250,3,0"
        );
        assert!(lines[3]
            .starts_with("tests/inputs/FIBO.EXE,default,tests/outputs/FIBO.EXE,,,true,"));
    }
}
