//! # 批量执行器
//!
//! 逐个输入文件、逐个模式顺序调用被测程序。
//!
//! ## 功能
//! - 每个输入文件依次执行 a1 / a2 / default 三种模式
//! - 同步执行，前一次调用结束后才开始下一次
//! - 进度条显示
//! - 结果汇总（仅统计，不判定成败）
//!
//! ## 依赖关系
//! - 被 `commands/regress.rs` 调用
//! - 使用 `invoke/` 构造并执行调用
//! - 使用 `utils/progress.rs` 创建进度条

use crate::config::RunConfig;
use crate::error::{RegressError, Result};
use crate::invoke::{self, ExitOutcome, Invocation, InvocationResult, Mode};
use crate::utils::progress;

use indicatif::ProgressBar;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 执行过程中的事件，交给调用方输出
pub enum RunEvent<'a> {
    /// 即将启动一次调用
    Starting(&'a Invocation),
    /// 一次调用已结束
    Finished(&'a InvocationResult),
    /// 一个输入文件的全部模式已完成
    FileDone(&'a FileReport),
}

/// 单个输入文件的调用结果
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub results: Vec<InvocationResult>,
}

impl FileReport {
    /// 输入文件名
    pub fn name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.input.display().to_string())
    }

    pub fn result(&self, mode: Mode) -> Option<&InvocationResult> {
        self.results.iter().find(|r| r.invocation.mode == mode)
    }

    pub fn elapsed(&self) -> Duration {
        self.results.iter().map(|r| r.elapsed).sum()
    }
}

/// 批量执行结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    /// 各输入文件的结果，按执行顺序
    pub reports: Vec<FileReport>,
    /// 退出码为 0 的调用数
    pub zero_exit: usize,
    /// 退出码非 0 的调用数
    pub nonzero_exit: usize,
    /// 被信号终止的调用数
    pub signaled: usize,
    /// 超时的调用数
    pub timed_out: usize,
}

impl BatchResult {
    /// 合并单个文件的结果
    pub fn merge(&mut self, report: FileReport) {
        for result in &report.results {
            match result.outcome {
                ExitOutcome::Exited(0) => self.zero_exit += 1,
                ExitOutcome::Exited(_) => self.nonzero_exit += 1,
                ExitOutcome::Signaled(_) => self.signaled += 1,
                ExitOutcome::TimedOut => self.timed_out += 1,
            }
        }
        self.reports.push(report);
    }

    /// 总调用次数
    pub fn total(&self) -> usize {
        self.zero_exit + self.nonzero_exit + self.signaled + self.timed_out
    }
}

/// 批量执行器
pub struct BatchRunner {
    program: PathBuf,
    extra_args: Vec<OsString>,
    outputs_dir: PathBuf,
    timeout: Option<Duration>,
    show_progress: bool,
}

impl BatchRunner {
    /// 根据运行配置创建执行器
    pub fn new(config: &RunConfig) -> Self {
        Self {
            program: config.executable.clone(),
            extra_args: config.extra_args.clone(),
            outputs_dir: config.outputs_dir.clone(),
            timeout: config.timeout,
            show_progress: true,
        }
    }

    /// 设置是否显示进度条
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// 输出基础路径：`<输出目录>/<输入文件名>`
    pub fn output_base(&self, input: &Path) -> Result<PathBuf> {
        let name = input.file_name().ok_or_else(|| {
            RegressError::InvalidArgument(format!("input has no file name: {}", input.display()))
        })?;
        Ok(self.outputs_dir.join(name))
    }

    /// 为一个输入文件构造三种模式的调用
    pub fn invocations_for(&self, input: &Path) -> Result<Vec<Invocation>> {
        let base = self.output_base(input)?;
        Ok(Mode::ALL
            .iter()
            .map(|&mode| Invocation::new(mode, &self.program, &self.extra_args, &base, input))
            .collect())
    }

    /// 处理单个输入文件
    pub fn run_file<F>(&self, input: &Path, on_event: &mut F) -> Result<FileReport>
    where
        F: FnMut(RunEvent<'_>),
    {
        let mut results = Vec::with_capacity(Mode::ALL.len());
        for invocation in self.invocations_for(input)? {
            on_event(RunEvent::Starting(&invocation));
            let result = invoke::execute(invocation, self.timeout)?;
            on_event(RunEvent::Finished(&result));
            results.push(result);
        }

        let report = FileReport {
            input: input.to_path_buf(),
            results,
        };
        on_event(RunEvent::FileDone(&report));
        Ok(report)
    }

    /// 顺序处理文件列表
    ///
    /// 环境错误（如可执行文件缺失）会中止整个批次；
    /// 子进程的非零退出只记录，不中止。
    pub fn run<F>(&self, files: &[PathBuf], mut on_event: F) -> Result<BatchResult>
    where
        F: FnMut(RunEvent<'_>),
    {
        let pb = if self.show_progress {
            progress::create_progress_bar(files.len() as u64, "Invoking")
        } else {
            ProgressBar::hidden()
        };

        let mut batch_result = BatchResult::default();
        for file in files {
            pb.set_message(
                file.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );

            let report = self.run_file(file, &mut |event: RunEvent<'_>| {
                pb.suspend(|| on_event(event))
            });
            let report = match report {
                Ok(report) => report,
                Err(e) => {
                    pb.abandon();
                    return Err(e);
                }
            };

            batch_result.merge(report);
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(batch_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> BatchRunner {
        let config = RunConfig::new("dcc")
            .with_outputs_dir("tests/outputs")
            .with_extra_args(["-c"]);
        BatchRunner::new(&config).with_progress(false)
    }

    #[test]
    fn test_output_base_keeps_file_name() {
        let base = runner()
            .output_base(Path::new("tests/inputs/BENCHFN.EXE"))
            .unwrap();
        assert_eq!(base, PathBuf::from("tests/outputs/BENCHFN.EXE"));
    }

    #[test]
    fn test_three_invocations_per_file() {
        let invocations = runner()
            .invocations_for(Path::new("tests/inputs/foo.s"))
            .unwrap();
        let modes: Vec<Mode> = invocations.iter().map(|i| i.mode).collect();
        assert_eq!(modes, vec![Mode::A1, Mode::A2, Mode::Default]);
        assert_eq!(invocations[0].program, PathBuf::from("./dcc"));
        assert_eq!(
            invocations[2].output,
            PathBuf::from("tests/outputs/foo.s")
        );
    }

    #[test]
    fn test_batch_result_counts() {
        let runner = runner();
        let mk = |mode: Mode, outcome: ExitOutcome| InvocationResult {
            invocation: runner
                .invocations_for(Path::new("in/x"))
                .unwrap()
                .into_iter()
                .find(|i| i.mode == mode)
                .unwrap(),
            outcome,
            stdout: Vec::new(),
            stderr: Vec::new(),
            elapsed: Duration::from_millis(5),
        };

        let mut batch = BatchResult::default();
        batch.merge(FileReport {
            input: PathBuf::from("in/x"),
            results: vec![
                mk(Mode::A1, ExitOutcome::Exited(0)),
                mk(Mode::A2, ExitOutcome::Exited(2)),
                mk(Mode::Default, ExitOutcome::TimedOut),
            ],
        });

        assert_eq!(batch.total(), 3);
        assert_eq!(batch.zero_exit, 1);
        assert_eq!(batch.nonzero_exit, 1);
        assert_eq!(batch.timed_out, 1);
        assert_eq!(batch.reports[0].elapsed(), Duration::from_millis(15));
        assert_eq!(
            batch.reports[0].result(Mode::A2).unwrap().outcome,
            ExitOutcome::Exited(2)
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_does_not_stop_batch() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        let temp = TempDir::new().unwrap();
        let exe = temp.path().join("failing-dcc");
        fs::write(&exe, "#!/bin/sh\necho \"$@\" >> \"$(dirname \"$0\")/calls.log\"\nexit 1\n")
            .unwrap();
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();

        let inputs = temp.path().join("inputs");
        fs::create_dir(&inputs).unwrap();
        fs::write(inputs.join("a.s"), "").unwrap();
        fs::write(inputs.join("b.s"), "").unwrap();

        let config = RunConfig::new(&exe).with_outputs_dir(temp.path().join("outputs"));
        let files = vec![inputs.join("a.s"), inputs.join("b.s")];

        let mut finished = 0;
        let batch = BatchRunner::new(&config)
            .with_progress(false)
            .run(&files, |event| {
                if let RunEvent::Finished(_) = event {
                    finished += 1;
                }
            })
            .unwrap();

        assert_eq!(finished, 6);
        assert_eq!(batch.nonzero_exit, 6);
        let calls = fs::read_to_string(temp.path().join("calls.log")).unwrap();
        assert_eq!(calls.lines().count(), 6);
    }
}
