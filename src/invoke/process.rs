//! # 子进程执行
//!
//! 同步运行一次调用并捕获 stdout / stderr。
//!
//! ## 功能
//! - 无超时：`wait_with_output` 直接等待结束
//! - 有超时：后台线程读取管道，主线程轮询 `try_wait`，到期后 kill；
//!   管道读取同样不超过期限，后代进程持有管道时只返回已读部分
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 调用
//! - 无外部 crate 依赖

use super::{ExitOutcome, Invocation, InvocationResult};
use crate::error::{RegressError, Result};

use std::io::{ErrorKind, Read};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// 运行一次调用，阻塞到子进程结束或超时
///
/// 可执行文件无法启动属于环境错误，直接返回 `Err`；
/// 非零退出码与超时都记录在返回的结果里。
pub fn execute(invocation: Invocation, timeout: Option<Duration>) -> Result<InvocationResult> {
    let started = Instant::now();

    let child = Command::new(&invocation.program)
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => RegressError::ExecutableNotFound {
                path: invocation.program.display().to_string(),
            },
            _ => RegressError::SpawnFailed {
                command: invocation.command_line(),
                source: e,
            },
        })?;

    let (outcome, stdout, stderr) = match timeout {
        None => {
            let output = child
                .wait_with_output()
                .map_err(|e| RegressError::WaitFailed {
                    command: invocation.command_line(),
                    source: e,
                })?;
            (
                ExitOutcome::from_status(output.status),
                output.stdout,
                output.stderr,
            )
        }
        Some(limit) => wait_with_timeout(child, limit, &invocation)?,
    };

    Ok(InvocationResult {
        invocation,
        outcome,
        stdout,
        stderr,
        elapsed: started.elapsed(),
    })
}

fn wait_with_timeout(
    mut child: Child,
    limit: Duration,
    invocation: &Invocation,
) -> Result<(ExitOutcome, Vec<u8>, Vec<u8>)> {
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + limit;
    let outcome = loop {
        match child.try_wait() {
            Ok(Some(status)) => break ExitOutcome::from_status(status),
            Ok(None) => {}
            Err(e) => return Err(abandon(&mut child, invocation, e)),
        }
        if Instant::now() >= deadline {
            // 进程可能恰好在此刻退出，kill 失败可以忽略
            child.kill().ok();
            child.wait().map_err(|e| RegressError::WaitFailed {
                command: invocation.command_line(),
                source: e,
            })?;
            break ExitOutcome::TimedOut;
        }
        thread::sleep(POLL_INTERVAL);
    };

    // 子进程派生的后代可能仍持有管道，读取同样受 deadline 约束
    while !(finished(stdout.as_ref()) && finished(stderr.as_ref()))
        && Instant::now() < deadline
    {
        thread::sleep(POLL_INTERVAL);
    }

    Ok((outcome, collect(stdout), collect(stderr)))
}

/// `try_wait` 失败时终止并回收子进程，再把错误交给调用方
fn abandon(child: &mut Child, invocation: &Invocation, source: std::io::Error) -> RegressError {
    child.kill().ok();
    child.wait().ok();
    RegressError::WaitFailed {
        command: invocation.command_line(),
        source,
    }
}

/// 后台读取中的管道，已读内容随时可取
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<()>,
}

/// 在后台线程中读尽管道，避免子进程因管道写满而阻塞
fn drain<R>(pipe: Option<R>) -> Option<Drain>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let handle = thread::spawn(move || {
            let mut chunk = [0u8; 4096];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => lock(&sink).extend_from_slice(&chunk[..n]),
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        });
        Drain { buf, handle }
    })
}

fn finished(drain: Option<&Drain>) -> bool {
    drain.map_or(true, |d| d.handle.is_finished())
}

/// 取出已读内容；仍在读的线程被分离，随管道关闭自行退出
fn collect(drain: Option<Drain>) -> Vec<u8> {
    match drain {
        Some(Drain { buf, handle }) => {
            if handle.is_finished() {
                handle.join().ok();
            }
            std::mem::take(&mut *lock(&buf))
        }
        None => Vec::new(),
    }
}

fn lock(buf: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    buf.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::invoke::Mode;
    use std::path::Path;

    fn sh_invocation(script: &str) -> Invocation {
        // /bin/sh -c <script> 的参数形态借用 Invocation 的字段
        Invocation {
            mode: Mode::Default,
            program: Path::new("/bin/sh").to_path_buf(),
            args: vec!["-c".into(), script.into()],
            output: Path::new("unused").to_path_buf(),
            input: Path::new("unused").to_path_buf(),
        }
    }

    #[test]
    fn test_captures_output_and_code() {
        let result = execute(sh_invocation("echo out; echo err >&2; exit 3"), None).unwrap();
        assert_eq!(result.outcome, ExitOutcome::Exited(3));
        assert_eq!(result.stdout_text(), "out\n");
        assert_eq!(result.stderr_text(), "err\n");
    }

    #[test]
    fn test_timeout_kills_child() {
        let result = execute(
            sh_invocation("exec sleep 5"),
            Some(Duration::from_millis(100)),
        )
        .unwrap();
        assert_eq!(result.outcome, ExitOutcome::TimedOut);
        assert!(result.elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_timeout_bounds_forked_grandchild() {
        // sh 先 fork 出 sleep，kill sh 后 sleep 仍持有管道
        let result = execute(
            sh_invocation("echo early; sleep 3; true"),
            Some(Duration::from_millis(200)),
        )
        .unwrap();
        assert_eq!(result.outcome, ExitOutcome::TimedOut);
        assert!(result.elapsed < Duration::from_secs(1));
        assert_eq!(result.stdout_text(), "early\n");
    }

    #[test]
    fn test_exited_child_with_lingering_grandchild() {
        let result = execute(
            sh_invocation("sleep 3 & echo parent"),
            Some(Duration::from_millis(300)),
        )
        .unwrap();
        assert_eq!(result.outcome, ExitOutcome::Exited(0));
        assert!(result.elapsed < Duration::from_secs(2));
        assert_eq!(result.stdout_text(), "parent\n");
    }

    #[test]
    fn test_wait_failure_reaps_child() {
        let inv = sh_invocation("exec sleep 5");
        let mut child = Command::new(&inv.program)
            .args(&inv.args)
            .spawn()
            .unwrap();
        let err = abandon(&mut child, &inv, std::io::Error::other("try_wait"));
        assert!(matches!(err, RegressError::WaitFailed { .. }));
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn test_fast_child_within_timeout() {
        let result = execute(sh_invocation("echo hi"), Some(Duration::from_secs(5))).unwrap();
        assert_eq!(result.outcome, ExitOutcome::Exited(0));
        assert_eq!(result.stdout_text(), "hi\n");
    }

    #[test]
    fn test_missing_executable_is_environment_error() {
        let mut inv = sh_invocation("true");
        inv.program = Path::new("./definitely-not-here").to_path_buf();
        let err = execute(inv, None).unwrap_err();
        assert!(matches!(err, RegressError::ExecutableNotFound { .. }));
    }
}
