//! # 统一错误处理模块
//!
//! 定义 dcc-regress 的所有错误类型，使用 `thiserror` 派生。
//!
//! 只有环境错误（目录缺失、可执行文件缺失、权限问题）才会成为 `RegressError`；
//! 被测程序的非零退出码属于正常结果，记录在 `InvocationResult` 中。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// dcc-regress 统一错误类型
#[derive(Error, Debug)]
pub enum RegressError {
    // ─────────────────────────────────────────────────────────────
    // 目录 / 文件错误
    // ─────────────────────────────────────────────────────────────
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    #[error("Failed to read: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove: {path}")]
    RemoveFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} -> {to}")]
    MoveFailed {
        from: String,
        to: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk input directory")]
    WalkError(#[from] walkdir::Error),

    // ─────────────────────────────────────────────────────────────
    // 外部命令错误
    // ─────────────────────────────────────────────────────────────
    #[error("Executable under test not found: {path}")]
    ExecutableNotFound { path: String },

    #[error("Failed to start '{command}'")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for '{command}'")]
    WaitFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid glob pattern")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to write CSV report")]
    CsvError(#[from] csv::Error),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, RegressError>;
