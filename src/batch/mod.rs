//! # 批量处理模块
//!
//! 一次运行的各个阶段。
//!
//! ## 功能
//! - 清空（或创建）输出目录
//! - 收集输入条目
//! - 顺序调用被测程序
//! - 迁移指定后缀的输入文件
//!
//! ## 依赖关系
//! - 被 `commands/regress.rs` 使用
//! - 使用 `walkdir` / `glob` 收集输入
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod relocate;
pub mod runner;
pub mod workspace;

pub use collector::InputCollector;
pub use relocate::{relocate_by_suffix, Relocation};
pub use runner::{BatchResult, BatchRunner, FileReport, RunEvent};
pub use workspace::prepare_output_dir;
