//! # 命令执行模块
//!
//! 实现一次完整运行的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `config/`, `batch/`, `utils/`
//! - 子模块: regress

pub mod regress;

use crate::config::RunConfig;
use crate::error::Result;

/// 执行命令
pub fn run(config: RunConfig) -> Result<()> {
    regress::execute(config)
}
