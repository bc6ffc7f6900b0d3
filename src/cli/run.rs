//! # run 子命令 CLI 定义
//!
//! 重新提交未完成的计算（别名 `all`）
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/run.rs`

use super::common::ScanArgs;
use crate::utils::slurm::DEFAULT_SBATCH;
use clap::Args;

/// run 子命令参数
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Run a single folder (relative to --root) instead of every pending/unconverged one
    #[arg(long)]
    pub folder: Option<String>,

    /// Show what would be rotated and submitted without touching anything
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Batch submission command
    #[arg(long, env = "VSN_SBATCH", default_value = DEFAULT_SBATCH)]
    pub sbatch: String,
}
