//! # status 子命令 CLI 定义
//!
//! 显示各计算目录的分类结果
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/status.rs`

use super::common::ScanArgs;
use crate::models::ReportFormat;
use clap::Args;

/// status 子命令参数
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Print the grouped report to stdout in this format instead of tables
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,
}
