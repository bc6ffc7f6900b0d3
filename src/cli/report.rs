//! # report-status 子命令 CLI 定义
//!
//! 把分类结果写入 YAML/JSON 报告
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/status.rs`

use super::common::ScanArgs;
use crate::models::KeyBy;
use clap::Args;
use std::path::PathBuf;

/// report-status 子命令参数
#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Report file (.yaml, .yml or .json), relative to --root
    #[arg(short, long, default_value = "status.yaml")]
    pub output: PathBuf,

    /// Group folders by status or map each folder to its status
    #[arg(long, value_enum, default_value_t = KeyBy::Status)]
    pub key_by: KeyBy,
}
