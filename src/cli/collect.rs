//! # collect-info 子命令 CLI 定义
//!
//! 收集已完成计算的能量、结构和磁矩
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/collect.rs`

use super::common::ScanArgs;
use clap::Args;
use std::path::PathBuf;

/// collect-info 子命令参数
#[derive(Args, Debug)]
pub struct CollectArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Output table (.csv, or .json for JSON), relative to --root
    #[arg(long, default_value = "info.csv")]
    pub filename: PathBuf,

    /// Per-atom reference energies of the elements (YAML or JSON map, e.g. `Fe: -8.3`),
    /// enables the formation_energy_per_atom column
    #[arg(long, value_name = "FILE")]
    pub references: Option<PathBuf>,
}
