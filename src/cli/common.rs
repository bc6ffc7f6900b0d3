//! # 公共扫描参数
//!
//! 所有子命令共用的目录扫描与收敛判据选项，可由环境变量提供默认值。
//!
//! ## 依赖关系
//! - 被 `cli/` 各子命令参数展开 (`#[command(flatten)]`)
//! - 转换为 `workflow/classifier.rs` 的 `ClassifierConfig`

use crate::error::{Result, WflError};
use crate::parsers::force::DEFAULT_FORCE_ATOL;
use crate::parsers::oszicar::DEFAULT_ENERGY_THRESHOLD;
use crate::workflow::{ClassifierConfig, ConvergencePolicy};

use clap::Args;
use std::path::PathBuf;

/// 扫描参数
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Root directory whose subdirectories are calculation folders
    #[arg(long, env = "VSN_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Convergence criterion
    #[arg(long, value_enum, env = "VSN_POLICY", default_value_t = ConvergencePolicy::Force)]
    pub policy: ConvergencePolicy,

    /// Absolute tolerance on each net-force component (eV/Angst)
    #[arg(long, default_value_t = DEFAULT_FORCE_ATOL)]
    pub atol: f64,

    /// Threshold on |F(last) - F(previous)| for the energy criterion (eV)
    #[arg(long, default_value_t = DEFAULT_ENERGY_THRESHOLD)]
    pub energy_threshold: f64,

    /// Number of parallel workers (0 = all CPUs)
    #[arg(short = 'j', long, default_value_t = 0)]
    pub jobs: usize,

    /// Search the whole tree for folders containing VASP input files
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Glob pattern of folder names to skip (repeatable)
    #[arg(long = "ignore", value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// Do not print per-folder diagnostics (they go to stderr otherwise)
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}

impl ScanArgs {
    /// 校验并转换为分类器配置
    pub fn config(&self) -> Result<ClassifierConfig> {
        if !(self.atol.is_finite() && self.atol >= 0.0) {
            return Err(WflError::InvalidArgument(format!(
                "--atol must be a non-negative number, got {}",
                self.atol
            )));
        }
        if !(self.energy_threshold.is_finite() && self.energy_threshold > 0.0) {
            return Err(WflError::InvalidArgument(format!(
                "--energy-threshold must be positive, got {}",
                self.energy_threshold
            )));
        }

        Ok(ClassifierConfig {
            policy: self.policy,
            force_atol: self.atol,
            energy_threshold: self.energy_threshold,
            jobs: self.jobs,
            recursive: self.recursive,
            ignore: self.ignore.clone(),
            quiet: self.quiet,
        })
    }
}
