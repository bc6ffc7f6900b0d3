//! # 计算目录分类器
//!
//! 每次调用都从磁盘重新推导每个目录的状态，不保存任何缓存：
//!
//! 1. 没有 OUTCAR → PENDING
//! 2. 按收敛判据检查：
//!    - `force`（默认）：OUTCAR 最后一个力表的合力每个分量都不超过容差
//!    - `energy`：OSZICAR 最后两个离子步的 |ΔF| 小于阈值
//! 3. 判据所需文件缺失或无法解析 → NOT_CONVERGED
//! 4. 判据满足 → DONE，否则 NOT_CONVERGED
//!
//! 单个目录的解析失败只影响该目录的状态，不会中断扫描。
//!
//! ## 依赖关系
//! - 被 `workflow/collector.rs`, `workflow/driver.rs`, `commands/` 使用
//! - 使用 `batch/` 发现并并行处理目录
//! - 使用 `parsers/force.rs`, `parsers/oszicar.rs`

use crate::batch::{BatchRunner, WorkdirFinder};
use crate::error::{ParseFailure, Result};
use crate::models::workdir::OUTCAR;
use crate::models::{FolderStatus, KeyBy, ReportFormat, StatusReport, Workdir};
use crate::parsers::force::DEFAULT_FORCE_ATOL;
use crate::parsers::oszicar::{last_energy_delta, DEFAULT_ENERGY_THRESHOLD};
use crate::parsers::{ForceParser, OszicarParser, WorkdirParser};
use crate::utils::output;

use clap::ValueEnum;
use std::fmt;
use std::path::Path;

/// 收敛判据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConvergencePolicy {
    /// Net force of the last OUTCAR force table is zero
    #[default]
    Force,
    /// |F(last) - F(previous)| from OSZICAR is below the threshold
    Energy,
}

impl fmt::Display for ConvergencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvergencePolicy::Force => write!(f, "force"),
            ConvergencePolicy::Energy => write!(f, "energy"),
        }
    }
}

/// 分类器配置
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub policy: ConvergencePolicy,
    /// 合力每个分量的绝对容差 (eV/Å)
    pub force_atol: f64,
    /// 能量差阈值 (eV)
    pub energy_threshold: f64,
    /// 并行作业数，0 表示全部 CPU
    pub jobs: usize,
    /// 递归搜索含 VASP 输入文件的目录
    pub recursive: bool,
    /// 目录名忽略模式
    pub ignore: Vec<String>,
    /// 不打印逐目录诊断
    pub quiet: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            policy: ConvergencePolicy::Force,
            force_atol: DEFAULT_FORCE_ATOL,
            energy_threshold: DEFAULT_ENERGY_THRESHOLD,
            jobs: 0,
            recursive: false,
            ignore: Vec::new(),
            quiet: false,
        }
    }
}

/// 无状态的目录分类服务
#[derive(Debug, Clone, Default)]
pub struct FolderClassifier {
    config: ClassifierConfig,
}

impl FolderClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        FolderClassifier { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// 收集 `root` 下的计算目录，按名称排序
    pub fn discover(&self, root: &Path) -> Result<Vec<Workdir>> {
        WorkdirFinder::new(root)
            .with_ignore_patterns(&self.config.ignore)?
            .recursive(self.config.recursive)
            .find()
    }

    /// 扫描 `root` 并分类全部目录
    pub fn classify(&self, root: &Path) -> Result<StatusReport> {
        let workdirs = self.discover(root)?;
        Ok(self.classify_all(&workdirs))
    }

    /// 并行分类给定目录
    pub fn classify_all(&self, workdirs: &[Workdir]) -> StatusReport {
        let statuses = BatchRunner::new(self.config.jobs)
            .map(workdirs, "Classifying", |wd| self.classify_workdir(wd));

        if !self.config.quiet {
            for (wd, st) in workdirs.iter().zip(&statuses) {
                output::print_folder_status(wd.name(), st.status, &st.reason);
            }
        }

        workdirs
            .iter()
            .map(|wd| wd.name().to_string())
            .zip(statuses)
            .collect()
    }

    /// 单个目录的状态，任何解析失败都折算为 NOT_CONVERGED
    pub fn classify_workdir(&self, workdir: &Workdir) -> FolderStatus {
        if !workdir.has(OUTCAR) {
            return FolderStatus::pending(ParseFailure::missing(OUTCAR).to_string());
        }

        match self.config.policy {
            ConvergencePolicy::Force => self.by_force(workdir),
            ConvergencePolicy::Energy => self.by_energy(workdir),
        }
    }

    /// 需要重新提交的目录，排序且无重复
    pub fn to_rerun(&self, root: &Path) -> Result<Vec<String>> {
        Ok(self.classify(root)?.to_rerun())
    }

    /// 按状态分组序列化当前状态
    pub fn dump_status(&self, root: &Path, format: ReportFormat) -> Result<String> {
        self.classify(root)?.dumps(format, KeyBy::Status)
    }

    fn by_force(&self, workdir: &Workdir) -> FolderStatus {
        let parser = ForceParser {
            atol: self.config.force_atol,
        };

        let record = match parser.parse(workdir) {
            Ok(record) => record,
            Err(e) => return FolderStatus::not_converged(e.to_string()),
        };

        let Some(sum) = record.last() else {
            return FolderStatus::not_converged("No force block found");
        };

        if record.converged {
            FolderStatus::done(format!(
                "Forces converged after {} ionic steps",
                record.steps.len()
            ))
            .with_forces_sum(sum)
        } else {
            FolderStatus::not_converged(format!(
                "Net force [{:.3e}, {:.3e}, {:.3e}] exceeds {:e}",
                sum[0], sum[1], sum[2], self.config.force_atol
            ))
            .with_forces_sum(sum)
        }
    }

    fn by_energy(&self, workdir: &Workdir) -> FolderStatus {
        let steps = match OszicarParser.parse(workdir) {
            Ok(steps) => steps,
            Err(e) => return FolderStatus::not_converged(e.to_string()),
        };

        let Some(delta) = last_energy_delta(&steps) else {
            return FolderStatus::not_converged(format!(
                "{} ionic steps in OSZICAR, need at least 2",
                steps.len()
            ));
        };

        if delta.abs() < self.config.energy_threshold {
            FolderStatus::done(format!("|dF| = {:.3e} eV", delta.abs())).with_energy_delta(delta)
        } else {
            FolderStatus::not_converged(format!(
                "|dF| = {:.3e} eV exceeds {:e}",
                delta.abs(),
                self.config.energy_threshold
            ))
            .with_energy_delta(delta)
        }
    }
}
