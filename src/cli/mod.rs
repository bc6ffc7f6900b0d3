//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `status`: 分类汇总与逐目录详情
//! - `rerun`: 列出需要重新提交的目录
//! - `run` (`all`): 轮换 CONTCAR 并提交作业
//! - `report-status`: 写出状态报告
//! - `collect-info`: 收集已完成计算的结果表
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: common, status, run, report, collect

pub mod collect;
pub mod common;
pub mod report;
pub mod run;
pub mod status;

use clap::{Parser, Subcommand};

/// vsn - VASP 批量计算工作流
#[derive(Parser)]
#[command(name = "vsn")]
#[command(version)]
#[command(about = "Classify, rerun and collect batches of VASP calculations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Show how many folders are pending, unconverged and finished
    Status(status::StatusArgs),

    /// Print folders that need to be (re)submitted, one per line
    Rerun(common::ScanArgs),

    /// Rotate CONTCAR to POSCAR and submit run.sh in pending/unconverged folders
    #[command(visible_alias = "all")]
    Run(run::RunArgs),

    /// Write the classification report (YAML or JSON)
    ReportStatus(report::ReportArgs),

    /// Collect energies, lattices and moments of finished calculations
    CollectInfo(collect::CollectArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KeyBy;
    use crate::workflow::ConvergencePolicy;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["vsn", "report-status"]).unwrap();
        let Commands::ReportStatus(args) = cli.command else {
            panic!("wrong subcommand");
        };
        assert_eq!(args.output.to_str(), Some("status.yaml"));
        assert_eq!(args.key_by, KeyBy::Status);
        let config = args.scan.config().unwrap();
        assert_eq!(config.policy, ConvergencePolicy::Force);
        assert_eq!(config.force_atol, 1e-6);
        assert_eq!(config.energy_threshold, 1e-3);
        assert!(!config.quiet);
    }

    #[test]
    fn test_collect_references_option() {
        let cli = Cli::try_parse_from(["vsn", "collect-info", "--references", "refs.yaml"]).unwrap();
        let Commands::CollectInfo(args) = cli.command else {
            panic!("wrong subcommand");
        };
        assert_eq!(args.filename.to_str(), Some("info.csv"));
        assert_eq!(args.references.as_deref().and_then(|p| p.to_str()), Some("refs.yaml"));
    }

    #[test]
    fn test_quiet_flag() {
        let cli = Cli::try_parse_from(["vsn", "rerun", "-q"]).unwrap();
        let Commands::Rerun(args) = cli.command else {
            panic!("wrong subcommand");
        };
        assert!(args.config().unwrap().quiet);
    }

    #[test]
    fn test_all_alias_and_options() {
        let cli = Cli::try_parse_from([
            "vsn", "all", "--policy", "energy", "--ignore", "*bak*", "--dry-run",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("wrong subcommand");
        };
        assert!(args.dry_run);
        assert!(args.folder.is_none());
        assert_eq!(args.scan.policy, ConvergencePolicy::Energy);
        assert_eq!(args.scan.ignore, vec!["*bak*"]);
    }

    #[test]
    fn test_negative_atol_rejected() {
        let cli = Cli::try_parse_from(["vsn", "status", "--atol=-1"]).unwrap();
        let Commands::Status(args) = cli.command else {
            panic!("wrong subcommand");
        };
        assert!(args.scan.config().is_err());
        assert!(args.format.is_none());
    }
}
