//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `workflow/`, `models/`, `utils/`
//! - 子模块: status, run, collect

pub mod collect;
pub mod run;
pub mod status;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Status(args) => status::execute_status(args),
        Commands::Rerun(args) => status::execute_rerun(args),
        Commands::Run(args) => run::execute(args),
        Commands::ReportStatus(args) => status::execute_report(args),
        Commands::CollectInfo(args) => collect::execute(args),
    }
}
