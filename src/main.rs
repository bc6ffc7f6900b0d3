//! # vsn - VASP 批量计算工作流
//!
//! 在一个根目录下管理大量 VASP 计算：判断每个目录处于 PENDING / NOT_CONVERGED / DONE
//! 哪种状态，重新提交未完成的计算，并收集已完成计算的结果。
//!
//! ## 子命令
//! - `status`        - 分类汇总表和逐目录详情
//! - `rerun`         - 列出需要重新提交的目录
//! - `run` / `all`   - 轮换 CONTCAR 并通过 sbatch 提交
//! - `report-status` - 写出 YAML/JSON 状态报告
//! - `collect-info`  - 收集已完成计算的结果表
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     └── workflow/  (分类、收集、重启轮换、驱动)
//!   │           ├── batch/    (目录发现与并行执行)
//!   │           ├── parsers/  (VASP 文件解析器)
//!   │           └── models/   (数据模型)
//!   ├── utils/      (输出、进度条、作业提交)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod utils;
mod workflow;

#[cfg(test)]
mod test_support;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
