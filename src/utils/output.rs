//! # 美化输出工具
//!
//! 提供统一的终端输出样式，也是扫描过程中逐目录诊断信息的出口。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `workflow/` 模块使用
//! - 使用 `colored` crate

use crate::models::WorkStatus;
use colored::Colorize;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印跳过消息
pub fn print_skip(msg: &str) {
    println!("{} {}", "[SKIP]".dimmed(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印单个目录的分类诊断（stderr，stdout 留给管道）
pub fn print_folder_status(folder: &str, status: WorkStatus, reason: &str) {
    let tag = match status {
        WorkStatus::Done => "[DONE]".green().bold(),
        WorkStatus::NotConverged => "[NOT_CONVERGED]".yellow().bold(),
        WorkStatus::Pending => "[PENDING]".dimmed(),
    };
    eprintln!("{} {}: {}", tag, folder.bold(), reason);
}

/// 打印单个目录的字段提取失败（stderr）
pub fn print_folder_warning(folder: &str, reason: &str) {
    eprintln!("{} {}: {}", "[WARN]".yellow().bold(), folder.bold(), reason);
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}
