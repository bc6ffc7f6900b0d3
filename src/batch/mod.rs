//! # 批量处理模块
//!
//! 发现计算目录并对每个目录独立并行处理。
//!
//! ## 功能
//! - 扫描根目录的直接子目录（可选递归），排除隐藏目录和忽略模式
//! - 基于 rayon 的逐目录并行映射
//! - 进度反馈与结果统计
//!
//! ## 依赖关系
//! - 被 `workflow/` 模块使用
//! - 使用 `walkdir`, `glob` 遍历与匹配目录
//! - 使用 `rayon` 进行并行处理, `indicatif` 显示进度

pub mod finder;
pub mod runner;

pub use finder::WorkdirFinder;
pub use runner::{BatchResult, BatchRunner, ProcessResult};
