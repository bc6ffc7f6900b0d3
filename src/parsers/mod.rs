//! # 解析器模块
//!
//! 从计算目录中的 VASP 文件提取数据。每个解析器实现 [`WorkdirParser`]，
//! 对一个 [`Workdir`] 返回带标签的结果：成功值或 [`ParseFailure`]。
//! 调用方按标签匹配处理，解析失败不会越过单个目录的边界。
//!
//! ## 依赖关系
//! - 被 `workflow/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: force, oszicar, outcar, poscar

pub mod force;
pub mod oszicar;
pub mod outcar;
pub mod poscar;

pub use force::ForceParser;
pub use oszicar::OszicarParser;
pub use outcar::{EnergyParser, MagnetizationParser, MagnetizationSource};
pub use poscar::StructureParser;

use crate::error::ParseResult;
use crate::models::Workdir;

/// 计算目录解析器
///
/// 实现必须是只读的：可以在多个线程中对不同目录并行调用。
pub trait WorkdirParser: Sync {
    type Output;

    fn parse(&self, workdir: &Workdir) -> ParseResult<Self::Output>;
}
