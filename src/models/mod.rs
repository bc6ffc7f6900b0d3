//! # 数据模型模块
//!
//! 定义计算目录、分类状态、晶体结构和收集结果的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`workflow/` 和 `commands/` 使用
//! - 子模块: workdir, status, structure, record, reference

pub mod record;
pub mod reference;
pub mod status;
pub mod structure;
pub mod workdir;

pub use record::CollectedRow;
pub use reference::ReferenceEnergies;
pub use status::{FolderStatus, KeyBy, ReportFormat, StatusReport, WorkStatus};
pub use structure::{Lattice, Structure};
pub use workdir::Workdir;
