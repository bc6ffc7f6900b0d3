//! # 工作流模块
//!
//! 目录分类、结果收集、重启轮换以及把它们串起来的驱动。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `batch/`, `parsers/`, `models/`, `utils/`
//! - 子模块: classifier, collector, driver, restart

pub mod classifier;
pub mod collector;
pub mod driver;
pub mod restart;

pub use classifier::{ClassifierConfig, ConvergencePolicy, FolderClassifier};
pub use collector::{CollectedTable, ResultCollector};
pub use driver::VaspWorkflow;
