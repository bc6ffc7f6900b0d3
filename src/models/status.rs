//! # 分类状态数据模型
//!
//! 每个计算目录恰好属于 PENDING / NOT_CONVERGED / DONE 之一。
//! `StatusReport` 是一次扫描的快照，可随时从磁盘重新推导，不具权威性。
//!
//! 报告按状态分组时固定输出三个键：`pending`、`not_converged`、`finished`，
//! 每个键对应按名称排序的目录列表。目录名存放在 `BTreeMap` 中，
//! 同一磁盘状态下序列化结果逐字节一致。
//!
//! ## 依赖关系
//! - 被 `workflow/classifier.rs` 构造
//! - 被 `commands/`、`workflow/driver.rs` 使用
//! - 使用 `serde_json`、`serde_yaml` 序列化

use crate::error::{Result, WflError};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// 计算状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkStatus {
    /// 尚未产生 OUTCAR
    Pending,
    /// 有输出但未收敛（或输出无法解析）
    NotConverged,
    /// 已收敛
    Done,
}

impl WorkStatus {
    pub const ALL: [WorkStatus; 3] = [
        WorkStatus::Pending,
        WorkStatus::NotConverged,
        WorkStatus::Done,
    ];

    /// 是否需要重新提交
    pub fn needs_rerun(&self) -> bool {
        !matches!(self, WorkStatus::Done)
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkStatus::Pending => write!(f, "PENDING"),
            WorkStatus::NotConverged => write!(f, "NOT_CONVERGED"),
            WorkStatus::Done => write!(f, "DONE"),
        }
    }
}

/// 单个目录的分类详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderStatus {
    pub status: WorkStatus,

    /// 人类可读的判定原因
    pub reason: String,

    /// 最后一个离子步的合力
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forces_sum: Option<[f64; 3]>,

    /// 最后两个离子步的能量差 (eV)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_delta: Option<f64>,
}

impl FolderStatus {
    fn new(status: WorkStatus, reason: impl Into<String>) -> Self {
        FolderStatus {
            status,
            reason: reason.into(),
            forces_sum: None,
            energy_delta: None,
        }
    }

    pub fn pending(reason: impl Into<String>) -> Self {
        Self::new(WorkStatus::Pending, reason)
    }

    pub fn not_converged(reason: impl Into<String>) -> Self {
        Self::new(WorkStatus::NotConverged, reason)
    }

    pub fn done(reason: impl Into<String>) -> Self {
        Self::new(WorkStatus::Done, reason)
    }

    pub fn with_forces_sum(mut self, sum: [f64; 3]) -> Self {
        self.forces_sum = Some(sum);
        self
    }

    pub fn with_energy_delta(mut self, delta: f64) -> Self {
        self.energy_delta = Some(delta);
        self
    }
}

/// 按状态分组的报告主体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBuckets {
    pub pending: Vec<String>,
    pub not_converged: Vec<String>,
    pub finished: Vec<String>,
}

/// 报告序列化格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// JSON (structured interchange)
    Json,
    /// YAML (hierarchical key-value text)
    Yaml,
}

impl ReportFormat {
    /// 根据扩展名 (.json / .yaml / .yml) 推断格式
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(ReportFormat::Json),
            "yaml" | "yml" => Ok(ReportFormat::Yaml),
            _ => Err(WflError::UnsupportedFormat(format!(
                "'{}' (use .json, .yaml or .yml)",
                path.display()
            ))),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// 报告的组织方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum KeyBy {
    /// {pending: [...], not_converged: [...], finished: [...]}
    #[default]
    Status,
    /// {folder: STATUS}
    Folder,
}

/// 一次扫描的分类快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusReport {
    details: BTreeMap<String, FolderStatus>,
}

impl StatusReport {
    pub fn new(details: BTreeMap<String, FolderStatus>) -> Self {
        StatusReport { details }
    }

    /// 全部目录详情，按名称排序
    pub fn details(&self) -> &BTreeMap<String, FolderStatus> {
        &self.details
    }

    pub fn len(&self) -> usize {
        self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    pub fn status_of(&self, folder: &str) -> Option<WorkStatus> {
        self.details.get(folder).map(|d| d.status)
    }

    /// 指定状态的目录，按名称排序
    pub fn list(&self, status: WorkStatus) -> Vec<String> {
        self.details
            .iter()
            .filter(|(_, d)| d.status == status)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn list_pending(&self) -> Vec<String> {
        self.list(WorkStatus::Pending)
    }

    pub fn list_incomplete(&self) -> Vec<String> {
        self.list(WorkStatus::NotConverged)
    }

    pub fn list_done(&self) -> Vec<String> {
        self.list(WorkStatus::Done)
    }

    pub fn buckets(&self) -> StatusBuckets {
        StatusBuckets {
            pending: self.list_pending(),
            not_converged: self.list_incomplete(),
            finished: self.list_done(),
        }
    }

    /// 需要重新提交的目录：PENDING ∪ NOT_CONVERGED，排序且无重复
    pub fn to_rerun(&self) -> Vec<String> {
        // BTreeMap 的键本身唯一且有序
        self.details
            .iter()
            .filter(|(_, d)| d.status.needs_rerun())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// 各状态所占比例；没有目录时全部为 0.0
    pub fn summary(&self) -> Vec<(WorkStatus, f64)> {
        let total = self.details.len();
        WorkStatus::ALL
            .iter()
            .map(|&status| {
                let count = self.details.values().filter(|d| d.status == status).count();
                let fraction = if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64
                };
                (status, fraction)
            })
            .collect()
    }

    /// 序列化为字符串
    pub fn dumps(&self, format: ReportFormat, key_by: KeyBy) -> Result<String> {
        match key_by {
            KeyBy::Status => serialize(&self.buckets(), format),
            KeyBy::Folder => {
                let by_folder: BTreeMap<&str, WorkStatus> = self
                    .details
                    .iter()
                    .map(|(name, d)| (name.as_str(), d.status))
                    .collect();
                serialize(&by_folder, format)
            }
        }
    }

    /// 写入文件，格式由扩展名决定
    pub fn dump(&self, path: &Path, key_by: KeyBy) -> Result<()> {
        let format = ReportFormat::from_path(path)?;
        let content = self.dumps(format, key_by)?;
        fs::write(path, content).map_err(|e| WflError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })
    }
}

impl FromIterator<(String, FolderStatus)> for StatusReport {
    fn from_iter<I: IntoIterator<Item = (String, FolderStatus)>>(iter: I) -> Self {
        StatusReport::new(iter.into_iter().collect())
    }
}

fn serialize<T: Serialize>(value: &T, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => {
            let mut s = serde_json::to_string_pretty(value)?;
            s.push('\n');
            Ok(s)
        }
        ReportFormat::Yaml => Ok(serde_yaml::to_string(value)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StatusReport {
        [
            ("c".to_string(), FolderStatus::not_converged("force")),
            ("a".to_string(), FolderStatus::pending("OUTCAR missing")),
            (
                "b".to_string(),
                FolderStatus::done("Forces converged").with_forces_sum([0.0; 3]),
            ),
            ("d".to_string(), FolderStatus::pending("OUTCAR missing")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_buckets_are_sorted() {
        let b = sample().buckets();
        assert_eq!(b.pending, vec!["a", "d"]);
        assert_eq!(b.not_converged, vec!["c"]);
        assert_eq!(b.finished, vec!["b"]);
    }

    #[test]
    fn test_to_rerun_is_sorted_union() {
        assert_eq!(sample().to_rerun(), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_summary_fractions() {
        let summary = sample().summary();
        assert_eq!(summary[0], (WorkStatus::Pending, 0.5));
        assert_eq!(summary[1], (WorkStatus::NotConverged, 0.25));
        assert_eq!(summary[2], (WorkStatus::Done, 0.25));

        let empty = StatusReport::default().summary();
        assert!(empty.iter().all(|(_, f)| *f == 0.0));
    }

    #[test]
    fn test_json_and_yaml_agree() {
        let report = sample();
        let json = report.dumps(ReportFormat::Json, KeyBy::Status).unwrap();
        let yaml = report.dumps(ReportFormat::Yaml, KeyBy::Status).unwrap();

        let from_json: StatusBuckets = serde_json::from_str(&json).unwrap();
        let from_yaml: StatusBuckets = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(from_json, from_yaml);
        assert_eq!(from_json, report.buckets());
    }

    #[test]
    fn test_empty_report_keeps_three_keys() {
        let json = StatusReport::default()
            .dumps(ReportFormat::Json, KeyBy::Status)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        for key in ["pending", "not_converged", "finished"] {
            assert_eq!(value[key], serde_json::json!([]));
        }
    }

    #[test]
    fn test_dump_is_byte_reproducible() {
        let a = sample().dumps(ReportFormat::Yaml, KeyBy::Status).unwrap();
        let b = sample().dumps(ReportFormat::Yaml, KeyBy::Status).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_by_folder() {
        let json = sample().dumps(ReportFormat::Json, KeyBy::Folder).unwrap();
        let map: BTreeMap<String, WorkStatus> = serde_json::from_str(&json).unwrap();
        assert_eq!(map["a"], WorkStatus::Pending);
        assert_eq!(map["b"], WorkStatus::Done);
        assert!(json.contains("\"NOT_CONVERGED\""));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ReportFormat::from_path(Path::new("status.JSON")).unwrap(),
            ReportFormat::Json
        );
        assert_eq!(
            ReportFormat::from_path(Path::new("status.yml")).unwrap(),
            ReportFormat::Yaml
        );
        assert!(ReportFormat::from_path(Path::new("status.txt")).is_err());
    }
}
