//! # 工作流驱动
//!
//! 把分类、重启轮换、作业提交和结果收集串成命令行可用的操作。
//! 驱动本身不保存状态，每个操作都从磁盘重新分类。
//!
//! ## 功能
//! - `run` / `run_all`: 轮换 CONTCAR、提交 run.sh、写入 done.txt
//! - `report_status`: 写出状态报告
//! - `collect_info`: 收集 DONE 目录的结果表
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `workflow/classifier.rs`, `workflow/collector.rs`, `workflow/restart.rs`
//! - 使用 `batch/runner.rs` 统计结果, `utils/slurm.rs` 提交作业

use super::classifier::{ClassifierConfig, FolderClassifier};
use super::collector::{CollectedTable, ResultCollector};
use super::restart::{self, Rotation};
use crate::batch::{BatchResult, ProcessResult};
use crate::error::{Result, WflError};
use crate::models::workdir::{DONE_SENTINEL, POSCAR, RUN_SCRIPT};
use crate::models::{KeyBy, ReferenceEnergies, StatusReport, Workdir};
use crate::utils::output;
use crate::utils::slurm::{parse_job_id, Submitter};

use std::fs;
use std::path::{Path, PathBuf};

/// VASP 工作流
#[derive(Debug, Clone)]
pub struct VaspWorkflow {
    root: PathBuf,
    classifier: FolderClassifier,
    submitter: Submitter,
    references: Option<ReferenceEnergies>,
    dry_run: bool,
}

impl VaspWorkflow {
    pub fn new(root: impl Into<PathBuf>, config: ClassifierConfig) -> Self {
        VaspWorkflow {
            root: root.into(),
            classifier: FolderClassifier::new(config),
            submitter: Submitter::default(),
            references: None,
            dry_run: false,
        }
    }

    pub fn with_submitter(mut self, submitter: Submitter) -> Self {
        self.submitter = submitter;
        self
    }

    /// `collect_info` 用于形成能列的元素参考能量
    pub fn with_references(mut self, references: Option<ReferenceEnergies>) -> Self {
        self.references = references;
        self
    }

    /// 只报告将要执行的操作，不修改文件也不提交
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 当前需要重新提交的目录
    pub fn filter_folders(&self) -> Result<Vec<String>> {
        self.classifier.to_rerun(&self.root)
    }

    /// 依次处理全部待重跑目录
    pub fn run_all(&self) -> Result<BatchResult> {
        let folders = self.filter_folders()?;
        output::print_info(&format!("{} folders to (re)submit", folders.len()));

        let mut result = BatchResult::default();
        for folder in &folders {
            result.merge(self.run(folder));
        }
        Ok(result)
    }

    /// 处理单个目录：轮换 CONTCAR → 提交 run.sh → 写 done.txt
    pub fn run(&self, folder: &str) -> ProcessResult {
        let workdir = Workdir::new(&self.root, self.root.join(folder));
        let name = folder.to_string();

        if !workdir.path().is_dir() {
            output::print_error(&format!("{}: not a directory", folder));
            return ProcessResult::Failed(name, "not a directory".to_string());
        }

        if !workdir.has(POSCAR) {
            output::print_skip(&format!("POSCAR not found in {}, skipping", folder));
            return ProcessResult::Skipped(name, "POSCAR not found".to_string());
        }

        for missing in workdir.missing_inputs() {
            output::print_warning(&format!("{}: {} missing", folder, missing));
        }

        if self.dry_run {
            return self.describe(&workdir);
        }

        match self.submit(&workdir) {
            Ok(()) => {
                output::print_success(&format!("{}: submitted, {} touched", folder, DONE_SENTINEL));
                ProcessResult::Success(name)
            }
            Err(e) => {
                output::print_error(&format!("{}: {}", folder, e));
                ProcessResult::Failed(name, e.to_string())
            }
        }
    }

    fn submit(&self, workdir: &Workdir) -> Result<()> {
        match restart::rotate_contcar(workdir.path())? {
            Rotation::Rotated { backup } => output::print_info(&format!(
                "{}: POSCAR backed up as {}, CONTCAR -> POSCAR",
                workdir.name(),
                backup
            )),
            Rotation::Promoted => {
                output::print_info(&format!("{}: CONTCAR -> POSCAR", workdir.name()))
            }
            Rotation::Unchanged => {}
        }

        if workdir.has(RUN_SCRIPT) {
            let stdout = self.submitter.submit(workdir.path(), RUN_SCRIPT)?;
            match parse_job_id(&stdout) {
                Some(id) => output::print_info(&format!("{}: job {}", workdir.name(), id)),
                None if !stdout.is_empty() => {
                    output::print_info(&format!("{}: {}", workdir.name(), stdout))
                }
                None => {}
            }
        }

        let sentinel = workdir.file(DONE_SENTINEL);
        fs::write(&sentinel, "").map_err(|e| WflError::FileWriteError {
            path: sentinel.display().to_string(),
            source: e,
        })
    }

    fn describe(&self, workdir: &Workdir) -> ProcessResult {
        let name = workdir.name().to_string();
        let rotation = match restart::plan_rotation(workdir.path()) {
            Ok(r) => r,
            Err(e) => return ProcessResult::Failed(name, e.to_string()),
        };

        let mut steps = Vec::new();
        match rotation {
            Rotation::Rotated { backup } => {
                steps.push(format!("POSCAR -> {}, CONTCAR -> POSCAR", backup))
            }
            Rotation::Promoted => steps.push("CONTCAR -> POSCAR".to_string()),
            Rotation::Unchanged => {}
        }
        if workdir.has(RUN_SCRIPT) {
            steps.push(format!("{} {}", self.submitter.command(), RUN_SCRIPT));
        }
        steps.push(format!("touch {}", DONE_SENTINEL));

        output::print_info(&format!("[dry-run] {}: {}", name, steps.join("; ")));
        ProcessResult::Skipped(name, "dry run".to_string())
    }

    /// 写出状态报告，格式由扩展名决定；相对路径以根目录为基准
    pub fn report_status(&self, output_path: &Path, key_by: KeyBy) -> Result<StatusReport> {
        let report = self.classifier.classify(&self.root)?;
        let path = self.root.join(output_path);
        report.dump(&path, key_by)?;
        output::print_success(&format!("Status report written to '{}'", path.display()));
        Ok(report)
    }

    /// 收集 DONE 目录的结果并写入 `filename`（相对路径以根目录为基准）
    pub fn collect_info(&self, filename: &Path) -> Result<CollectedTable> {
        // 逐目录诊断由收集阶段打印
        let precheck = FolderClassifier::new(ClassifierConfig {
            quiet: true,
            ..self.classifier.config().clone()
        });
        for folder in precheck.to_rerun(&self.root)? {
            let sentinel = self.root.join(&folder).join(DONE_SENTINEL);
            if !sentinel.exists() {
                output::print_warning(&format!("{} does not exist", sentinel.display()));
            }
        }

        let table = ResultCollector::new(self.classifier.clone())
            .with_references(self.references.clone())
            .collect(&self.root)?;
        let path = self.root.join(filename);
        table.save(&path)?;
        output::print_success(&format!(
            "{} rows written to '{}'",
            table.len(),
            path.display()
        ));
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{converged_folder, make_folder, POSCAR_FE};
    use tempfile::tempdir;

    fn workflow(root: &Path) -> VaspWorkflow {
        VaspWorkflow::new(root, ClassifierConfig::default())
            .with_submitter(Submitter::new("definitely-not-a-real-sbatch-binary"))
    }

    #[test]
    fn test_run_rotates_and_touches_sentinel_without_script() {
        let root = tempdir().unwrap();
        let dir = make_folder(
            root.path(),
            "Fe",
            &[("POSCAR", POSCAR_FE), ("CONTCAR", "relaxed")],
        );

        let result = workflow(root.path()).run("Fe");
        assert_eq!(result, ProcessResult::Success("Fe".to_string()));
        assert_eq!(fs::read_to_string(dir.join("POSCAR")).unwrap(), "relaxed");
        assert!(dir.join("POSCAR_1").exists());
        assert!(dir.join(DONE_SENTINEL).exists());
    }

    #[test]
    fn test_run_skips_without_poscar() {
        let root = tempdir().unwrap();
        make_folder(root.path(), "empty", &[("CONTCAR", "x")]);
        let result = workflow(root.path()).run("empty");
        assert!(matches!(result, ProcessResult::Skipped(..)));
        assert!(!root.path().join("empty").join(DONE_SENTINEL).exists());
    }

    #[test]
    fn test_failed_submission_leaves_no_sentinel() {
        let root = tempdir().unwrap();
        let dir = make_folder(
            root.path(),
            "Fe",
            &[("POSCAR", POSCAR_FE), ("run.sh", "#!/bin/bash\n")],
        );
        let result = workflow(root.path()).run("Fe");
        assert!(matches!(result, ProcessResult::Failed(..)));
        assert!(!dir.join(DONE_SENTINEL).exists());
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let root = tempdir().unwrap();
        let dir = make_folder(
            root.path(),
            "Fe",
            &[("POSCAR", POSCAR_FE), ("CONTCAR", "relaxed"), ("run.sh", "")],
        );
        let result = workflow(root.path()).dry_run(true).run("Fe");
        assert!(matches!(result, ProcessResult::Skipped(..)));
        assert!(dir.join("CONTCAR").exists());
        assert!(!dir.join("POSCAR_1").exists());
        assert!(!dir.join(DONE_SENTINEL).exists());
    }

    #[test]
    fn test_run_all_only_touches_rerun_folders() {
        let root = tempdir().unwrap();
        let done = converged_folder(root.path(), "done");
        let todo = make_folder(root.path(), "todo", &[("POSCAR", POSCAR_FE)]);

        let result = workflow(root.path()).run_all().unwrap();
        assert_eq!(result.success, 1);
        assert_eq!(result.total(), 1);
        assert!(todo.join(DONE_SENTINEL).exists());
        assert!(!done.join(DONE_SENTINEL).exists());
    }

    #[test]
    fn test_report_status_writes_file() {
        let root = tempdir().unwrap();
        converged_folder(root.path(), "done");
        make_folder(root.path(), "todo", &[("POSCAR", POSCAR_FE)]);

        let report = workflow(root.path())
            .report_status(Path::new("status.json"), KeyBy::Status)
            .unwrap();
        assert_eq!(report.len(), 2);

        let text = fs::read_to_string(root.path().join("status.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["finished"], serde_json::json!(["done"]));
        assert_eq!(value["pending"], serde_json::json!(["todo"]));
    }

    #[test]
    fn test_collect_info_writes_csv() {
        let root = tempdir().unwrap();
        converged_folder(root.path(), "done");
        make_folder(root.path(), "todo", &[("POSCAR", POSCAR_FE)]);

        let table = workflow(root.path())
            .collect_info(Path::new("info.csv"))
            .unwrap();
        assert_eq!(table.len(), 1);
        let text = fs::read_to_string(root.path().join("info.csv")).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
