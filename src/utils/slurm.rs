//! # Slurm 作业提交工具
//!
//! 在计算目录中调用 `sbatch` 提交运行脚本。
//!
//! ## 依赖关系
//! - 被 `workflow/driver.rs` 使用
//! - 无外部模块依赖

use crate::error::{Result, WflError};
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

/// 默认提交命令
pub const DEFAULT_SBATCH: &str = "sbatch";

/// 作业提交器
#[derive(Debug, Clone)]
pub struct Submitter {
    command: String,
}

impl Default for Submitter {
    fn default() -> Self {
        Submitter::new(DEFAULT_SBATCH)
    }
}

impl Submitter {
    pub fn new(command: impl Into<String>) -> Self {
        Submitter {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// 在 `workdir` 中提交 `script`（相对 `workdir` 的文件名），返回提交命令的标准输出
    pub fn submit(&self, workdir: &Path, script: &str) -> Result<String> {
        let output = Command::new(&self.command)
            .arg(script)
            .current_dir(workdir)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => WflError::CommandNotFound {
                    command: self.command.clone(),
                },
                _ => WflError::CommandFailed {
                    command: format!("{} {}", self.command, script),
                    stderr: e.to_string(),
                },
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(WflError::CommandFailed {
                command: format!("{} {}", self.command, script),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// 从 "Submitted batch job 12345" 中提取作业号
pub fn parse_job_id(stdout: &str) -> Option<u64> {
    stdout
        .lines()
        .filter(|l| l.contains("Submitted batch job"))
        .filter_map(|l| l.split_whitespace().last()?.parse().ok())
        .last()
}
