//! # 统一错误处理模块
//!
//! 定义 vasp-wfl 的所有错误类型，使用 `thiserror` 派生。
//!
//! 两类错误：
//! - [`WflError`]: 运行级错误（读根目录、写报告失败等），向上传播并终止命令
//! - [`ParseFailure`]: 单个计算目录内的解析失败，只会被转换成分类结果或空值，
//!   永远不会中断整个批次
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// vasp-wfl 统一错误类型
#[derive(Error, Debug)]
pub enum WflError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    // ─────────────────────────────────────────────────────────────
    // 外部命令错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command '{command}' not found in PATH")]
    CommandNotFound { command: String },

    #[error("External command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, WflError>;

/// 计算目录内单个文件的解析失败
///
/// 分类器和结果收集器对它做 `match`，而不是捕获通用错误：
/// `Missing` 对应输出尚未产生，`Malformed` 对应内容存在但无法解析。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("{file} missing")]
    Missing { file: String },

    #[error("{file} malformed: {reason}")]
    Malformed { file: String, reason: String },
}

impl ParseFailure {
    pub fn missing(file: impl Into<String>) -> Self {
        ParseFailure::Missing { file: file.into() }
    }

    pub fn malformed(file: impl Into<String>, reason: impl Into<String>) -> Self {
        ParseFailure::Malformed {
            file: file.into(),
            reason: reason.into(),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ParseFailure::Missing { .. })
    }
}

/// 单目录解析结果
pub type ParseResult<T> = std::result::Result<T, ParseFailure>;
