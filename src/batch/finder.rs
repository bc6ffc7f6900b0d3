//! # 计算目录发现
//!
//! 根据根目录收集待分类的计算目录列表。
//!
//! ## 功能
//! - 默认只扫描根目录的直接子目录，每个非隐藏子目录都是一个计算目录
//! - 递归模式遍历整棵目录树，只保留含有 VASP 输入文件的目录
//! - 以 `.` 开头的目录无条件排除（递归模式下也不会进入）
//! - 可选的 glob 忽略模式，匹配目录名
//!
//! ## 依赖关系
//! - 被 `workflow/classifier.rs` 调用
//! - 使用 `walkdir` 遍历目录, `glob` 匹配忽略模式

use crate::error::{Result, WflError};
use crate::models::Workdir;

use std::fs;
use std::path::PathBuf;
use walkdir::{DirEntry, WalkDir};

/// 隐藏目录前缀
pub const HIDDEN_PREFIX: char = '.';

/// 计算目录查找器
#[derive(Debug, Clone)]
pub struct WorkdirFinder {
    /// 根目录
    root: PathBuf,
    /// 忽略模式列表
    ignore: Vec<glob::Pattern>,
    /// 是否递归
    recursive: bool,
}

impl WorkdirFinder {
    /// 创建新的查找器
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore: Vec::new(),
            recursive: false,
        }
    }

    /// 设置忽略模式（fnmatch 语法，例如 `*backup*`）
    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Result<Self> {
        self.ignore = patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| WflError::InvalidPattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<_>>()?;
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有计算目录，按名称排序
    pub fn find(&self) -> Result<Vec<Workdir>> {
        if !self.root.is_dir() {
            return Err(WflError::DirectoryNotFound {
                path: self.root.display().to_string(),
            });
        }

        let mut workdirs = if self.recursive {
            self.walk()
        } else {
            self.children()?
        };

        workdirs.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(workdirs)
    }

    /// 根目录的直接子目录
    fn children(&self) -> Result<Vec<Workdir>> {
        let entries = fs::read_dir(&self.root).map_err(|e| WflError::FileReadError {
            path: self.root.display().to_string(),
            source: e,
        })?;

        Ok(entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter(|e| !self.is_excluded(&e.file_name().to_string_lossy()))
            .map(|e| Workdir::new(&self.root, e.path()))
            .collect())
    }

    /// 整棵目录树中含有 VASP 输入文件的目录
    fn walk(&self) -> Vec<Workdir> {
        WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_excluded_entry(e))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .filter(|e| Workdir::looks_like_workdir(e.path()))
            .map(|e| Workdir::new(&self.root, e.path().to_path_buf()))
            .collect()
    }

    fn is_excluded_entry(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir() && self.is_excluded(&entry.file_name().to_string_lossy())
    }

    /// 隐藏目录或匹配任一忽略模式
    fn is_excluded(&self, name: &str) -> bool {
        name.starts_with(HIDDEN_PREFIX) || self.ignore.iter().any(|p| p.matches(name))
    }
}
