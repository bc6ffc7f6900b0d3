//! # 批量执行器
//!
//! 对计算目录逐个独立处理，目录之间没有共享的可变状态。
//!
//! ## 功能
//! - 基于 rayon 的并行映射，结果顺序与输入一致
//! - 进度条显示
//! - 处理结果统计与失败汇总
//!
//! ## 依赖关系
//! - 被 `workflow/classifier.rs`, `workflow/collector.rs`, `workflow/driver.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::utils::progress;

use rayon::prelude::*;

/// 单个目录的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    /// 处理成功
    Success(String),
    /// 跳过 (目录名, 原因)
    Skipped(String, String),
    /// 处理失败 (目录名, 错误信息)
    Failed(String, String),
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    /// 成功数量
    pub success: usize,
    /// 跳过数量
    pub skipped: usize,
    /// 失败数量
    pub failed: usize,
    /// 失败详情
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    /// 合并处理结果
    pub fn merge(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Success(_) => self.success += 1,
            ProcessResult::Skipped(_, _) => self.skipped += 1,
            ProcessResult::Failed(name, err) => {
                self.failed += 1;
                self.failures.push((name, err));
            }
        }
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }
}

/// 批量执行器
#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的批量执行器，`jobs == 0` 时使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 并行映射，返回顺序与 `items` 一致
    pub fn map<T, R, F>(&self, items: &[T], message: &str, f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        let pb = progress::create_progress_bar(items.len() as u64, message);

        let work = || {
            items
                .par_iter()
                .map(|item| {
                    let result = f(item);
                    pb.inc(1);
                    result
                })
                .collect::<Vec<R>>()
        };

        // 线程池创建失败时退回全局线程池
        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
        {
            Ok(pool) => pool.install(work),
            Err(_) => work(),
        };

        pb.finish_and_clear();
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_preserves_order() {
        let items: Vec<usize> = (0..100).collect();
        let out = BatchRunner::new(4).map(&items, "Squaring", |x| x * x);
        assert_eq!(out, items.iter().map(|x| x * x).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_jobs_uses_cpus() {
        assert!(BatchRunner::new(0).jobs() >= 1);
    }

    #[test]
    fn test_batch_result_merge() {
        let mut r = BatchResult::default();
        r.merge(ProcessResult::Success("a".into()));
        r.merge(ProcessResult::Skipped("b".into(), "no POSCAR".into()));
        r.merge(ProcessResult::Failed("c".into(), "sbatch failed".into()));
        assert_eq!(r.total(), 3);
        assert_eq!(r.failures, vec![("c".to_string(), "sbatch failed".to_string())]);
    }
}
