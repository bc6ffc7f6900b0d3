//! # OUTCAR 力表解析器
//!
//! 逐离子步解析 OUTCAR 中的 `POSITION ... TOTAL-FORCE` 力表，
//! 对每一步求所有原子力的矢量和，并判断合力是否为零。
//!
//! ## 力表格式
//! ```text
//!  POSITION                                       TOTAL-FORCE (eV/Angst)
//!  -----------------------------------------------------------------------------------
//!       0.00000      0.00000      0.00000         0.000000      0.000000      0.000000
//!       1.42500      1.42500      1.42500        -0.012345      0.000000      0.012345
//!  -----------------------------------------------------------------------------------
//!     total drift:                                0.000001      0.000002     -0.000003
//! ```
//!
//! 每行取最后三个数作为力矢量；空行和虚线跳过。只有最后一个离子步决定收敛。
//!
//! ## 依赖关系
//! - 被 `workflow/classifier.rs` 使用
//! - 使用 `models/workdir.rs`

use super::WorkdirParser;
use crate::error::{ParseFailure, ParseResult};
use crate::models::workdir::OUTCAR;
use crate::models::Workdir;
use std::iter::Enumerate;
use std::str::Lines;

/// 合力判零的默认绝对容差
pub const DEFAULT_FORCE_ATOL: f64 = 1e-6;

/// 合力每个分量的绝对值都不超过 `atol`
pub fn is_zero_force(sum: [f64; 3], atol: f64) -> bool {
    sum.iter().all(|c| c.abs() <= atol)
}

/// 惰性遍历 OUTCAR 文本中的力表，每个元素是一个离子步的合力
pub struct ForceBlocks<'a> {
    lines: Enumerate<Lines<'a>>,
    finished: bool,
}

/// 从 OUTCAR 文本创建力表迭代器
pub fn force_blocks(text: &str) -> ForceBlocks<'_> {
    ForceBlocks {
        lines: text.lines().enumerate(),
        finished: false,
    }
}

impl<'a> ForceBlocks<'a> {
    fn fail(&mut self, reason: String) -> Option<ParseResult<[f64; 3]>> {
        self.finished = true;
        Some(Err(ParseFailure::malformed(OUTCAR, reason)))
    }
}

impl<'a> Iterator for ForceBlocks<'a> {
    type Item = ParseResult<[f64; 3]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        // 找到下一个表头
        let header_line = loop {
            match self.lines.next() {
                Some((i, line)) if line.contains("POSITION") && line.contains("TOTAL-FORCE") => {
                    break i + 1
                }
                Some(_) => continue,
                None => {
                    self.finished = true;
                    return None;
                }
            }
        };

        let mut sum = [0.0_f64; 3];
        let mut rows = 0usize;

        while let Some((i, line)) = self.lines.next() {
            if line.contains("total drift") {
                if rows == 0 {
                    return self.fail(format!("empty force table at line {}", header_line));
                }
                return Some(Ok(sum));
            }

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.contains("---") {
                continue;
            }

            match parse_force_row(trimmed) {
                Some(force) => {
                    for k in 0..3 {
                        sum[k] += force[k];
                    }
                    rows += 1;
                }
                None => {
                    return self.fail(format!("invalid force row at line {}: '{}'", i + 1, trimmed));
                }
            }
        }

        // 文件在力表中途结束（VASP 仍在写入）
        self.fail(format!(
            "force table starting at line {} has no 'total drift' terminator",
            header_line
        ))
    }
}

/// 取一行的最后三个字段作为力矢量
fn parse_force_row(line: &str) -> Option<[f64; 3]> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 {
        return None;
    }
    let tail = &fields[fields.len() - 3..];
    let mut force = [0.0; 3];
    for (slot, field) in force.iter_mut().zip(tail) {
        *slot = field.parse().ok()?;
    }
    Some(force)
}

/// 一次 OUTCAR 解析得到的逐步合力与收敛判定
#[derive(Debug, Clone, PartialEq)]
pub struct ForceRecord {
    /// 各离子步的合力，按出现顺序
    pub steps: Vec<[f64; 3]>,

    /// 最后一步合力是否为零；没有任何力表时为 false
    pub converged: bool,
}

impl ForceRecord {
    /// 解析全部力表，任一力表损坏即失败
    pub fn from_text(text: &str, atol: f64) -> ParseResult<Self> {
        let steps = force_blocks(text).collect::<ParseResult<Vec<_>>>()?;
        let converged = steps
            .last()
            .map(|sum| is_zero_force(*sum, atol))
            .unwrap_or(false);
        Ok(ForceRecord { steps, converged })
    }

    /// 最后一个离子步的合力
    pub fn last(&self) -> Option<[f64; 3]> {
        self.steps.last().copied()
    }
}

/// OUTCAR 合力解析器
#[derive(Debug, Clone, Copy)]
pub struct ForceParser {
    pub atol: f64,
}

impl Default for ForceParser {
    fn default() -> Self {
        ForceParser {
            atol: DEFAULT_FORCE_ATOL,
        }
    }
}

impl WorkdirParser for ForceParser {
    type Output = ForceRecord;

    fn parse(&self, workdir: &Workdir) -> ParseResult<ForceRecord> {
        let text = workdir.read_text(OUTCAR)?;
        ForceRecord::from_text(&text, self.atol)
    }
}
