//! # VASP OUTCAR 解析器
//!
//! 解析 VASP 计算输出文件 OUTCAR，提取最终自由能和总磁矩。
//! 力表由 `parsers/force.rs` 单独处理。每个字段由独立的解析器提供，
//! 某个字段缺失不影响其他字段。
//!
//! ## 依赖关系
//! - 被 `workflow/collector.rs` 使用
//! - 使用 `models/workdir.rs`

use super::WorkdirParser;
use crate::error::{ParseFailure, ParseResult};
use crate::models::workdir::{OSZICAR, OUTCAR};
use crate::models::Workdir;

/// OUTCAR 中的标量摘要，均取文件中最后一次出现的值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcarSummary {
    /// free energy TOTEN (eV)
    pub free_energy: Option<f64>,
    /// 最后一个 `magnetization (x)` 表中各原子 tot 列之和
    pub total_magnetization: Option<f64>,
}

/// 解析 OUTCAR 文本
pub fn parse_outcar_content(content: &str) -> OutcarSummary {
    let mut summary = OutcarSummary::default();
    let mut mag_block: Option<Vec<f64>> = None;

    for line in content.lines() {
        // "  free  energy   TOTEN  =       -10.81466200 eV"
        if line.contains("free  energy   TOTEN") {
            if let Some(val) = extract_number_before(line, "eV") {
                summary.free_energy = Some(val);
            }
        }

        // 磁矩表：以 "magnetization (x)" 开始，到 "tot" 汇总行结束
        if line.contains("magnetization (x)") {
            mag_block = Some(Vec::new());
            continue;
        }
        if let Some(values) = mag_block.as_mut() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("tot") {
                if !values.is_empty() {
                    summary.total_magnetization = Some(values.iter().sum());
                }
                mag_block = None;
            } else if trimmed
                .split_whitespace()
                .next()
                .map(|t| t.parse::<usize>().is_ok())
                .unwrap_or(false)
            {
                if let Some(val) = extract_last_number(trimmed) {
                    values.push(val);
                }
            }
        }
    }

    summary
}

/// 从字符串中提取指定标记之前的数字
fn extract_number_before(s: &str, marker: &str) -> Option<f64> {
    let pos = s.find(marker)?;
    s[..pos].split_whitespace().last()?.parse().ok()
}

/// 提取字符串中最后一个数字
fn extract_last_number(s: &str) -> Option<f64> {
    s.split_whitespace()
        .filter_map(|w| w.parse::<f64>().ok())
        .last()
}

/// OUTCAR 最终自由能解析器
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyParser;

impl WorkdirParser for EnergyParser {
    type Output = f64;

    fn parse(&self, workdir: &Workdir) -> ParseResult<f64> {
        let text = workdir.read_text(OUTCAR)?;
        parse_outcar_content(&text)
            .free_energy
            .ok_or_else(|| ParseFailure::malformed(OUTCAR, "no 'free  energy   TOTEN' line"))
    }
}

/// 总磁矩来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagnetizationSource {
    /// OUTCAR 最后一个 `magnetization (x)` 表
    Outcar,
    /// OSZICAR 最后一个离子步的 `mag=`
    Oszicar,
}

/// 总磁矩解析器
///
/// 非自旋极化计算没有磁矩数据，此时返回 `ParseFailure::Missing`。
#[derive(Debug, Clone, Copy)]
pub struct MagnetizationParser {
    pub source: MagnetizationSource,
}

impl MagnetizationParser {
    pub fn new(source: MagnetizationSource) -> Self {
        MagnetizationParser { source }
    }
}

impl WorkdirParser for MagnetizationParser {
    type Output = f64;

    fn parse(&self, workdir: &Workdir) -> ParseResult<f64> {
        match self.source {
            MagnetizationSource::Outcar => {
                let text = workdir.read_text(OUTCAR)?;
                parse_outcar_content(&text)
                    .total_magnetization
                    .ok_or_else(|| ParseFailure::missing("OUTCAR magnetization (x)"))
            }
            MagnetizationSource::Oszicar => {
                let text = workdir.read_text(OSZICAR)?;
                let steps = super::oszicar::parse_oszicar_content(&text)?;
                steps
                    .last()
                    .and_then(|s| s.mag)
                    .ok_or_else(|| ParseFailure::missing("OSZICAR mag="))
            }
        }
    }
}
