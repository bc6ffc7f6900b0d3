//! # 结果收集数据模型
//!
//! `CollectedRow` 是已完成 (DONE) 目录的一行摘要。
//! 每个字段独立提取，失败时为 `None`，对应 CSV 中的空单元格。
//!
//! ## 依赖关系
//! - 被 `workflow/collector.rs` 构造和序列化
//! - 无外部模块依赖

use serde::Serialize;
use std::collections::BTreeMap;

/// 固定列，元素计数列按元素符号排序追加在其后
pub const FIXED_COLUMNS: [&str; 20] = [
    "name",
    "abs_path",
    "formula",
    "natoms",
    "a",
    "b",
    "c",
    "alpha",
    "beta",
    "gamma",
    "volume",
    "F",
    "E0",
    "energy_outcar",
    "tot_mag_outcar",
    "tot_mag_oszicar",
    "magnetization",
    "energy_per_atom",
    "formation_energy_per_atom",
    "reason",
];

/// 结果表中的一行
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectedRow {
    pub name: String,
    pub abs_path: String,
    pub formula: Option<String>,
    pub natoms: Option<usize>,
    pub a: Option<f64>,
    pub b: Option<f64>,
    pub c: Option<f64>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
    pub volume: Option<f64>,

    /// 最后离子步自由能 F (eV)，来自 OSZICAR
    #[serde(rename = "F")]
    pub free_energy: Option<f64>,

    /// 最后离子步 E0 (eV)，来自 OSZICAR
    #[serde(rename = "E0")]
    pub energy_sigma0: Option<f64>,

    /// 最后一次 `free  energy   TOTEN` (eV)
    pub energy_outcar: Option<f64>,

    pub tot_mag_outcar: Option<f64>,
    pub tot_mag_oszicar: Option<f64>,

    /// 单位体积磁矩 (μB/Å³)
    pub magnetization: Option<f64>,

    pub energy_per_atom: Option<f64>,

    /// 相对元素参考能量的每原子形成能 (eV/atom)，未提供参考能量时为空
    pub formation_energy_per_atom: Option<f64>,

    /// 元素 -> 原子数
    pub composition: BTreeMap<String, usize>,

    /// "Success" 或以 "; " 连接的字段失败原因
    pub reason: String,
}

impl CollectedRow {
    pub fn new(name: impl Into<String>, abs_path: impl Into<String>) -> Self {
        CollectedRow {
            name: name.into(),
            abs_path: abs_path.into(),
            ..Default::default()
        }
    }

    /// 固定列的单元格文本，顺序与 [`FIXED_COLUMNS`] 一致
    pub fn fixed_cells(&self) -> Vec<String> {
        let num = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
        vec![
            self.name.clone(),
            self.abs_path.clone(),
            self.formula.clone().unwrap_or_default(),
            self.natoms.map(|n| n.to_string()).unwrap_or_default(),
            num(self.a),
            num(self.b),
            num(self.c),
            num(self.alpha),
            num(self.beta),
            num(self.gamma),
            num(self.volume),
            num(self.free_energy),
            num(self.energy_sigma0),
            num(self.energy_outcar),
            num(self.tot_mag_outcar),
            num(self.tot_mag_oszicar),
            num(self.magnetization),
            num(self.energy_per_atom),
            num(self.formation_energy_per_atom),
            self.reason.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_cells_match_columns() {
        let mut row = CollectedRow::new("Fe", "/runs/Fe/CONTCAR");
        row.volume = Some(11.5);
        let cells = row.fixed_cells();
        assert_eq!(cells.len(), FIXED_COLUMNS.len());
        assert_eq!(cells[0], "Fe");
        assert_eq!(cells[10], "11.5");
        assert_eq!(cells[11], "");
    }
}
