//! # 晶体结构数据模型
//!
//! POSCAR/CONTCAR 解析后的结构摘要：晶格、元素及其原子数。
//! 结果收集只需要体积、晶格参数和组成，不保留原子坐标。
//!
//! ## 依赖关系
//! - 被 `parsers/poscar.rs` 构造
//! - 被 `workflow/collector.rs` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 晶格参数表示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)，角度单位：度
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let [a_vec, b_vec, c_vec] = self.matrix;

        let norm = |v: [f64; 3]| (v[0].powi(2) + v[1].powi(2) + v[2].powi(2)).sqrt();
        let dot = |u: [f64; 3], v: [f64; 3]| u[0] * v[0] + u[1] * v[1] + u[2] * v[2];

        let a = norm(a_vec);
        let b = norm(b_vec);
        let c = norm(c_vec);

        let alpha = (dot(b_vec, c_vec) / (b * c)).acos().to_degrees();
        let beta = (dot(a_vec, c_vec) / (a * c)).acos().to_degrees();
        let gamma = (dot(a_vec, b_vec) / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积（带符号的行列式）
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.matrix;
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }
}

/// 结构摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    /// 注释行
    pub comment: String,

    /// 晶格（已乘缩放因子）
    pub lattice: Lattice,

    /// 按文件顺序的 (元素, 原子数)，同一元素可出现多次
    pub species: Vec<(String, usize)>,
}

impl Structure {
    pub fn new(comment: impl Into<String>, lattice: Lattice, species: Vec<(String, usize)>) -> Self {
        Structure {
            comment: comment.into(),
            lattice,
            species,
        }
    }

    /// 原子总数
    pub fn natoms(&self) -> usize {
        self.species.iter().map(|(_, n)| n).sum()
    }

    /// 晶胞体积 (Å³)
    pub fn volume(&self) -> f64 {
        self.lattice.volume().abs()
    }

    /// 元素组成，按元素符号排序并合并重复元素
    pub fn composition(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for (element, n) in &self.species {
            *counts.entry(element.clone()).or_insert(0) += n;
        }
        counts
    }

    /// 化学式
    pub fn formula(&self) -> String {
        self.composition()
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(el, count)| {
                if count == 1 {
                    el
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(a: f64) -> Lattice {
        Lattice::from_vectors([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]])
    }

    #[test]
    fn test_lattice_volume_cubic() {
        let vol = cubic(5.0).volume().abs();
        assert!((vol - 125.0).abs() < 1e-6);
    }

    #[test]
    fn test_lattice_parameters() {
        let (a, b, c, alpha, beta, gamma) = cubic(4.0).parameters();
        assert!((a - 4.0).abs() < 1e-6);
        assert!((b - 4.0).abs() < 1e-6);
        assert!((c - 4.0).abs() < 1e-6);
        assert!((alpha - 90.0).abs() < 1e-6);
        assert!((beta - 90.0).abs() < 1e-6);
        assert!((gamma - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_lattice_hexagonal_gamma() {
        let half = 3.0 * 0.5;
        let h = 3.0 * (3.0_f64).sqrt() / 2.0;
        let lattice = Lattice::from_vectors([[3.0, 0.0, 0.0], [-half, h, 0.0], [0.0, 0.0, 5.0]]);
        let (a, b, c, _, _, gamma) = lattice.parameters();
        assert!((a - 3.0).abs() < 0.01);
        assert!((b - 3.0).abs() < 0.01);
        assert!((c - 5.0).abs() < 0.01);
        assert!((gamma - 120.0).abs() < 0.01);
    }

    #[test]
    fn test_structure_composition_merges_repeats() {
        let s = Structure::new(
            "Fe-O-Fe",
            cubic(4.0),
            vec![("Fe".into(), 2), ("O".into(), 3), ("Fe".into(), 1)],
        );
        assert_eq!(s.natoms(), 6);
        let comp = s.composition();
        assert_eq!(comp.get("Fe"), Some(&3));
        assert_eq!(comp.get("O"), Some(&3));
        assert_eq!(s.formula(), "Fe3O3");
    }

    #[test]
    fn test_formula_single_atom_has_no_count() {
        let s = Structure::new("NaCl", cubic(5.64), vec![("Na".into(), 1), ("Cl".into(), 1)]);
        assert_eq!(s.formula(), "ClNa");
    }
}
