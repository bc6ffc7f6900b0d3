//! # VASP POSCAR/CONTCAR 解析器
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor (负值表示目标体积，三个值表示逐轴缩放)
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1               # atom positions
//! ...
//! ```
//!
//! 只保留晶格和组成，原子坐标仅检查行数是否完整（CONTCAR 可能在写入中途被读取）。
//!
//! ## 依赖关系
//! - 被 `workflow/collector.rs` 使用
//! - 使用 `models/structure.rs`, `models/workdir.rs`

use super::WorkdirParser;
use crate::error::{ParseFailure, ParseResult};
use crate::models::workdir::{CONTCAR, POSCAR};
use crate::models::{Lattice, Structure, Workdir};

/// 从字符串内容解析 POSCAR 格式，`file` 仅用于错误信息
pub fn parse_poscar_content(content: &str, file: &str) -> ParseResult<Structure> {
    let fail = |reason: String| ParseFailure::malformed(file, reason);
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 8 {
        return Err(fail("file too short".to_string()));
    }

    let comment = lines[0].trim().to_string();

    // Line 1: 缩放因子
    let scale: Vec<f64> = lines[1]
        .split_whitespace()
        .map(|s| s.parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| fail(format!("invalid scaling factor '{}'", lines[1].trim())))?;

    // Lines 2-4: 晶格向量
    let mut matrix = [[0.0; 3]; 3];
    for (i, row) in matrix.iter_mut().enumerate() {
        let parts: Vec<f64> = lines[2 + i]
            .split_whitespace()
            .take(3)
            .filter_map(|s| s.parse().ok())
            .collect();
        if parts.len() < 3 {
            return Err(fail(format!("invalid lattice vector at line {}", 3 + i)));
        }
        *row = [parts[0], parts[1], parts[2]];
    }
    let matrix = apply_scale(matrix, &scale).map_err(fail)?;
    let lattice = Lattice::from_vectors(matrix);

    // Line 5: 元素符号 (VASP 5+) 或原子数 (VASP 4)
    let line5_parts: Vec<&str> = lines[5].split_whitespace().collect();
    let Some(first) = line5_parts.first() else {
        return Err(fail("empty species line".to_string()));
    };
    let (elements, counts_line, atom_line_start) = if first.parse::<usize>().is_ok() {
        // VASP 4：没有元素行，使用占位符号
        let elements: Vec<String> = (0..line5_parts.len()).map(|i| format!("X{}", i + 1)).collect();
        (elements, 5, 6)
    } else {
        // 某些版本在符号后附带 "/hash" 后缀，例如 "Fe_pv/1a2b3c"
        let elements: Vec<String> = line5_parts
            .iter()
            .map(|s| s.split('/').next().unwrap_or(*s).to_string())
            .collect();
        (elements, 6, 7)
    };

    let counts: Vec<usize> = lines[counts_line]
        .split_whitespace()
        .map(|s| s.parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|_| fail(format!("invalid atom counts '{}'", lines[counts_line].trim())))?;

    if counts.len() != elements.len() {
        return Err(fail(format!(
            "{} element symbols but {} atom counts",
            elements.len(),
            counts.len()
        )));
    }

    // 可选的 "Selective dynamics" 行
    let mut coord_line = atom_line_start;
    if lines.len() > coord_line
        && lines[coord_line]
            .trim()
            .to_lowercase()
            .starts_with('s')
    {
        coord_line += 1;
    }

    if lines.len() <= coord_line {
        return Err(fail("missing coordinate type line".to_string()));
    }

    // 检查坐标行是否完整
    let natoms: usize = counts.iter().sum();
    let complete = lines[coord_line + 1..]
        .iter()
        .take(natoms)
        .filter(|l| {
            l.split_whitespace()
                .take(3)
                .filter(|s| s.parse::<f64>().is_ok())
                .count()
                == 3
        })
        .count();
    if complete < natoms {
        return Err(fail(format!(
            "expected {} atomic positions, found {}",
            natoms, complete
        )));
    }

    let species = elements.into_iter().zip(counts).collect();
    Ok(Structure::new(comment, lattice, species))
}

/// 按 VASP 约定应用缩放因子
fn apply_scale(matrix: [[f64; 3]; 3], scale: &[f64]) -> Result<[[f64; 3]; 3], String> {
    let factors = match scale {
        [s] if *s > 0.0 => [*s; 3],
        [s] if *s < 0.0 => {
            // 负值表示目标体积
            let raw = Lattice::from_vectors(matrix).volume().abs();
            if raw < 1e-12 {
                return Err("degenerate lattice".to_string());
            }
            [(-s / raw).cbrt(); 3]
        }
        [x, y, z] => [*x, *y, *z],
        _ => return Err(format!("invalid scaling factor {:?}", scale)),
    };

    let mut scaled = matrix;
    for row in scaled.iter_mut() {
        for (v, f) in row.iter_mut().zip(factors) {
            *v *= f;
        }
    }
    Ok(scaled)
}

/// 结构文件解析器：优先非空的 CONTCAR，其次 POSCAR
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureParser;

impl StructureParser {
    /// 选用的结构文件名；都不存在时为 None
    pub fn source_file(workdir: &Workdir) -> Option<&'static str> {
        let contcar = workdir.file(CONTCAR);
        let contcar_nonempty = contcar
            .metadata()
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false);
        if contcar_nonempty {
            Some(CONTCAR)
        } else if workdir.has(POSCAR) {
            Some(POSCAR)
        } else {
            None
        }
    }
}

impl WorkdirParser for StructureParser {
    type Output = Structure;

    fn parse(&self, workdir: &Workdir) -> ParseResult<Structure> {
        let file = Self::source_file(workdir).ok_or_else(|| ParseFailure::missing(CONTCAR))?;
        let content = workdir.read_text(file)?;
        parse_poscar_content(&content, file)
    }
}
