//! # 测试夹具
//!
//! 生成 OUTCAR 力表、OSZICAR 离子步和 POSCAR 文本，以及临时计算目录树。
//! 仅在 `cargo test` 时编译。

use std::fs;
use std::path::{Path, PathBuf};

const RULE: &str =
    " -----------------------------------------------------------------------------------";

/// 一个完整的 `POSITION ... TOTAL-FORCE` 力表，坐标列填零
pub fn force_block(rows: &[[f64; 3]]) -> String {
    let mut s = String::new();
    s.push_str(" POSITION                                       TOTAL-FORCE (eV/Angst)\n");
    s.push_str(RULE);
    s.push('\n');
    for f in rows {
        s.push_str(&format!(
            "      0.00000      0.00000      0.00000      {:>12.6}  {:>12.6}  {:>12.6}\n",
            f[0], f[1], f[2]
        ));
    }
    s.push_str(RULE);
    s.push('\n');
    s.push_str("    total drift:                                0.000000      0.000000      0.000000\n");
    s
}

/// 多个离子步的 OUTCAR，每步带 TOTEN 行和力表
pub fn outcar_with_forces(steps: &[Vec<[f64; 3]>]) -> String {
    let natoms = steps.first().map(|s| s.len()).unwrap_or(0);
    let mut s = format!("   NIONS =       {}\n", natoms);
    for (i, rows) in steps.iter().enumerate() {
        s.push('\n');
        s.push_str(&force_block(rows));
        s.push_str(&format!(
            "\n  free  energy   TOTEN  =       {:.8} eV\n",
            -10.0 - 0.01 * i as f64
        ));
    }
    s
}

/// OSZICAR 离子步行，每个能量一行
pub fn oszicar(energies: &[f64]) -> String {
    let mut s = String::new();
    let mut prev = 0.0;
    for (i, e) in energies.iter().enumerate() {
        s.push_str("DAV:   1    -0.100000000000E+02   -0.10000E-02   -0.10000E-02   720   0.100E-01\n");
        s.push_str(&format!(
            "{:>4} F= {:.8E} E0= {:.8E}  d E ={:.6E}  mag=     2.0000\n",
            i + 1,
            e,
            e + 0.001,
            e - prev
        ));
        prev = *e;
    }
    s
}

/// 两原子 bcc Fe
pub const POSCAR_FE: &str = "\
Fe bcc
1.0
2.87 0.0 0.0
0.0 2.87 0.0
0.0 0.0 2.87
Fe
2
Direct
0.0 0.0 0.0
0.5 0.5 0.5
";

/// 在 `root` 下创建计算目录并写入文件
pub fn make_folder(root: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for (file, content) in files {
        fs::write(dir.join(file), content).unwrap();
    }
    dir
}

/// 合力为零、OSZICAR 收敛的完整计算目录
pub fn converged_folder(root: &Path, name: &str) -> PathBuf {
    let outcar = outcar_with_forces(&[
        vec![[0.2, 0.0, 0.0], [0.0, 0.0, 0.0]],
        vec![[0.1, -0.1, 0.0], [-0.1, 0.1, 0.0]],
    ]);
    make_folder(
        root,
        name,
        &[
            ("POSCAR", POSCAR_FE),
            ("CONTCAR", POSCAR_FE),
            ("OUTCAR", outcar.as_str()),
            ("OSZICAR", oszicar(&[-16.0, -16.5, -16.5002]).as_str()),
        ],
    )
}
