//! # 计算目录模型
//!
//! 一个 `Workdir` 对应一次 VASP 计算的目录，以相对根目录的路径命名。
//! 只读访问目录中的文件，不缓存任何状态：每次分类都重新读取磁盘。
//!
//! ## 依赖关系
//! - 被 `batch/finder.rs` 构造
//! - 被 `parsers/`、`workflow/` 使用
//! - 使用 `error.rs` 中的 `ParseFailure`

use crate::error::{ParseFailure, ParseResult};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const POSCAR: &str = "POSCAR";
pub const CONTCAR: &str = "CONTCAR";
pub const INCAR: &str = "INCAR";
pub const POTCAR: &str = "POTCAR";
pub const OUTCAR: &str = "OUTCAR";
pub const OSZICAR: &str = "OSZICAR";
pub const RUN_SCRIPT: &str = "run.sh";
pub const DONE_SENTINEL: &str = "done.txt";

/// 提交前应当存在的输入文件
pub const REQUIRED_INPUTS: [&str; 4] = [POSCAR, INCAR, POTCAR, RUN_SCRIPT];

/// 固定名称的 VASP 输入文件，用于递归模式下识别计算目录。
/// `WFULLxxxx.tmp` / `Wxxxx.tmp` 临时文件另行按模式匹配。
const VASP_INPUT_FILES: [&str; 20] = [
    "CHGCAR",
    "DYNMATFULL",
    "GAMMA",
    "ICONST",
    "INCAR",
    "KPOINTS",
    "KPOINTS_OPT",
    "KPOINTS_WAN",
    "ML_AB",
    "ML_FF",
    "PENALTYPOT",
    "POSCAR",
    "POTCAR",
    "QPOINTS",
    "Vasp.lock",
    "Vaspin.h5",
    "WANPROJ",
    "WAVECAR",
    "WAVEDER",
    "STOPCAR",
];

/// VASP 计算目录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workdir {
    path: PathBuf,
    name: String,
}

impl Workdir {
    /// 以 `root` 为基准创建，名称为相对路径（`/` 分隔）
    pub fn new(root: &Path, path: PathBuf) -> Self {
        let name = relative_name(root, &path);
        Workdir { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 相对根目录的名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 目录内文件的完整路径
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// 文件是否存在（必须是普通文件）
    pub fn has(&self, name: &str) -> bool {
        self.file(name).is_file()
    }

    /// 缺失的必需输入文件
    pub fn missing_inputs(&self) -> Vec<&'static str> {
        REQUIRED_INPUTS
            .iter()
            .copied()
            .filter(|f| !self.has(f))
            .collect()
    }

    /// 读取文件文本，非 UTF-8 字节按替换字符处理
    pub fn read_text(&self, name: &str) -> ParseResult<String> {
        let path = self.file(name);
        if !path.is_file() {
            return Err(ParseFailure::missing(name));
        }
        fs::read(&path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .map_err(|e| ParseFailure::malformed(name, format!("unreadable: {}", e)))
    }

    /// 文件名是否为 VASP 输入文件（含临时文件模式）
    pub fn is_input(filename: &str) -> bool {
        if VASP_INPUT_FILES.contains(&filename) {
            return true;
        }
        ["WFULL????.tmp", "W????.tmp"].iter().any(|p| {
            glob::Pattern::new(p)
                .map(|pat| pat.matches(filename))
                .unwrap_or(false)
        })
    }

    /// 目录是否含有任意 VASP 输入文件（不递归）
    pub fn looks_like_workdir(dir: &Path) -> bool {
        let Ok(entries) = fs::read_dir(dir) else {
            return false;
        };
        entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .any(|e| e.file_name().to_str().map(Self::is_input).unwrap_or(false))
    }
}

/// 计算相对名称；`path` 等于 `root` 时返回 "."
fn relative_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_relative_name() {
        let root = Path::new("/runs");
        assert_eq!(relative_name(root, Path::new("/runs/Fe2O3")), "Fe2O3");
        assert_eq!(relative_name(root, Path::new("/runs/a/b")), "a/b");
        assert_eq!(relative_name(root, Path::new("/runs")), ".");
    }

    #[test]
    fn test_is_input() {
        assert!(Workdir::is_input("INCAR"));
        assert!(Workdir::is_input("POSCAR"));
        assert!(Workdir::is_input("W0001.tmp"));
        assert!(Workdir::is_input("WFULL0001.tmp"));
        assert!(!Workdir::is_input("OUTCAR"));
        assert!(!Workdir::is_input("notes.txt"));
    }

    #[test]
    fn test_missing_inputs_and_read_text() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("POSCAR"), "x").unwrap();
        fs::write(dir.path().join("INCAR"), "ENCUT = 520").unwrap();

        let wd = Workdir::new(dir.path(), dir.path().to_path_buf());
        assert_eq!(wd.missing_inputs(), vec!["POTCAR", "run.sh"]);
        assert_eq!(wd.read_text("INCAR").unwrap(), "ENCUT = 520");
        assert_eq!(
            wd.read_text("OUTCAR").unwrap_err(),
            ParseFailure::missing("OUTCAR")
        );
        assert!(Workdir::looks_like_workdir(dir.path()));
    }
}
