//! # 重启结构轮换
//!
//! 重新提交前用上一次计算的 CONTCAR 替换 POSCAR：
//!
//! | POSCAR | CONTCAR | 操作 |
//! |---|---|---|
//! | 有 | 有 | POSCAR → `POSCAR_<n>`，CONTCAR → POSCAR |
//! | 有 | 无 | 不变 |
//! | 无 | 有 | CONTCAR → POSCAR |
//! | 无 | 无 | 错误 |
//!
//! `n` 为已有 `POSCAR_<数字>` 备份的最大编号加一。空的 CONTCAR（作业刚启动即中断）视为不存在。
//! CONTCAR 改名失败时备份会被改回 POSCAR，目录不会处于没有 POSCAR 的状态。
//!
//! ## 依赖关系
//! - 被 `workflow/driver.rs` 使用
//! - 使用 `regex` 匹配备份文件名

use crate::error::{Result, WflError};
use crate::models::workdir::{CONTCAR, POSCAR};

use regex::Regex;
use std::fs;
use std::path::Path;

/// 备份文件名模式
const BACKUP_PATTERN: &str = r"^POSCAR_(\d+)$";

/// 轮换结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rotation {
    /// POSCAR 已备份为该文件名，CONTCAR 成为新的 POSCAR
    Rotated { backup: String },
    /// 没有 POSCAR，CONTCAR 直接改名
    Promoted,
    /// 没有可用的 CONTCAR
    Unchanged,
}

/// 计划执行的轮换，不修改任何文件
pub fn plan_rotation(dir: &Path) -> Result<Rotation> {
    let has_poscar = dir.join(POSCAR).is_file();
    let has_contcar = fs::metadata(dir.join(CONTCAR))
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false);

    match (has_poscar, has_contcar) {
        (true, true) => Ok(Rotation::Rotated {
            backup: format!("{}_{}", POSCAR, next_backup_index(dir)?),
        }),
        (true, false) => Ok(Rotation::Unchanged),
        (false, true) => Ok(Rotation::Promoted),
        (false, false) => Err(WflError::FileNotFound {
            path: format!("{} or {} in {}", POSCAR, CONTCAR, dir.display()),
        }),
    }
}

/// 执行轮换
pub fn rotate_contcar(dir: &Path) -> Result<Rotation> {
    let rotation = plan_rotation(dir)?;
    let poscar = dir.join(POSCAR);
    let contcar = dir.join(CONTCAR);

    match &rotation {
        Rotation::Rotated { backup } => swap_in(&poscar, &dir.join(backup), &contcar)?,
        Rotation::Promoted => rename(&contcar, &poscar)?,
        Rotation::Unchanged => {}
    }

    Ok(rotation)
}

/// 下一个可用的备份编号，从 1 开始
fn next_backup_index(dir: &Path) -> Result<u32> {
    let re = Regex::new(BACKUP_PATTERN).map_err(|e| WflError::InvalidPattern {
        pattern: BACKUP_PATTERN.to_string(),
        reason: e.to_string(),
    })?;

    let entries = fs::read_dir(dir).map_err(|e| WflError::FileReadError {
        path: dir.display().to_string(),
        source: e,
    })?;

    let max = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            re.captures(&name)?.get(1)?.as_str().parse::<u32>().ok()
        })
        .max()
        .unwrap_or(0);

    max.checked_add(1).ok_or_else(|| {
        WflError::Other(format!(
            "No backup index left after {}_{} in {}",
            POSCAR,
            max,
            dir.display()
        ))
    })
}

/// POSCAR → backup，CONTCAR → POSCAR；第二步失败时恢复 POSCAR
fn swap_in(poscar: &Path, backup: &Path, contcar: &Path) -> Result<()> {
    rename(poscar, backup)?;
    if let Err(e) = rename(contcar, poscar) {
        rename(backup, poscar)?;
        return Err(e);
    }
    Ok(())
}

fn rename(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|e| WflError::FileWriteError {
        path: to.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rotate_backs_up_with_next_index() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        fs::write(d.join("POSCAR"), "old").unwrap();
        fs::write(d.join("CONTCAR"), "new").unwrap();
        fs::write(d.join("POSCAR_1"), "older").unwrap();
        fs::write(d.join("POSCAR_7"), "oldest").unwrap();
        fs::write(d.join("POSCAR_x"), "not a backup").unwrap();

        let rotation = rotate_contcar(d).unwrap();
        assert_eq!(
            rotation,
            Rotation::Rotated {
                backup: "POSCAR_8".to_string()
            }
        );
        assert_eq!(fs::read_to_string(d.join("POSCAR")).unwrap(), "new");
        assert_eq!(fs::read_to_string(d.join("POSCAR_8")).unwrap(), "old");
        assert!(!d.join("CONTCAR").exists());
    }

    #[test]
    fn test_first_backup_is_one() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("POSCAR"), "a").unwrap();
        fs::write(dir.path().join("CONTCAR"), "b").unwrap();
        assert_eq!(
            plan_rotation(dir.path()).unwrap(),
            Rotation::Rotated {
                backup: "POSCAR_1".to_string()
            }
        );
        // 只是计划，文件未改动
        assert!(dir.path().join("CONTCAR").exists());
    }

    #[test]
    fn test_promote_and_unchanged() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("CONTCAR"), "b").unwrap();
        assert_eq!(rotate_contcar(dir.path()).unwrap(), Rotation::Promoted);
        assert_eq!(fs::read_to_string(dir.path().join("POSCAR")).unwrap(), "b");
        assert_eq!(rotate_contcar(dir.path()).unwrap(), Rotation::Unchanged);
    }

    #[test]
    fn test_empty_contcar_is_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("POSCAR"), "a").unwrap();
        fs::write(dir.path().join("CONTCAR"), "").unwrap();
        assert_eq!(rotate_contcar(dir.path()).unwrap(), Rotation::Unchanged);
        assert_eq!(fs::read_to_string(dir.path().join("POSCAR")).unwrap(), "a");
    }

    #[test]
    fn test_failed_promotion_restores_poscar() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        fs::write(d.join("POSCAR"), "old").unwrap();

        let result = swap_in(&d.join("POSCAR"), &d.join("POSCAR_1"), &d.join("CONTCAR"));
        assert!(matches!(result, Err(WflError::FileWriteError { .. })));
        assert_eq!(fs::read_to_string(d.join("POSCAR")).unwrap(), "old");
        assert!(!d.join("POSCAR_1").exists());
    }

    #[test]
    fn test_backup_index_overflow_is_error() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        fs::write(d.join("POSCAR"), "a").unwrap();
        fs::write(d.join("CONTCAR"), "b").unwrap();
        fs::write(d.join(format!("POSCAR_{}", u32::MAX)), "c").unwrap();

        assert!(matches!(plan_rotation(d), Err(WflError::Other(_))));
        assert!(rotate_contcar(d).is_err());
        assert_eq!(fs::read_to_string(d.join("POSCAR")).unwrap(), "a");
    }

    #[test]
    fn test_neither_file_is_error() {
        let dir = tempdir().unwrap();
        let err = rotate_contcar(dir.path()).unwrap_err();
        assert!(matches!(err, WflError::FileNotFound { .. }));
    }
}
