//! # 元素参考能量与形成能
//!
//! 每原子形成能：
//!
//! ```text
//! E_f = (E_total - Σ n_i E_i) / Σ n_i
//! ```
//!
//! `E_i` 为元素 i 的单原子参考能量 (eV/atom)，`n_i` 为原子数。
//! 参考能量文件是 `元素: 能量` 的映射，YAML（默认）或 JSON（`.json` 扩展名）。
//!
//! ## 依赖关系
//! - 被 `workflow/collector.rs` 使用
//! - 使用 `serde_yaml`, `serde_json` 读取参考能量文件

use crate::error::{Result, WflError};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// 元素 -> 单原子参考能量 (eV/atom)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ReferenceEnergies(BTreeMap<String, f64>);

impl ReferenceEnergies {
    pub fn new(energies: BTreeMap<String, f64>) -> Self {
        ReferenceEnergies(energies)
    }

    /// 从 YAML 或 JSON 文件读取
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| WflError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let refs: ReferenceEnergies = if is_json {
            serde_json::from_str(&text)?
        } else {
            serde_yaml::from_str(&text)?
        };

        if let Some((element, energy)) = refs.0.iter().find(|(_, e)| !e.is_finite()) {
            return Err(WflError::InvalidArgument(format!(
                "reference energy of {} is not a number: {}",
                element, energy
            )));
        }

        Ok(refs)
    }

    pub fn get(&self, element: &str) -> Option<f64> {
        self.0.get(element).copied()
    }

    /// 每原子形成能；失败时返回原因
    pub fn formation_energy_per_atom(
        &self,
        energy: f64,
        composition: &BTreeMap<String, usize>,
    ) -> std::result::Result<f64, String> {
        let missing: Vec<&str> = composition
            .keys()
            .filter(|el| self.get(el).is_none())
            .map(|el| el.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(format!("no reference energy for {}", missing.join(", ")));
        }

        let natoms: usize = composition.values().sum();
        if natoms == 0 {
            return Err("empty composition".to_string());
        }

        let reference: f64 = composition
            .iter()
            .map(|(el, &n)| n as f64 * self.get(el).unwrap_or_default())
            .sum();

        Ok((energy - reference) / natoms as f64)
    }
}
