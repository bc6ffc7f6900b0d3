//! # VASP OSZICAR 解析器
//!
//! 提取每个离子步的能量行：
//! ```text
//!    1 F= -.10814662E+02 E0= -.10814662E+02  d E =-.108147E+02  mag=     2.0000
//! ```
//! 电子步行 (`DAV:`, `RMM:` 等) 被忽略。离子步行中的数值无法解析时整体失败。
//!
//! ## 依赖关系
//! - 被 `workflow/classifier.rs`（能量差判据）和 `workflow/collector.rs` 使用
//! - 使用 `models/workdir.rs`

use super::WorkdirParser;
use crate::error::{ParseFailure, ParseResult};
use crate::models::workdir::OSZICAR;
use crate::models::Workdir;

/// 能量差判据的默认阈值 (eV)
pub const DEFAULT_ENERGY_THRESHOLD: f64 = 1e-3;

/// 一个离子步
#[derive(Debug, Clone, PartialEq)]
pub struct IonicStep {
    pub step: usize,
    /// 自由能 F (eV)
    pub free_energy: f64,
    /// E0 (eV)
    pub energy_sigma0: Option<f64>,
    /// d E (eV)
    pub delta_e: Option<f64>,
    /// 总磁矩 (μB)
    pub mag: Option<f64>,
}

/// 解析 OSZICAR 文本
pub fn parse_oszicar_content(content: &str) -> ParseResult<Vec<IonicStep>> {
    let mut steps = Vec::new();

    for (lineno, line) in content.lines().enumerate() {
        let Some(step) = ionic_step_index(line) else {
            continue;
        };
        let fields = key_values(line);
        let get = |key: &str| -> ParseResult<Option<f64>> {
            match fields.iter().find(|(k, _)| *k == key) {
                None => Ok(None),
                Some((_, raw)) => raw.parse::<f64>().map(Some).map_err(|_| {
                    ParseFailure::malformed(
                        OSZICAR,
                        format!("invalid {} value '{}' at line {}", key, raw, lineno + 1),
                    )
                }),
            }
        };

        let free_energy = get("F")?.ok_or_else(|| {
            ParseFailure::malformed(OSZICAR, format!("missing F= at line {}", lineno + 1))
        })?;

        steps.push(IonicStep {
            step,
            free_energy,
            energy_sigma0: get("E0")?,
            delta_e: get("dE")?,
            mag: get("mag")?,
        });
    }

    Ok(steps)
}

/// 离子步行以步号开头且包含 `F=`
fn ionic_step_index(line: &str) -> Option<usize> {
    if !line.contains("F=") {
        return None;
    }
    line.split_whitespace().next()?.parse().ok()
}

/// 把 `F= x E0= y d E =z mag= w` 拆成键值对
fn key_values(line: &str) -> Vec<(String, String)> {
    let normalized = line.replace("d E", "dE");
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let mut pairs = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];
        let (key, mut value, mut consumed) = match token.split_once('=') {
            Some((key, value)) => (key, value.to_string(), 1),
            // "dE =-.1"：键与 "=" 被空格分开
            None => match tokens.get(i + 1) {
                Some(next) if next.starts_with('=') => {
                    (token, next.trim_start_matches('=').to_string(), 2)
                }
                _ => {
                    i += 1;
                    continue;
                }
            },
        };
        if value.is_empty() {
            // "mag=     2.0000"：值在下一个 token
            if let Some(next) = tokens.get(i + consumed) {
                value = next.to_string();
                consumed += 1;
            }
        }
        if !key.is_empty() && !value.is_empty() {
            pairs.push((key.to_string(), value));
        }
        i += consumed;
    }

    pairs
}

/// 最后两个离子步的自由能差；少于两步时为 None
pub fn last_energy_delta(steps: &[IonicStep]) -> Option<f64> {
    match steps {
        [.., prev, last] => Some(last.free_energy - prev.free_energy),
        _ => None,
    }
}

/// OSZICAR 离子步解析器
#[derive(Debug, Clone, Copy, Default)]
pub struct OszicarParser;

impl WorkdirParser for OszicarParser {
    type Output = Vec<IonicStep>;

    fn parse(&self, workdir: &Workdir) -> ParseResult<Vec<IonicStep>> {
        let text = workdir.read_text(OSZICAR)?;
        parse_oszicar_content(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
       N       E                     dE             d eps       ncg     rms          rms(c)
DAV:   1     0.123456789012E+03    0.12346E+03   -0.59000E+03   720   0.123E+03
RMM:   2    -0.108000000000E+02   -0.12000E+02   -0.10000E+01   800   0.100E+01    0.500E+00
   1 F= -.10814662E+02 E0= -.10810000E+02  d E =-.108147E+02  mag=     2.0000
DAV:   1    -0.108150000000E+02   -0.10000E-02   -0.10000E-02   720   0.100E-01
   2 F= -.10815162E+02 E0= -.10811000E+02  d E =-.500000E-03  mag=     1.9990
";

    #[test]
    fn test_parse_ionic_steps() {
        let steps = parse_oszicar_content(SAMPLE).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].step, 1);
        assert!((steps[0].free_energy - (-10.814662)).abs() < 1e-9);
        assert!((steps[0].energy_sigma0.unwrap() - (-10.81)).abs() < 1e-9);
        assert!((steps[1].delta_e.unwrap() - (-5.0e-4)).abs() < 1e-12);
        assert!((steps[1].mag.unwrap() - 1.999).abs() < 1e-12);
    }

    #[test]
    fn test_energy_delta() {
        let steps = parse_oszicar_content(SAMPLE).unwrap();
        let delta = last_energy_delta(&steps).unwrap();
        assert!((delta - (-0.0005)).abs() < 1e-9);
        assert!(last_energy_delta(&steps[..1]).is_none());
    }

    #[test]
    fn test_step_without_mag() {
        let steps =
            parse_oszicar_content("   1 F= -.5E+01 E0= -.5E+01  d E =-.5E+01\n").unwrap();
        assert_eq!(steps.len(), 1);
        assert!(steps[0].mag.is_none());
        assert!((steps[0].free_energy + 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_numeric_energy_fails() {
        let result = parse_oszicar_content("   1 F= garbage E0= -.5E+01  d E =-.5E+01\n");
        assert!(matches!(result, Err(ParseFailure::Malformed { .. })));
    }

    #[test]
    fn test_garbage_has_no_steps() {
        assert!(parse_oszicar_content("not an oszicar\n").unwrap().is_empty());
    }
}
