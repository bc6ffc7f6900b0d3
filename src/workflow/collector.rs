//! # 结果收集器
//!
//! 对每个 DONE 目录独立提取一组字段，汇总成一张表。
//!
//! ## 功能
//! - 每个字段由独立的解析器提取，失败时该单元格为空，原因记入 `reason` 列
//! - 任何目录都不会因为单个字段失败而被丢弃
//! - 行按目录名排序；列顺序固定，元素计数列按符号排序追加在末尾
//! - 输出 CSV（默认）或 JSON（扩展名为 `.json` 时）
//! - 提供元素参考能量时计算每原子形成能
//!
//! ## 依赖关系
//! - 被 `workflow/driver.rs` 使用
//! - 使用 `workflow/classifier.rs` 选出 DONE 目录
//! - 使用 `parsers/` 字段解析器, `models/record.rs`, `models/reference.rs`
//! - 使用 `csv`, `serde_json` 序列化

use super::classifier::FolderClassifier;
use crate::batch::BatchRunner;
use crate::error::{ParseResult, Result, WflError};
use crate::models::record::FIXED_COLUMNS;
use crate::models::{CollectedRow, ReferenceEnergies, WorkStatus, Workdir};
use crate::parsers::{
    EnergyParser, MagnetizationParser, MagnetizationSource, OszicarParser, StructureParser,
    WorkdirParser,
};
use crate::utils::output;

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;

/// 全部字段提取成功时的 `reason`
pub const SUCCESS: &str = "Success";

/// 收集结果表
#[derive(Debug, Clone, Default)]
pub struct CollectedTable {
    rows: Vec<CollectedRow>,
}

impl CollectedTable {
    /// 行按目录名排序
    pub fn new(mut rows: Vec<CollectedRow>) -> Self {
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        CollectedTable { rows }
    }

    pub fn rows(&self) -> &[CollectedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 所有行中出现过的元素，按符号排序
    pub fn element_columns(&self) -> Vec<String> {
        self.rows
            .iter()
            .flat_map(|r| r.composition.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 完整表头
    pub fn headers(&self) -> Vec<String> {
        FIXED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.element_columns())
            .collect()
    }

    /// 以 CSV 写入任意输出
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let elements = self.element_columns();
        let mut wtr = csv::Writer::from_writer(writer);

        wtr.write_record(self.headers())?;
        for row in &self.rows {
            let mut cells = row.fixed_cells();
            cells.extend(elements.iter().map(|el| {
                row.composition
                    .get(el)
                    .map(|n| n.to_string())
                    .unwrap_or_default()
            }));
            wtr.write_record(&cells)?;
        }

        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// JSON 数组，缺失值为 `null`
    pub fn to_json(&self) -> Result<String> {
        let mut s = serde_json::to_string_pretty(&self.rows)?;
        s.push('\n');
        Ok(s)
    }

    /// 写入文件：`.json` 扩展名输出 JSON，其余输出 CSV
    pub fn save(&self, path: &Path) -> Result<()> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let write_err = |e| WflError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        };

        if is_json {
            fs::write(path, self.to_json()?).map_err(write_err)
        } else {
            let file = fs::File::create(path).map_err(write_err)?;
            self.write_csv(file)
        }
    }
}

/// 结果收集器
#[derive(Debug, Clone, Default)]
pub struct ResultCollector {
    classifier: FolderClassifier,
    references: Option<ReferenceEnergies>,
}

impl ResultCollector {
    pub fn new(classifier: FolderClassifier) -> Self {
        ResultCollector {
            classifier,
            references: None,
        }
    }

    /// 用于形成能列的元素参考能量
    pub fn with_references(mut self, references: Option<ReferenceEnergies>) -> Self {
        self.references = references;
        self
    }

    /// 分类 `root` 下的目录并收集全部 DONE 目录
    pub fn collect(&self, root: &Path) -> Result<CollectedTable> {
        let workdirs = self.classifier.discover(root)?;
        let report = self.classifier.classify_all(&workdirs);

        let done: Vec<Workdir> = workdirs
            .into_iter()
            .filter(|wd| report.status_of(wd.name()) == Some(WorkStatus::Done))
            .collect();

        let references = self.references.as_ref();
        let rows = BatchRunner::new(self.classifier.config().jobs)
            .map(&done, "Collecting", |wd| collect_row(wd, references));
        let table = CollectedTable::new(rows);

        if !self.classifier.config().quiet {
            for row in table.rows().iter().filter(|r| r.reason != SUCCESS) {
                output::print_folder_warning(&row.name, &row.reason);
            }
        }

        Ok(table)
    }
}

/// 失败字段的描述
#[derive(Default)]
struct Notes(Vec<String>);

impl Notes {
    /// 取出值；失败时记录原因。`quiet_missing` 为真时文件缺失不记录
    fn take<T>(&mut self, field: &str, result: ParseResult<T>, quiet_missing: bool) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) if quiet_missing && e.is_missing() => None,
            Err(e) => {
                self.0.push(format!("{}: {}", field, e));
                None
            }
        }
    }

    fn into_reason(self) -> String {
        if self.0.is_empty() {
            SUCCESS.to_string()
        } else {
            self.0.join("; ")
        }
    }
}

/// 提取单个目录的一行，永不失败
pub fn collect_row(workdir: &Workdir, references: Option<&ReferenceEnergies>) -> CollectedRow {
    let abs_path = StructureParser::source_file(workdir)
        .map(|f| workdir.file(f))
        .unwrap_or_else(|| workdir.path().to_path_buf());
    let abs_path = fs::canonicalize(&abs_path).unwrap_or(abs_path);

    let mut row = CollectedRow::new(workdir.name(), abs_path.display().to_string());
    let mut notes = Notes::default();

    if let Some(s) = notes.take("structure", StructureParser.parse(workdir), false) {
        let (a, b, c, alpha, beta, gamma) = s.lattice.parameters();
        row.formula = Some(s.formula());
        row.natoms = Some(s.natoms());
        row.a = Some(a);
        row.b = Some(b);
        row.c = Some(c);
        row.alpha = Some(alpha);
        row.beta = Some(beta);
        row.gamma = Some(gamma);
        row.volume = Some(s.volume());
        row.composition = s.composition();
    }

    let steps = notes.take("energy", OszicarParser.parse(workdir), false);
    match steps.as_deref().and_then(|s| s.last()) {
        Some(last) => {
            row.free_energy = Some(last.free_energy);
            row.energy_sigma0 = last.energy_sigma0;
        }
        None if steps.is_some() => notes.0.push("energy: no ionic steps in OSZICAR".to_string()),
        None => {}
    }

    row.energy_outcar = notes.take("energy_outcar", EnergyParser.parse(workdir), false);

    // 非自旋极化计算没有磁矩，不视为失败
    row.tot_mag_outcar = notes.take(
        "tot_mag_outcar",
        MagnetizationParser::new(MagnetizationSource::Outcar).parse(workdir),
        true,
    );
    row.tot_mag_oszicar = notes.take(
        "tot_mag_oszicar",
        MagnetizationParser::new(MagnetizationSource::Oszicar).parse(workdir),
        true,
    );

    row.magnetization = match (row.tot_mag_outcar, row.volume) {
        (Some(m), Some(v)) if v > 0.0 => Some(m / v),
        _ => None,
    };
    row.energy_per_atom = match (row.free_energy, row.natoms) {
        (Some(f), Some(n)) if n > 0 => Some(f / n as f64),
        _ => None,
    };

    if let (Some(refs), Some(f)) = (references, row.free_energy) {
        if !row.composition.is_empty() {
            match refs.formation_energy_per_atom(f, &row.composition) {
                Ok(ef) => row.formation_energy_per_atom = Some(ef),
                Err(e) => notes.0.push(format!("formation_energy: {}", e)),
            }
        }
    }

    row.reason = notes.into_reason();
    row
}
