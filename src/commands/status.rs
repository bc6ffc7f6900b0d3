//! # status / rerun / report-status 命令实现
//!
//! ## 功能
//! - `status`: 终端表格显示各状态的数量、比例和逐目录原因，或以 YAML/JSON 输出
//! - `rerun`: 每行输出一个需要重新提交的目录，便于管道处理
//! - `report-status`: 写出 YAML/JSON 报告
//!
//! ## 依赖关系
//! - 使用 `cli/common.rs`, `cli/report.rs` 定义的参数
//! - 使用 `workflow/classifier.rs`, `workflow/driver.rs`
//! - 使用 `utils/output.rs`, `tabled`

use crate::batch::BatchRunner;
use crate::cli::common::ScanArgs;
use crate::cli::report::ReportArgs;
use crate::cli::status::StatusArgs;
use crate::error::Result;
use crate::models::StatusReport;
use crate::utils::output;
use crate::workflow::{ClassifierConfig, FolderClassifier, VaspWorkflow};

use tabled::{Table, Tabled};

/// 汇总表行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Folders")]
    count: usize,
    #[tabled(rename = "Fraction")]
    fraction: String,
}

/// 详情表行
#[derive(Debug, Clone, Tabled)]
struct DetailRow {
    #[tabled(rename = "Folder")]
    folder: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// 执行 status 命令
pub fn execute_status(args: StatusArgs) -> Result<()> {
    // 详情表已列出每个目录的原因
    let config = ClassifierConfig {
        quiet: true,
        ..args.scan.config()?
    };
    let classifier = FolderClassifier::new(config);
    let root = &args.scan.root;

    // 机器可读输出，不打印任何装饰
    if let Some(format) = args.format {
        print!("{}", classifier.dump_status(root, format)?);
        return Ok(());
    }

    output::print_header("VASP Calculation Status");
    output::print_info(&format!(
        "Scanning '{}' ({} criterion, {} workers)...",
        root.display(),
        classifier.config().policy,
        BatchRunner::new(classifier.config().jobs).jobs()
    ));

    let report = classifier.classify(root)?;
    if report.is_empty() {
        output::print_warning("No calculation folders found.");
        return Ok(());
    }

    println!("{}", Table::new(summary_rows(&report)));

    output::print_header("Folders");
    let details: Vec<DetailRow> = report
        .details()
        .iter()
        .map(|(name, d)| DetailRow {
            folder: name.clone(),
            status: d.status.to_string(),
            reason: d.reason.clone(),
        })
        .collect();
    println!("{}", Table::new(details));

    let rerun = report.to_rerun().len();
    if rerun == 0 {
        output::print_done(&format!("All {} folders finished", report.len()));
    } else {
        output::print_info(&format!("{} folders need (re)submission", rerun));
    }

    Ok(())
}

/// 执行 rerun 命令
pub fn execute_rerun(args: ScanArgs) -> Result<()> {
    let classifier = FolderClassifier::new(args.config()?);
    for folder in classifier.to_rerun(&args.root)? {
        println!("{}", folder);
    }
    Ok(())
}

/// 执行 report-status 命令
pub fn execute_report(args: ReportArgs) -> Result<()> {
    output::print_header("Status Report");

    let workflow = VaspWorkflow::new(&args.scan.root, args.scan.config()?);
    let report = workflow.report_status(&args.output, args.key_by)?;

    for row in summary_rows(&report) {
        output::print_info(&format!("{:<14} {:>5}  ({})", row.status, row.count, row.fraction));
    }

    Ok(())
}

fn summary_rows(report: &StatusReport) -> Vec<SummaryRow> {
    report
        .summary()
        .into_iter()
        .map(|(status, fraction)| SummaryRow {
            status: status.to_string(),
            count: report.list(status).len(),
            fraction: format!("{:.1}%", fraction * 100.0),
        })
        .collect()
}
