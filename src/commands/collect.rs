//! # collect-info 命令实现
//!
//! 收集全部 DONE 目录的能量、晶格和磁矩，写入 CSV（或 JSON）。
//!
//! ## 依赖关系
//! - 使用 `cli/collect.rs` 定义的参数
//! - 使用 `workflow/driver.rs`, `models/reference.rs`, `utils/output.rs`

use crate::cli::collect::CollectArgs;
use crate::error::Result;
use crate::models::ReferenceEnergies;
use crate::utils::output;
use crate::workflow::collector::SUCCESS;
use crate::workflow::VaspWorkflow;

/// 执行 collect-info 命令
pub fn execute(args: CollectArgs) -> Result<()> {
    output::print_header("Collecting Finished Calculations");

    let references = match &args.references {
        Some(path) => {
            let refs = ReferenceEnergies::load(path)?;
            output::print_info(&format!("Reference energies loaded from '{}'", path.display()));
            Some(refs)
        }
        None => None,
    };

    let workflow =
        VaspWorkflow::new(&args.scan.root, args.scan.config()?).with_references(references);
    let table = workflow.collect_info(&args.filename)?;

    if table.is_empty() {
        output::print_warning("No finished calculations found.");
        return Ok(());
    }

    let partial = table.rows().iter().filter(|r| r.reason != SUCCESS).count();
    if partial > 0 {
        output::print_warning(&format!(
            "{} of {} rows have missing fields (see the 'reason' column)",
            partial,
            table.len()
        ));
    }

    Ok(())
}
