//! # run 命令实现
//!
//! 对需要重跑的目录（或 `--folder` 指定的单个目录）轮换 CONTCAR、提交作业并写入 done.txt。
//!
//! ## 依赖关系
//! - 使用 `cli/run.rs` 定义的参数
//! - 使用 `workflow/driver.rs`, `utils/slurm.rs`, `utils/output.rs`

use crate::batch::{BatchResult, ProcessResult};
use crate::cli::run::RunArgs;
use crate::error::{Result, WflError};
use crate::utils::output;
use crate::utils::slurm::Submitter;
use crate::workflow::VaspWorkflow;

/// 执行 run 命令
pub fn execute(args: RunArgs) -> Result<()> {
    output::print_header(if args.dry_run {
        "Job Submission (dry run)"
    } else {
        "Job Submission"
    });

    let workflow = VaspWorkflow::new(&args.scan.root, args.scan.config()?)
        .with_submitter(Submitter::new(&args.sbatch))
        .dry_run(args.dry_run);

    let result = match &args.folder {
        Some(folder) => {
            let mut result = BatchResult::default();
            result.merge(workflow.run(folder));
            result
        }
        None => workflow.run_all()?,
    };

    print_summary(&result);

    if result.failed > 0 {
        return Err(WflError::Other(format!(
            "{} of {} folders failed",
            result.failed,
            result.total()
        )));
    }

    Ok(())
}

fn print_summary(result: &BatchResult) {
    output::print_separator();
    output::print_info(&format!(
        "Total: {}, submitted: {}, skipped: {}, failed: {}",
        result.total(),
        result.success,
        result.skipped,
        result.failed
    ));

    for (name, err) in &result.failures {
        output::print_error(&format!("{}: {}", name, err));
    }
}
