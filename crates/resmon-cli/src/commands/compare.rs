//! Compare command

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use resmon_core::{compare_analyses, load_report};

use super::Context;
use crate::output::{print_comparison, print_info, OutputFormat};

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Earlier report
    pub previous: PathBuf,

    /// Later report
    pub current: PathBuf,
}

pub async fn execute(ctx: &Context, args: CompareArgs) -> Result<()> {
    let previous = load_report(&args.previous)
        .with_context(|| format!("failed to read report {}", args.previous.display()))?;
    let current = load_report(&args.current)
        .with_context(|| format!("failed to read report {}", args.current.display()))?;

    print_info(
        &format!(
            "Comparing {} ({}) with {} ({})",
            args.previous.display(),
            previous.metadata.start_time.format("%Y-%m-%d %H:%M:%S UTC"),
            args.current.display(),
            current.metadata.start_time.format("%Y-%m-%d %H:%M:%S UTC"),
        ),
        ctx.quiet || ctx.format == OutputFormat::Json,
    );

    let rows = compare_analyses(&previous.analysis, &current.analysis);
    print_comparison(&rows, ctx.format)?;

    Ok(())
}
