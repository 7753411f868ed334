//! `civman storage`: disk usage of the destination root.

use anyhow::Result;
use civman_catalog::{StorageReport, storage_usage};
use civman_core::format_size;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::print_separator;

/// Execute the storage command.
pub fn execute(ctx: &CliContext) -> Result<()> {
    let root = ctx.destination_root()?;
    let report = storage_usage(&root).map_err(CliError::from)?;
    println!("Storage for {}", root.display());
    print_separator(40);
    for line in report_lines(&report) {
        println!("{line}");
    }
    Ok(())
}

/// One formatted line per group, then the totals.
pub fn report_lines(report: &StorageReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .groups
        .iter()
        .map(|(group, bytes)| format!("{:<14} {:>12}", group.label(), format_size(*bytes)))
        .collect();
    lines.push(format!(
        "{:<14} {:>12}",
        "Models total",
        format_size(report.used_by_models())
    ));
    lines.push(format!("{:<14} {:>12}", "Disk free", format_size(report.available)));
    lines.push(format!("{:<14} {:>12}", "Disk size", format_size(report.total)));
    lines
}
