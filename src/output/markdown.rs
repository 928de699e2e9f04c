//! Markdown export of the run report

use crate::crawler::AbandonReason;
use crate::output::report::CrawlReport;
use crate::output::{ensure_parent_dir, OutputResult};
use crate::state::TaskState;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the report as markdown to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to create or write the file
pub fn write_markdown_report(report: &CrawlReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    ensure_parent_dir(output_path)?;
    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats the report as markdown
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Review Crawl: {}\n\n", report.display_name));

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Resource**: {}\n", report.resource));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        report.duration_seconds()
    ));
    md.push_str(&format!("- **Output**: {}\n\n", report.output_path.display()));

    md.push_str("## Overall Statistics\n\n");
    if let Some(total) = report.total_items {
        md.push_str(&format!("- **Reviews on Site**: {}\n", total));
    }
    md.push_str(&format!("- **Pages**: {}\n", report.page_count));
    md.push_str(&format!("- **Rows Written**: {}\n", report.rows_written));
    md.push_str(&format!("- **Retries**: {}\n", report.total_retries()));
    md.push_str(&format!("- **Final Backoff**: {}s\n\n", report.final_backoff));

    md.push_str("## Page Outcomes\n\n");
    md.push_str("| Outcome | Pages |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!(
        "| Succeeded | {} |\n",
        report.count_state(TaskState::Succeeded)
    ));
    for reason in [
        AbandonReason::Blocked,
        AbandonReason::Interrupted,
        AbandonReason::RetriesExhausted,
    ] {
        md.push_str(&format!(
            "| Abandoned ({}) | {} |\n",
            reason,
            report.count_reason(reason)
        ));
    }
    md.push_str(&format!(
        "| Aborted | {} |\n\n",
        report.count_state(TaskState::Aborted)
    ));

    if report.is_partial() {
        md.push_str("## Pages Without Records\n\n");
        md.push_str("| Page | Outcome | Attempts |\n");
        md.push_str("|------|---------|----------|\n");
        for page in report
            .pages
            .iter()
            .filter(|p| p.state != TaskState::Succeeded)
        {
            let outcome = match page.reason {
                Some(reason) => format!("{} ({})", page.state, reason),
                None => page.state.to_string(),
            };
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                page.page_index, outcome, page.attempts
            ));
        }
        md.push('\n');
    }

    md
}
