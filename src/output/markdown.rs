//! Markdown ranking report
//!
//! Writes a human-readable summary of the last crawl session: how it was
//! configured, what it did, and the resulting rank table.

use crate::crawler::CrawlStatus;
use crate::output::stats::GraphStatistics;
use crate::output::OutputResult;
use crate::storage::RankedNode;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Everything that goes into a ranking report
#[derive(Debug, Clone)]
pub struct RankingReport {
    pub generated_at: DateTime<Utc>,
    pub config_hash: Option<String>,
    pub seeds: Vec<String>,
    /// Final snapshot of the session, absent when exporting a stored graph
    pub session: Option<CrawlStatus>,
    pub statistics: GraphStatistics,
    /// Nodes in the exporter's order (lowest rank first)
    pub pages: Vec<RankedNode>,
}

impl RankingReport {
    pub fn new(statistics: GraphStatistics, pages: Vec<RankedNode>) -> Self {
        Self {
            generated_at: Utc::now(),
            config_hash: None,
            seeds: Vec::new(),
            session: None,
            statistics,
            pages,
        }
    }
}

/// Writes the report to `output_path`, replacing any existing file
pub fn generate_markdown_report(report: &RankingReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

pub fn format_markdown_report(report: &RankingReport) -> String {
    let mut md = String::new();

    md.push_str("# Ripple-Rank Report\n\n");

    md.push_str("## Session\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        report.generated_at.to_rfc3339()
    ));
    if let Some(hash) = &report.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    if let Some(session) = &report.session {
        if let Some(started) = session.started_at {
            md.push_str(&format!("- **Started**: {}\n", started.to_rfc3339()));
        }
        if let Some(depth) = session.max_depth {
            md.push_str(&format!("- **Max Depth**: {}\n", depth));
        }
        md.push_str(&format!("- **Pages Fetched**: {}\n", session.pages_fetched));
        md.push_str(&format!("- **Fetch Failures**: {}\n", session.fetch_failures));
        md.push_str(&format!("- **Links Recorded**: {}\n", session.links_recorded));
        md.push_str(&format!("- **URLs Visited**: {}\n", session.visited));
    }
    md.push('\n');

    if !report.seeds.is_empty() {
        md.push_str("## Seeds\n\n");
        for seed in &report.seeds {
            md.push_str(&format!("- {}\n", seed));
        }
        md.push('\n');
    }

    md.push_str("## Graph Statistics\n\n");
    md.push_str(&format!("- **Pages**: {}\n", report.statistics.node_count));
    md.push_str(&format!("- **Links**: {}\n", report.statistics.edge_count));
    if let (Some(low), Some(high)) = (
        report.statistics.lowest_rank,
        report.statistics.highest_rank,
    ) {
        md.push_str(&format!("- **Rank Range**: {:.6} to {:.6}\n", low, high));
    }
    md.push('\n');

    md.push_str("## Ranked Pages\n\n");
    if report.pages.is_empty() {
        md.push_str("No pages were recorded.\n");
        return md;
    }

    md.push_str("Ordered from lowest to highest rank. Ranks are a single-pass approximation.\n\n");
    md.push_str("| # | URL | Rank |\n");
    md.push_str("|---|-----|------|\n");
    for (i, page) in report.pages.iter().enumerate() {
        md.push_str(&format!(
            "| {} | {} | {:.6} |\n",
            i + 1,
            escape_cell(&page.url),
            page.rank
        ));
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
