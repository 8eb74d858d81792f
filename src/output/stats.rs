//! Statistics reporting.

use console::style;

use crate::download::RunStats;

/// Print end-of-run statistics.
pub fn print_run_stats(stats: &RunStats) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Run Statistics:").bold());
    println!("  Sources:   {}", stats.sources_processed);
    if stats.sources_failed > 0 {
        println!("  Failed:    {}", style(stats.sources_failed).red());
    }
    println!("  Archived:  {}", style(stats.processed).green());
    println!("  Skipped:   {} (already archived)", style(stats.skipped).yellow());
    if stats.media_failures > 0 {
        println!("  Media failures:  {}", style(stats.media_failures).red());
    }
    if stats.export_failures > 0 {
        println!("  Export failures: {}", style(stats.export_failures).red());
    }
    if stats.errored > 0 {
        println!("  Errored:   {}", style(stats.errored).red());
    }
    println!("{}", style("═".repeat(50)).dim());
}
