//! Progress bar and the end-of-run summary table.

use indicatif::{ProgressBar, ProgressStyle};
use thumbsheet_core::{ProcessingStats, WrittenReport};

/// Create a progress bar for a run over `total` files.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .expect("valid progress template")
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table to stderr.
///
/// `written` is `None` for dry runs.
pub fn print_summary(stats: &ProcessingStats, written: Option<&WrittenReport>) {
    let mb_read = stats.total_bytes as f64 / 1_000_000.0;

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Images:       {:>8}", stats.succeeded);
    if stats.skipped > 0 {
        eprintln!("    Skipped:      {:>8}", stats.skipped);
    }
    eprintln!("    Pages:        {:>8}", stats.pages);
    eprintln!("  ------------------------------------");
    eprintln!("    Read:         {:>7.1} MB", mb_read);
    eprintln!("    Duration:     {:>7.1}s", stats.total_seconds);
    eprintln!("    Rate:         {:>7.1} img/sec", stats.images_per_second());
    match written {
        Some(report) => {
            eprintln!("    PDF size:     {:>7.1} MB", report.bytes as f64 / 1_000_000.0);
            eprintln!("    Output:       {}", report.path.display());
        }
        None => eprintln!("    Output:       (dry run, nothing written)"),
    }
    eprintln!("  ====================================");
}
