pub mod config;
pub mod db;
pub mod diversity;
pub mod error;
pub mod library_parser;
pub mod logging;
pub mod metadata;
pub mod models;
pub mod report;
pub mod source;

use anyhow::Context;
use config::Settings;
use logging::LogState;
use models::genre_records;
use report::DiversityReport;
use source::LibrarySource;
use std::io::Write;

/// Load the configured library and write its diversity report to `out`.
pub fn run<W: Write>(settings: &Settings, log: &LogState, out: &mut W) -> anyhow::Result<()> {
    let source = LibrarySource::from_settings(settings);
    let tracks = source
        .load_tracks(log)
        .with_context(|| format!("Failed to load {}", source.describe()))?;

    let records = genre_records(&tracks);
    let report = DiversityReport::build(&records, settings.top_genres);
    for category in [&report.overall, &report.primary] {
        log.debug(&format!(
            "{}: {} entries, {} genres, shannon {}, simpson {}",
            category.mode.display_name(),
            category.result.total_entries,
            category.result.unique_genre_count,
            category.shannon_band.label(),
            category.simpson_band.label(),
        ));
    }

    if settings.json {
        report.write_json(out)?;
    } else {
        report.write_text(out, log)?;
    }
    out.flush().context("Failed to flush report")?;
    Ok(())
}
