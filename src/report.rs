//! The printed genre diversity report.
//!
//! `DiversityReport::build` does all the arithmetic up front; writing the
//! report only formats numbers that already exist. Each text section is
//! written on its own so a failure in one is logged and the rest still run.

use crate::diversity::{
    classify_shannon, classify_simpson, genre_count_distribution, multi_genre_percentage, tally,
    DiversityBand, DiversityIndex, DiversityResult, GenreCountDistribution, GenreCounts, TallyMode,
};
use crate::logging::LogState;
use anyhow::{anyhow, Context};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopGenre {
    pub genre: String,
    pub count: usize,
}

/// Diversity of one tally (overall or primary).
#[derive(Debug, Clone, Serialize)]
pub struct CategoryAnalysis {
    pub mode: TallyMode,
    #[serde(flatten)]
    pub result: DiversityResult,
    pub shannon_band: DiversityBand,
    pub simpson_band: DiversityBand,
    pub top_genres: Vec<TopGenre>,
    pub counts: GenreCounts,
}

impl CategoryAnalysis {
    pub fn new(records: &[Option<&str>], mode: TallyMode, top_n: usize) -> Self {
        let counts = tally(records.iter().copied(), mode);
        let result = DiversityResult::analyze(&counts);
        let top_genres = counts
            .most_common(top_n)
            .into_iter()
            .map(|(genre, count)| TopGenre {
                genre: genre.to_string(),
                count,
            })
            .collect();

        Self {
            mode,
            shannon_band: classify_shannon(result.normalized_shannon),
            simpson_band: classify_simpson(result.simpson),
            result,
            top_genres,
            counts,
        }
    }

    fn write<W: Write>(&self, out: &mut W, top_n: usize) -> io::Result<()> {
        let r = &self.result;
        writeln!(out, "\n{} Analysis:", self.mode.display_name())?;
        writeln!(out, "Total genre entries: {}", r.total_entries)?;
        writeln!(out, "Unique genres: {}", r.unique_genre_count)?;
        writeln!(out, "Shannon Diversity Index: {:.4}", r.shannon)?;
        writeln!(out, "Normalized Shannon Diversity Score: {:.4}", r.normalized_shannon)?;
        writeln!(
            out,
            "Explanation (Shannon): {}",
            self.shannon_band.explain(DiversityIndex::Shannon)
        )?;
        writeln!(out, "Simpson Diversity Index: {:.4}", r.simpson)?;
        writeln!(
            out,
            "Explanation (Simpson): {}",
            self.simpson_band.explain(DiversityIndex::Simpson)
        )?;

        writeln!(out, "\nTop {} Genres:", top_n)?;
        for top in &self.top_genres {
            writeln!(out, "{}: {}", top.genre, top.count)?;
        }
        Ok(())
    }
}

/// Verdict on a raw (non-normalized) index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplicationLevel {
    High,
    Moderate,
    Low,
}

impl ImplicationLevel {
    pub fn from_index(value: f64) -> Self {
        if value > 0.7 {
            ImplicationLevel::High
        } else if value > 0.5 {
            ImplicationLevel::Moderate
        } else {
            ImplicationLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiGenreUsage {
    Extensive,
    Moderate,
    Limited,
}

impl MultiGenreUsage {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage > 80.0 {
            MultiGenreUsage::Extensive
        } else if percentage > 50.0 {
            MultiGenreUsage::Moderate
        } else {
            MultiGenreUsage::Limited
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Implications {
    pub overall_shannon: ImplicationLevel,
    pub overall_simpson: ImplicationLevel,
    pub primary_shannon: ImplicationLevel,
    pub primary_simpson: ImplicationLevel,
    pub multi_genre_percentage: f64,
    pub multi_genre_usage: MultiGenreUsage,
}

impl Implications {
    pub fn new(
        overall: &DiversityResult,
        primary: &DiversityResult,
        distribution: &GenreCountDistribution,
    ) -> Self {
        let percentage = multi_genre_percentage(distribution);
        Self {
            overall_shannon: ImplicationLevel::from_index(overall.shannon),
            overall_simpson: ImplicationLevel::from_index(overall.simpson),
            primary_shannon: ImplicationLevel::from_index(primary.shannon),
            primary_simpson: ImplicationLevel::from_index(primary.simpson),
            multi_genre_percentage: percentage,
            multi_genre_usage: MultiGenreUsage::from_percentage(percentage),
        }
    }

    /// The five numbered statements, in print order.
    pub fn statements(&self) -> [&'static str; 5] {
        use ImplicationLevel::*;
        [
            match self.overall_shannon {
                High => "1. High Overall Shannon Diversity: Your library has a wide variety of genres.",
                Moderate => "1. Moderate Overall Shannon Diversity: Your library has a good mix of genres.",
                Low => "1. Low Overall Shannon Diversity: Your library is dominated by a few genres.",
            },
            match self.overall_simpson {
                High => "2. High Overall Simpson Diversity: Your library has a very even distribution of genres.",
                Moderate => "2. Moderate Overall Simpson Diversity: There's a good balance of genres.",
                Low => "2. Low Overall Simpson Diversity: A few genres dominate your library.",
            },
            match self.primary_shannon {
                High => "3. High Primary Genre Shannon Diversity: The main genres are well-distributed.",
                Moderate => "3. Moderate Primary Genre Shannon Diversity: There's a good spread of main genres.",
                Low => "3. Low Primary Genre Shannon Diversity: A few primary genres dominate.",
            },
            match self.primary_simpson {
                High => "4. High Primary Genre Simpson Diversity: Your primary genres are very evenly distributed.",
                Moderate => "4. Moderate Primary Genre Simpson Diversity: There's a good balance of primary genres.",
                Low => "4. Low Primary Genre Simpson Diversity: A few primary genres are much more common.",
            },
            match self.multi_genre_usage {
                MultiGenreUsage::Extensive => {
                    "5. Extensive Use of Multi-Genre Tagging: Most tracks have multiple genres."
                }
                MultiGenreUsage::Moderate => {
                    "5. Moderate Use of Multi-Genre Tagging: Many tracks have multiple genres."
                }
                MultiGenreUsage::Limited => "5. Limited Use of Multi-Genre Tagging.",
            },
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiversityReport {
    pub tracks: usize,
    pub top_n: usize,
    pub distribution: GenreCountDistribution,
    pub overall: CategoryAnalysis,
    pub primary: CategoryAnalysis,
    pub implications: Implications,
}

impl DiversityReport {
    pub fn build(records: &[Option<&str>], top_n: usize) -> Self {
        let distribution = genre_count_distribution(records.iter().copied());
        let overall = CategoryAnalysis::new(records, TallyMode::Overall, top_n);
        let primary = CategoryAnalysis::new(records, TallyMode::Primary, top_n);
        let implications = Implications::new(&overall.result, &primary.result, &distribution);

        Self {
            tracks: records.len(),
            top_n,
            distribution,
            overall,
            primary,
            implications,
        }
    }

    /// Print the human-readable report. Every section is attempted; failed
    /// sections are logged and reported together at the end.
    pub fn write_text<W: Write>(&self, out: &mut W, log: &LogState) -> anyhow::Result<()> {
        let mut failed = Vec::new();
        let mut record = |name: &'static str, result: io::Result<()>| {
            if let Err(e) = result {
                log.error(&format!("Error during {}: {}", name, e));
                failed.push(name);
            }
        };

        record("introduction", write_introduction(out));
        record("genre count distribution", self.write_distribution(out));
        record("Overall Genre analysis", self.overall.write(out, self.top_n));
        record("Primary Genre analysis", self.primary.write(out, self.top_n));
        record("implications", self.write_implications(out));

        if failed.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("Report sections failed: {}", failed.join(", ")))
        }
    }

    pub fn write_json<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self).context("Failed to serialize report")?;
        writeln!(out).context("Failed to write report")?;
        Ok(())
    }

    fn write_distribution<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\nDistribution of tracks by number of assigned genres:")?;
        for (genre_count, tracks) in self.distribution.iter() {
            let plural = if genre_count > 1 { "genres" } else { "genre" };
            writeln!(out, "{} {}: {} tracks", genre_count, plural, tracks)?;
        }
        Ok(())
    }

    fn write_implications<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\nImplications for Your Beets Library:")?;
        for statement in self.implications.statements() {
            writeln!(out, "{}", statement)?;
        }
        Ok(())
    }
}

fn write_introduction<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "About the Diversity Measures:")?;
    writeln!(out, "Shannon Diversity Index: Measures diversity by considering both the number of genres and their relative abundances.")?;
    writeln!(out, "Simpson Diversity Index: Focuses on the probability that two randomly selected items belong to different genres.\n")?;
    writeln!(out, "Difference Between Overall and Primary Genre Analysis:")?;
    writeln!(out, "Overall Genre Analysis: Considers all genres assigned to tracks, providing a comprehensive view of total genre diversity.")?;
    writeln!(out, "Primary Genre Analysis: Only considers the first genre assigned to each track, reflecting the main musical style.\n")?;
    Ok(())
}
