//! Genre counting and diversity indices.
//!
//! Everything in here is a pure function of its input. The two places that
//! could divide by zero (an empty tally and a tally with a single genre) are
//! guarded and return `0.0`.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, HashMap};

const LABEL_SEPARATOR: char = ',';

/// Which labels of a genre tag are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TallyMode {
    /// Every comma-separated label.
    Overall,
    /// Only the text before the first comma.
    Primary,
}

impl TallyMode {
    pub fn display_name(self) -> &'static str {
        match self {
            TallyMode::Overall => "Overall Genre",
            TallyMode::Primary => "Primary Genre",
        }
    }
}

/// Occurrence count per genre label, iterated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreCounts {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl GenreCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str) {
        self.add_n(label, 1);
    }

    pub fn add_n(&mut self, label: &str, n: usize) {
        match self.index.get(label) {
            Some(&pos) => self.entries[pos].1 += n,
            None => {
                self.index.insert(label.to_string(), self.entries.len());
                self.entries.push((label.to_string(), n));
            }
        }
    }

    pub fn get(&self, label: &str) -> usize {
        self.index
            .get(label)
            .map(|&pos| self.entries[pos].1)
            .unwrap_or(0)
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(label, c)| (label.as_str(), *c))
    }

    fn values(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|(_, c)| *c)
    }

    /// The `n` most frequent labels by descending count. Ties keep the order
    /// in which the labels were first seen.
    pub fn most_common(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self.iter().collect();
        // sort_by is stable, which is what keeps the first-seen tie order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

impl<'a> FromIterator<(&'a str, usize)> for GenreCounts {
    fn from_iter<I: IntoIterator<Item = (&'a str, usize)>>(iter: I) -> Self {
        let mut counts = GenreCounts::new();
        for (label, n) in iter {
            counts.add_n(label, n);
        }
        counts
    }
}

impl Serialize for GenreCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, count) in &self.entries {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

fn non_empty<'a, I>(records: I) -> impl Iterator<Item = &'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    records.into_iter().flatten().filter(|tag| !tag.is_empty())
}

/// Count genre labels across `records`. Absent and empty tags are skipped.
/// Labels are not trimmed.
pub fn tally<'a, I>(records: I, mode: TallyMode) -> GenreCounts
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts = GenreCounts::new();
    for tag in non_empty(records) {
        match mode {
            TallyMode::Overall => tag.split(LABEL_SEPARATOR).for_each(|label| counts.add(label)),
            TallyMode::Primary => {
                let primary = tag.split(LABEL_SEPARATOR).next().unwrap_or(tag);
                counts.add(primary);
            }
        }
    }
    counts
}

/// Shannon index `-Σ p·ln(p)`. Returns 0 for an empty tally.
pub fn shannon(counts: &GenreCounts) -> f64 {
    let total = counts.total();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts.values().fold(0.0, |acc, c| {
        let p = c as f64 / total;
        acc - p * p.ln()
    })
}

/// Simpson index `1 - Σ p²`. Returns 0 for an empty tally.
pub fn simpson(counts: &GenreCounts) -> f64 {
    let total = counts.total();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let dominance: f64 = counts
        .values()
        .map(|c| {
            let p = c as f64 / total;
            p * p
        })
        .sum();
    1.0 - dominance
}

/// Shannon index divided by `ln(unique genres)`; 0 with fewer than two genres.
pub fn normalized_shannon(counts: &GenreCounts) -> f64 {
    let unique = counts.len();
    if unique <= 1 {
        return 0.0;
    }
    shannon(counts) / (unique as f64).ln()
}

/// Which index a band explanation talks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiversityIndex {
    Shannon,
    Simpson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiversityBand {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl DiversityBand {
    /// Bands are right-exclusive: 0.2 is `Low`, not `VeryLow`.
    pub fn from_score(score: f64) -> Self {
        if score < 0.2 {
            DiversityBand::VeryLow
        } else if score < 0.4 {
            DiversityBand::Low
        } else if score < 0.6 {
            DiversityBand::Moderate
        } else if score < 0.8 {
            DiversityBand::High
        } else {
            DiversityBand::VeryHigh
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DiversityBand::VeryLow => "very low",
            DiversityBand::Low => "low",
            DiversityBand::Moderate => "moderate",
            DiversityBand::High => "high",
            DiversityBand::VeryHigh => "very high",
        }
    }

    pub fn explain(self, index: DiversityIndex) -> &'static str {
        match (index, self) {
            (DiversityIndex::Shannon, DiversityBand::VeryLow) => {
                "Very low diversity. The library is dominated by a few genres."
            }
            (DiversityIndex::Shannon, DiversityBand::Low) => {
                "Low diversity. A small number of genres make up most of the library."
            }
            (DiversityIndex::Shannon, DiversityBand::Moderate) => {
                "Moderate diversity. There's a mix of genres, but some dominate."
            }
            (DiversityIndex::Shannon, DiversityBand::High) => {
                "High diversity. The library has a good spread across many genres."
            }
            (DiversityIndex::Shannon, DiversityBand::VeryHigh) => {
                "Very high diversity. Genres are very evenly distributed across the library."
            }
            (DiversityIndex::Simpson, DiversityBand::VeryLow) => {
                "Very low diversity. One or two genres heavily dominate the library."
            }
            (DiversityIndex::Simpson, DiversityBand::Low) => {
                "Low diversity. A few genres make up the vast majority of the library."
            }
            (DiversityIndex::Simpson, DiversityBand::Moderate) => {
                "Moderate diversity. There's a mix of genres, but some are significantly more common than others."
            }
            (DiversityIndex::Simpson, DiversityBand::High) => {
                "High diversity. The library has a good balance of genres with no single genre overly dominant."
            }
            (DiversityIndex::Simpson, DiversityBand::VeryHigh) => {
                "Very high diversity. Genres are very evenly represented, with no clear dominant genres."
            }
        }
    }
}

pub fn classify_shannon(normalized_score: f64) -> DiversityBand {
    DiversityBand::from_score(normalized_score)
}

pub fn classify_simpson(score: f64) -> DiversityBand {
    DiversityBand::from_score(score)
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct DiversityResult {
    pub shannon: f64,
    pub simpson: f64,
    pub normalized_shannon: f64,
    pub unique_genre_count: usize,
    pub total_entries: usize,
}

impl DiversityResult {
    pub fn analyze(counts: &GenreCounts) -> Self {
        Self {
            shannon: shannon(counts),
            simpson: simpson(counts),
            normalized_shannon: normalized_shannon(counts),
            unique_genre_count: counts.len(),
            total_entries: counts.total(),
        }
    }
}

/// Number of records per "labels on one record" value, ascending by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct GenreCountDistribution(BTreeMap<usize, usize>);

impl GenreCountDistribution {
    pub fn get(&self, genre_count: usize) -> usize {
        self.0.get(&genre_count).copied().unwrap_or(0)
    }

    /// Number of records counted.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(usize, usize)> for GenreCountDistribution {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        let mut map = BTreeMap::new();
        for (genre_count, records) in iter {
            *map.entry(genre_count).or_insert(0) += records;
        }
        GenreCountDistribution(map)
    }
}

/// Tally how many non-empty records carry each number of labels.
/// `"Rock,Rock"` has two labels; nothing is trimmed or deduplicated.
pub fn genre_count_distribution<'a, I>(records: I) -> GenreCountDistribution
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    non_empty(records)
        .map(|tag| (tag.split(LABEL_SEPARATOR).count(), 1))
        .collect()
}

/// Share of records with exactly two or three labels, as a percentage.
///
/// Records with four or more labels are not part of the numerator. An empty
/// distribution yields 0.
pub fn multi_genre_percentage(distribution: &GenreCountDistribution) -> f64 {
    let total = distribution.total();
    if total == 0 {
        return 0.0;
    }
    let multi = distribution.get(2) + distribution.get(3);
    100.0 * multi as f64 / total as f64
}
