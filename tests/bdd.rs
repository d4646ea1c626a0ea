use genre_diversity_lib::diversity::{
    classify_shannon, genre_count_distribution, multi_genre_percentage, normalized_shannon,
    shannon, simpson, tally, DiversityBand, GenreCounts, TallyMode,
};

fn tags<'a>(values: &'a [&'a str]) -> Vec<Option<&'a str>> {
    values.iter().map(|v| Some(*v)).collect()
}

#[test]
fn given_mixed_records_when_tallied_overall_then_every_label_counts() {
    let records = tags(&["Rock", "Jazz,Blues", "Rock", ""]);
    let counts = tally(records, TallyMode::Overall);
    assert_eq!(counts.get("Rock"), 2);
    assert_eq!(counts.get("Jazz"), 1);
    assert_eq!(counts.get("Blues"), 1);
    assert_eq!(counts.len(), 3);
}

#[test]
fn given_mixed_records_when_tallied_primary_then_only_first_labels_count() {
    let records = tags(&["Rock", "Jazz,Blues", "Rock", ""]);
    let counts = tally(records, TallyMode::Primary);
    assert_eq!(counts.iter().collect::<Vec<_>>(), vec![("Rock", 2), ("Jazz", 1)]);
}

#[test]
fn given_one_genre_when_indices_are_computed_then_all_are_zero() {
    let counts: GenreCounts = [("A", 10)].into_iter().collect();
    assert_eq!(shannon(&counts), 0.0);
    assert_eq!(simpson(&counts), 0.0);
    assert_eq!(normalized_shannon(&counts), 0.0);
}

#[test]
fn given_two_equal_genres_when_indices_are_computed_then_entropy_is_maximal() {
    let counts: GenreCounts = [("A", 5), ("B", 5)].into_iter().collect();
    assert!((shannon(&counts) - 2f64.ln()).abs() < 1e-9);
    assert!((simpson(&counts) - 0.5).abs() < 1e-9);
    assert!((normalized_shannon(&counts) - 1.0).abs() < 1e-9);
}

#[test]
fn given_distribution_when_multi_genre_share_is_computed_then_only_two_and_three_count() {
    let mut records = Vec::new();
    records.extend(std::iter::repeat(Some("A")).take(10));
    records.extend(std::iter::repeat(Some("A,B")).take(5));
    records.extend(std::iter::repeat(Some("A,B,C")).take(5));
    let distribution = genre_count_distribution(records);
    assert!((multi_genre_percentage(&distribution) - 50.0).abs() < 1e-9);
}

#[test]
fn given_score_on_band_edge_when_classified_then_upper_band_wins() {
    assert_eq!(classify_shannon(0.2), DiversityBand::Low);
    assert_eq!(classify_shannon(0.19999), DiversityBand::VeryLow);
}

#[test]
fn given_no_records_when_analyzed_then_defaults_are_zero() {
    let none: Vec<Option<&str>> = vec![None, Some("")];
    let counts = tally(none.clone(), TallyMode::Overall);
    assert!(counts.is_empty());
    assert_eq!(shannon(&counts), 0.0);
    assert_eq!(simpson(&counts), 0.0);
    assert_eq!(multi_genre_percentage(&genre_count_distribution(none)), 0.0);
}
