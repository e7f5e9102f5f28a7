mod common;

use common::model_with_counts;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use wordforge::combined::{DictionaryHeader, MAX_FREQUENCY, MIN_FREQUENCY};
use wordforge::dict::MemorySpeller;
use wordforge::frequency::{ExportOptions, FrequencyModel};

fn expected_f(count: u64, min: u64, max: u64) -> u32 {
    let min_f = (min as f64).ln();
    let diff = ((max as f64).ln() - min_f).max(1.0);
    let scaled =
        ((count as f64).ln() - min_f) * (MAX_FREQUENCY - MIN_FREQUENCY) as f64 / diff
            + MIN_FREQUENCY as f64;
    scaled.round() as u32
}

// --- LOGARITHMIC SCALING ---

#[test]
fn test_extremes_map_to_band_edges() {
    let m = model_with_counts(&[("rare", 1), ("middling", 300), ("common", 90000)]);
    let list = m.export(ExportOptions::default());

    assert_eq!(list.words["rare"].f, MIN_FREQUENCY);
    assert_eq!(list.words["common"].f, MAX_FREQUENCY);
    assert_eq!(list.words["middling"].f, expected_f(300, 1, 90000));
}

#[test]
fn test_scaling_is_monotone_in_count() {
    let counts = [1u64, 2, 3, 10, 99, 1000, 12345, 400000];
    // Letter suffixes only: the export drops words containing digits.
    let rows: Vec<(String, u64)> = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| (format!("w{}", char::from(b'a' + i as u8)), c))
        .collect();
    let borrowed: Vec<(&str, u64)> = rows.iter().map(|(w, c)| (w.as_str(), *c)).collect();
    let m = model_with_counts(&borrowed);
    let list = m.export(ExportOptions::default());

    let fs: Vec<u32> = (0..counts.len())
        .map(|i| list.words[&format!("w{}", char::from(b'a' + i as u8))].f)
        .collect();
    for pair in fs.windows(2) {
        assert!(pair[0] <= pair[1], "frequencies out of order: {:?}", fs);
    }
    for (i, &count) in counts.iter().enumerate() {
        assert_eq!(fs[i], expected_f(count, 1, 400000));
    }
}

#[test]
fn test_equal_counts_collapse_to_the_minimum() {
    // With min == max the divisor clamps to 1 and everything scales to
    // the bottom of the band.
    let m = model_with_counts(&[("even", 7), ("steven", 7)]);
    let list = m.export(ExportOptions::default());

    assert_eq!(list.words["even"].f, MIN_FREQUENCY);
    assert_eq!(list.words["steven"].f, MIN_FREQUENCY);
}

#[test]
fn test_narrow_spread_stays_within_band() {
    let m = model_with_counts(&[("a", 10), ("b", 11), ("c", 12)]);
    let list = m.export(ExportOptions::default());

    for word in ["a", "b", "c"] {
        let f = list.words[word].f;
        assert!((MIN_FREQUENCY..=MAX_FREQUENCY).contains(&f));
    }
    // ln(11/10) over a clamped divisor of 1 lands well inside the band.
    assert_eq!(list.words["a"].f, MIN_FREQUENCY);
    assert!(list.words["b"].f > MIN_FREQUENCY);
    assert!(list.words["c"].f > list.words["b"].f);
}

// --- EXPORT FILTERS ---

#[test]
fn test_words_containing_digits_are_not_exported() {
    let m = model_with_counts(&[("4ever", 50), ("gr8", 50), ("great", 50)]);
    let list = m.export(ExportOptions::default());

    assert_eq!(list.word_count(), 1);
    assert!(list.words.contains_key("great"));
}

#[test]
fn test_empty_model_exports_empty_list() {
    let m = FrequencyModel::new().unwrap();
    let list = m.export(ExportOptions::default());
    assert_eq!(list.word_count(), 0);
}

#[test]
fn test_nosuggest_maps_to_possibly_offensive_when_enabled() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "the damn dam").unwrap();

    let mut speller = MemorySpeller::new();
    speller.add_word("the");
    speller.add_word("dam");
    speller.add_nosuggest("damn");
    let mut m = FrequencyModel::with_speller(Arc::new(speller)).unwrap();
    m.add_sentence_file(file.path(), false).unwrap();

    let with = m.export(ExportOptions::default());
    assert!(with.words["damn"].possibly_offensive);
    assert!(!with.words["dam"].possibly_offensive);

    let without = m.export(ExportOptions {
        add_nosuggest: false,
        ..Default::default()
    });
    assert!(!without.words["damn"].possibly_offensive);
}

// --- BIGRAM EXPORT ---

#[test]
fn test_bigrams_rank_dense_and_filter_rare_pairs() {
    let mut file = NamedTempFile::new().unwrap();
    for _ in 0..3 {
        writeln!(file, "hot soup today").unwrap();
    }
    writeln!(file, "hot tea today").unwrap();
    writeln!(file, "hot tea today").unwrap();
    writeln!(file, "hot stone").unwrap();

    let mut m = FrequencyModel::new().unwrap();
    m.add_sentence_file(file.path(), true).unwrap();
    let list = m.export(ExportOptions::default());

    // soup seen 3x, tea 2x, stone only once and therefore dropped.
    let bigrams = &list.words["hot"].bigrams;
    assert_eq!(bigrams.len(), 2);
    assert_eq!(bigrams["soup"], 1);
    assert_eq!(bigrams["tea"], 2);
}

#[test]
fn test_bigram_ties_rank_in_word_order() {
    let mut file = NamedTempFile::new().unwrap();
    for _ in 0..2 {
        writeln!(file, "cold rain").unwrap();
        writeln!(file, "cold air").unwrap();
    }

    let mut m = FrequencyModel::new().unwrap();
    m.add_sentence_file(file.path(), true).unwrap();
    let list = m.export(ExportOptions::default());

    let bigrams = &list.words["cold"].bigrams;
    assert_eq!(bigrams["air"], 1);
    assert_eq!(bigrams["rain"], 2);
}

#[test]
fn test_bigram_export_can_be_disabled() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "good morning").unwrap();
    writeln!(file, "good morning").unwrap();

    let mut m = FrequencyModel::new().unwrap();
    m.add_sentence_file(file.path(), true).unwrap();
    let list = m.export(ExportOptions {
        add_bigrams: false,
        ..Default::default()
    });

    assert!(list.words["good"].bigrams.is_empty());
}

#[test]
fn test_header_is_carried_into_the_list() {
    let m = model_with_counts(&[("hello", 5)]);
    let header = DictionaryHeader::with_date("en_US", "main", "test list", 18, 1_700_000_000);
    let list = m.export(ExportOptions {
        header: Some(header.clone()),
        ..Default::default()
    });

    assert_eq!(list.header, Some(header));
}
