use std::io::Write;
use tempfile::NamedTempFile;
use wordforge::frequency::FrequencyModel;

/// Builds a model through the word-count channel, so tests control every
/// occurrence count exactly.
pub fn model_with_counts(rows: &[(&str, u64)]) -> FrequencyModel {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "word,count").unwrap();
    for (word, count) in rows {
        writeln!(file, "{},{}", word, count).unwrap();
    }
    let mut model = FrequencyModel::new().unwrap();
    model.add_word_count_file(file.path()).unwrap();
    model
}
