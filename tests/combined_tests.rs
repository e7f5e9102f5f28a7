use std::io::Cursor;
use wordforge::combined::{
    DictionaryHeader, WordAttributes, WordlistCombined, SHORTCUT_WHITELIST,
};
use wordforge::error::WordForgeError;

fn sample_list() -> WordlistCombined {
    let header = DictionaryHeader::with_date("en_US", "main", "my words", 18, 1_700_000_000);
    let mut list = WordlistCombined::new(Some(header));

    let mut hi = WordAttributes::with_frequency(212);
    hi.bigrams.insert("there".to_string(), 1);
    hi.set_shortcut("hello", SHORTCUT_WHITELIST);
    list.words.insert("hi".to_string(), hi);

    list.words
        .insert("there".to_string(), WordAttributes::with_frequency(254));

    let mut thx = WordAttributes::with_frequency(10);
    thx.not_a_word = true;
    thx.set_unknown("flags", "medical");
    list.words.insert("thx".to_string(), thx);

    list
}

fn write_to_string(list: &WordlistCombined) -> String {
    let mut out = Vec::new();
    list.write_to(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn read_from_str(text: &str) -> Result<WordlistCombined, WordForgeError> {
    WordlistCombined::read_from(Cursor::new(text))
}

// --- SERIALIZATION ---

#[test]
fn test_write_produces_the_combined_line_format() {
    let expected = "\
dictionary=main:en_us,locale=en_US,description=my words,date=1700000000,version=18
 word=there,f=254
 word=hi,f=212
  bigram=there,f=1
  shortcut=hello,f=whitelist
 word=thx,f=10,not_a_word=true,flags=medical
";
    assert_eq!(write_to_string(&sample_list()), expected);
}

#[test]
fn test_words_sort_by_falling_frequency_with_stable_ties() {
    let mut list = WordlistCombined::new(None);
    list.words
        .insert("zebra".to_string(), WordAttributes::with_frequency(30));
    list.words
        .insert("aardvark".to_string(), WordAttributes::with_frequency(30));
    list.words
        .insert("koala".to_string(), WordAttributes::with_frequency(99));

    let text = write_to_string(&list);
    let words: Vec<&str> = text
        .lines()
        .filter_map(|l| l.strip_prefix(" word="))
        .collect();
    assert_eq!(words, ["koala,f=99", "aardvark,f=30", "zebra,f=30"]);
}

#[test]
fn test_round_trip_preserves_everything() {
    let list = sample_list();
    let reread = read_from_str(&write_to_string(&list)).unwrap();
    assert_eq!(reread, list);
}

#[test]
fn test_gzip_round_trip_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let gz_path = dir.path().join("list.combined.gz");
    let plain_path = dir.path().join("list.combined");
    let list = sample_list();

    list.write_to_path(&gz_path).unwrap();
    list.write_to_path(&plain_path).unwrap();

    // The gz variant must actually be compressed, not just renamed.
    let raw = std::fs::read(&gz_path).unwrap();
    assert_eq!(&raw[..2], &[0x1f, 0x8b]);

    assert_eq!(WordlistCombined::read_from_path(&gz_path).unwrap(), list);
    assert_eq!(WordlistCombined::read_from_path(&plain_path).unwrap(), list);
}

// --- PARSING ---

#[test]
fn test_unknown_attributes_round_trip_in_order() {
    // No backslash continuation here: it would also strip the mandatory
    // leading space of the word line.
    let text = " word=cheese,f=80,originalFreq=212,flags=abbreviation\n";
    let list = read_from_str(text).unwrap();
    let attrs = &list.words["cheese"];
    assert_eq!(
        attrs.unknown,
        vec![
            ("originalFreq".to_string(), "212".to_string()),
            ("flags".to_string(), "abbreviation".to_string()),
        ]
    );
    assert_eq!(write_to_string(&list), text);
}

#[test]
fn test_explicit_false_flags_are_kept_as_unknown_attributes() {
    // Only the "=true" spellings map onto the boolean fields.
    let list = read_from_str(" word=maybe,f=5,not_a_word=false\n").unwrap();
    let attrs = &list.words["maybe"];
    assert!(!attrs.not_a_word);
    assert_eq!(
        attrs.unknown,
        vec![("not_a_word".to_string(), "false".to_string())]
    );
}

#[test]
fn test_second_frequency_field_lands_in_unknown() {
    let list = read_from_str(" word=twice,f=5,f=9\n").unwrap();
    let attrs = &list.words["twice"];
    assert_eq!(attrs.f, 5);
    assert_eq!(attrs.unknown, vec![("f".to_string(), "9".to_string())]);
}

#[test]
fn test_unrecognized_lines_are_skipped() {
    let text = "\
# a comment some tool left behind
 word=real,f=31

junk line
";
    let list = read_from_str(text).unwrap();
    assert_eq!(list.word_count(), 1);
    assert_eq!(list.words["real"].f, 31);
}

#[test]
fn test_bigrams_and_shortcuts_attach_to_the_preceding_word() {
    // No backslash continuation here: it would also strip the mandatory
    // leading space of the first word line.
    let text = " word=ice,f=100
  bigram=cream,f=1
  bigram=cold,f=2
  shortcut=icy,f=14
 word=cream,f=90
";
    let list = read_from_str(text).unwrap();
    assert_eq!(list.words["ice"].bigrams["cream"], 1);
    assert_eq!(list.words["ice"].bigrams["cold"], 2);
    assert_eq!(
        list.words["ice"].shortcuts,
        vec![("icy".to_string(), "14".to_string())]
    );
    assert!(list.words["cream"].bigrams.is_empty());
    assert_eq!(list.bigram_count(), 2);
}

// --- HARD FAILURES ---

#[test]
fn test_word_without_frequency_fails() {
    let err = read_from_str(" word=floating\n").unwrap_err();
    assert!(matches!(err, WordForgeError::Format(_)));
}

#[test]
fn test_word_with_unparsable_frequency_fails() {
    let err = read_from_str(" word=fuzzy,f=lots\n").unwrap_err();
    assert!(matches!(err, WordForgeError::Format(_)));
}

#[test]
fn test_bigram_before_any_word_fails() {
    let err = read_from_str("  bigram=orphan,f=1\n").unwrap_err();
    assert!(matches!(err, WordForgeError::Format(_)));
}

#[test]
fn test_header_without_locale_fails() {
    let text = "\
dictionary=main:en,description=x,date=1,version=18
 word=a,f=1
";
    let err = read_from_str(text).unwrap_err();
    assert!(matches!(err, WordForgeError::Format(_)));
}

#[test]
fn test_header_type_without_locale_tail_fails() {
    let text = "dictionary=main,locale=en,description=x,date=1,version=18\n";
    let err = read_from_str(text).unwrap_err();
    assert!(matches!(err, WordForgeError::Format(_)));
}

// --- GERMAN MARKER ---

#[test]
fn test_german_lists_carry_the_umlaut_marker_end_to_end() {
    let header = DictionaryHeader::with_date("de_DE", "main", "wortliste", 18, 1_700_000_000);
    let mut list = WordlistCombined::new(Some(header));
    list.words
        .insert("straße".to_string(), WordAttributes::with_frequency(120));

    let text = write_to_string(&list);
    assert!(text
        .lines()
        .next()
        .unwrap()
        .ends_with("REQUIRES_GERMAN_UMLAUT_PROCESSING=1"));

    // The marker is derived from the locale on re-serialization, not
    // stored as an unknown attribute.
    let reread = read_from_str(&text).unwrap();
    assert_eq!(write_to_string(&reread), text);
}
