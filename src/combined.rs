use crate::error::{WfResult, WordForgeError};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Frequency band of the combined format.
pub const MIN_FREQUENCY: u32 = 1;
pub const MAX_FREQUENCY: u32 = 254;

/// Shortcut frequency sentinel: the shortcut is always offered.
pub const SHORTCUT_WHITELIST: &str = "whitelist";

/// Consumers are known to silently ignore dictionaries below this version.
pub const MIN_SUPPORTED_VERSION: u32 = 18;

/// Per-word attributes of one combined-list entry. Immutable once written;
/// replaced wholesale or field-by-field through [`WordlistCombined::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordAttributes {
    pub f: u32,
    pub possibly_offensive: bool,
    pub not_a_word: bool,
    /// next word -> rank; rank 1 is the most likely continuation.
    pub bigrams: BTreeMap<String, u32>,
    /// shortcut text -> frequency, where the value may also be the
    /// `whitelist` sentinel. Kept in insertion order.
    pub shortcuts: Vec<(String, String)>,
    /// Unrecognized `key=value` attributes, round-tripped untouched and in
    /// order so format extensions survive a rewrite.
    pub unknown: Vec<(String, String)>,
}

impl WordAttributes {
    pub fn with_frequency(f: u32) -> Self {
        Self {
            f,
            ..Default::default()
        }
    }

    pub fn set_shortcut(&mut self, shortcut: &str, f: &str) {
        upsert(&mut self.shortcuts, shortcut, f);
    }

    pub fn set_unknown(&mut self, key: &str, value: &str) {
        upsert(&mut self.unknown, key, value);
    }
}

fn upsert(pairs: &mut Vec<(String, String)>, key: &str, value: &str) {
    match pairs.iter_mut().find(|(k, _)| k == key) {
        Some((_, v)) => *v = value.to_string(),
        None => pairs.push((key.to_string(), value.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryHeader {
    pub locale: String,
    pub dict_type: String,
    pub description: String,
    pub version: u32,
    /// Build date in epoch seconds.
    pub date: u64,
}

impl DictionaryHeader {
    pub fn new(locale: &str, dict_type: &str, description: &str, version: u32) -> Self {
        Self::with_date(locale, dict_type, description, version, now_epoch())
    }

    pub fn with_date(
        locale: &str,
        dict_type: &str,
        description: &str,
        version: u32,
        date: u64,
    ) -> Self {
        if version < MIN_SUPPORTED_VERSION {
            warn!(
                "dictionary version is {}; versions below {} may be ignored by consuming keyboards",
                version, MIN_SUPPORTED_VERSION
            );
        }
        let description = if description.is_empty() {
            warn!("description cannot be empty, replacing with a single space");
            " ".to_string()
        } else {
            description.to_string()
        };
        if !plausible_locale(locale) {
            warn!(
                "locale {:?} does not look like a valid locale; the dictionary will work but \
                 the locale may not be recognized",
                locale
            );
        }
        Self {
            locale: locale.to_string(),
            dict_type: dict_type.to_string(),
            description,
            version,
            date,
        }
    }

    /// Renders the leading header line of the combined format. The umlaut
    /// marker is derived from the locale, never stored.
    pub fn format_line(&self) -> String {
        let umlaut = if self.is_german() {
            ",REQUIRES_GERMAN_UMLAUT_PROCESSING=1"
        } else {
            ""
        };
        format!(
            "dictionary={}:{},locale={},description={},date={},version={}{}",
            self.dict_type,
            self.locale.to_lowercase(),
            self.locale,
            self.description,
            self.date,
            self.version,
            umlaut
        )
    }

    /// Parses a header line. Missing `locale=`/`dictionary=` (or a
    /// dictionary value without the `:<lowercased locale>` tail) is a hard
    /// format error: a silently wrong locale or type would poison every
    /// later merge of the stream. The remaining fields degrade with a
    /// warning.
    pub fn parse(line: &str) -> WfResult<Self> {
        let fields: Vec<&str> = line.trim().split(',').collect();

        let locale = field_value(&fields, "locale=")
            .ok_or_else(|| WordForgeError::Format("header line has no locale".into()))?;
        let dictionary = field_value(&fields, "dictionary=")
            .ok_or_else(|| WordForgeError::Format("header line has no dictionary type".into()))?;
        let tail = format!(":{}", locale.to_lowercase());
        let dict_type = match dictionary.split_once(tail.as_str()) {
            Some((head, _)) => head,
            None => {
                return Err(WordForgeError::Format(format!(
                    "dictionary field {:?} does not contain the lowercased locale {:?}",
                    dictionary,
                    locale.to_lowercase()
                )))
            }
        };

        let description = match field_value(&fields, "description=") {
            Some(text) => text,
            None => {
                warn!("header has no description, using empty string");
                ""
            }
        };
        let version = match field_value(&fields, "version=").map(str::parse::<u32>) {
            Some(Ok(version)) => version,
            _ => {
                warn!("header has no valid version, assuming {}", MIN_SUPPORTED_VERSION);
                MIN_SUPPORTED_VERSION
            }
        };
        let date = match field_value(&fields, "date=").map(str::parse::<u64>) {
            Some(Ok(date)) => date,
            _ => {
                warn!("header has no valid date, using the current time");
                now_epoch()
            }
        };

        Ok(Self::with_date(locale, dict_type, description, version, date))
    }

    fn is_german(&self) -> bool {
        self.locale.split('_').next() == Some("de")
    }
}

/// `^[a-z]{2}(_[A-Z]{2})?$` without compiling a pattern per header.
fn plausible_locale(locale: &str) -> bool {
    let bytes = locale.as_bytes();
    match bytes.len() {
        2 => bytes.iter().all(u8::is_ascii_lowercase),
        5 => {
            bytes[..2].iter().all(u8::is_ascii_lowercase)
                && bytes[2] == b'_'
                && bytes[3..].iter().all(u8::is_ascii_uppercase)
        }
        _ => false,
    }
}

fn field_value<'a>(fields: &[&'a str], key: &str) -> Option<&'a str> {
    fields.iter().find_map(|field| field.strip_prefix(key))
}

fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FreqPolicy {
    /// Keep the target frequency untouched.
    #[default]
    Keep,
    /// Take the source frequency.
    Overwrite,
    /// Average target and source.
    Average,
}

/// Per-field switches for [`WordlistCombined::merge`]. Defaults admit new
/// words, keep target frequencies and absorb every attribute kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeOptions {
    pub add_words: bool,
    pub frequency: FreqPolicy,
    pub possibly_offensive: bool,
    pub not_a_word: bool,
    pub shortcuts: bool,
    pub bigrams: bool,
    pub unknown: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            add_words: true,
            frequency: FreqPolicy::Keep,
            possibly_offensive: true,
            not_a_word: true,
            shortcuts: true,
            bigrams: true,
            unknown: true,
        }
    }
}

/// A wordlist in the combined interchange format: an optional header plus
/// word entries. This is the only persisted representation; the external
/// dictionary compiler consumes exactly what [`write_to`] emits.
///
/// [`write_to`]: WordlistCombined::write_to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordlistCombined {
    pub header: Option<DictionaryHeader>,
    pub words: BTreeMap<String, WordAttributes>,
}

impl WordlistCombined {
    pub fn new(header: Option<DictionaryHeader>) -> Self {
        Self {
            header,
            words: BTreeMap::new(),
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn bigram_count(&self) -> usize {
        self.words.values().map(|a| a.bigrams.len()).sum()
    }

    /// Serializes to the line format: header first, then words by
    /// descending frequency (ties in word order), each followed by its
    /// bigram rows ascending by rank and its shortcuts in insertion order.
    pub fn write_to<W: Write>(&self, mut out: W) -> WfResult<()> {
        match &self.header {
            Some(header) => writeln!(out, "{}", header.format_line())?,
            None => warn!("writing a word list without a header; the result will not compile"),
        }
        for (word, attributes) in self.words.iter().sorted_by_key(|(_, a)| Reverse(a.f)) {
            let mut line = format!(" word={},f={}", word, attributes.f);
            if attributes.not_a_word {
                line.push_str(",not_a_word=true");
            }
            if attributes.possibly_offensive {
                line.push_str(",possibly_offensive=true");
            }
            for (key, value) in &attributes.unknown {
                line.push_str(&format!(",{}={}", key, value));
            }
            writeln!(out, "{}", line)?;
            for (next_word, rank) in attributes.bigrams.iter().sorted_by_key(|entry| *entry.1) {
                writeln!(out, "  bigram={},f={}", next_word, rank)?;
            }
            for (shortcut, f) in &attributes.shortcuts {
                writeln!(out, "  shortcut={},f={}", shortcut, f)?;
            }
        }
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> WfResult<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        if is_gz(path) {
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            self.write_to(&mut encoder)?;
            encoder.finish()?;
        } else {
            let mut out = BufWriter::new(file);
            self.write_to(&mut out)?;
            out.flush()?;
        }
        Ok(())
    }

    /// Parses the line format. Unrecognized lines and attributes are
    /// tolerated (unknown attributes round-trip); a bad header, a word
    /// line without a parsable frequency or attribute rows before any
    /// word line fail the whole stream.
    pub fn read_from<R: BufRead>(reader: R) -> WfResult<Self> {
        let mut header = None;
        let mut words: BTreeMap<String, WordAttributes> = BTreeMap::new();
        let mut current: Option<(String, WordAttributes)> = None;

        for line in reader.lines() {
            let line = line?;
            if line.starts_with("dictionary") {
                header = Some(DictionaryHeader::parse(&line)?);
                continue;
            }
            let fields: Vec<&str> = line.trim_end().split(',').collect();
            let first = fields[0];

            if let Some(word) = first.strip_prefix(" word=") {
                if let Some((prev_word, attributes)) = current.take() {
                    words.insert(prev_word, attributes);
                }
                current = Some((word.to_string(), parse_word_attributes(word, &fields[1..])?));
            } else if let Some(next_word) = first.strip_prefix("  bigram=") {
                let Some((_, attributes)) = current.as_mut() else {
                    return Err(WordForgeError::Format(
                        "bigram row before any word line".into(),
                    ));
                };
                let rank = field_value(&fields[1..], "f=")
                    .and_then(|f| f.parse().ok())
                    .ok_or_else(|| {
                        WordForgeError::Format(format!("bigram {:?} has no valid rank", next_word))
                    })?;
                attributes.bigrams.insert(next_word.to_string(), rank);
            } else if let Some(shortcut) = first.strip_prefix("  shortcut=") {
                let Some((_, attributes)) = current.as_mut() else {
                    return Err(WordForgeError::Format(
                        "shortcut row before any word line".into(),
                    ));
                };
                let f = field_value(&fields[1..], "f=").ok_or_else(|| {
                    WordForgeError::Format(format!("shortcut {:?} has no frequency", shortcut))
                })?;
                attributes.set_shortcut(shortcut, f);
            }
            // Anything else is tolerated and skipped.
        }
        if let Some((word, attributes)) = current.take() {
            words.insert(word, attributes);
        }
        Ok(Self { header, words })
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> WfResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        if is_gz(path) {
            Self::read_from(BufReader::new(GzDecoder::new(file)))
        } else {
            Self::read_from(BufReader::new(file))
        }
    }

    /// Merges `source` entries into this list. Words missing from the
    /// target are copied wholesale when `add_words` is set; words already
    /// present are reconciled field by field per the gates in `options`.
    pub fn merge(&mut self, source: &BTreeMap<String, WordAttributes>, options: &MergeOptions) {
        for (word, attributes) in source {
            let Some(target) = self.words.get_mut(word) else {
                if options.add_words {
                    self.words.insert(word.clone(), attributes.clone());
                }
                continue;
            };
            match options.frequency {
                FreqPolicy::Keep => {}
                FreqPolicy::Overwrite => target.f = attributes.f,
                FreqPolicy::Average => target.f = (attributes.f + target.f) / 2,
            }
            if options.shortcuts {
                for (shortcut, f) in &attributes.shortcuts {
                    target.set_shortcut(shortcut, f);
                }
            }
            if options.bigrams {
                for (next_word, rank) in &attributes.bigrams {
                    target.bigrams.insert(next_word.clone(), *rank);
                }
            }
            if options.possibly_offensive && attributes.possibly_offensive {
                target.possibly_offensive = true;
            }
            if options.not_a_word && attributes.not_a_word {
                target.not_a_word = true;
            }
            if options.unknown {
                for (key, value) in &attributes.unknown {
                    target.set_unknown(key, value);
                }
            }
        }
    }

    /// Caps each word at `max_per_word` bigram rows, walking rows in
    /// ascending rank order, dropping rows whose target word is missing
    /// from the list or more frequent than `max_target_f`, and renumbers
    /// the survivors densely from 1. Suppressing high-frequency targets
    /// keeps very common function words out of the suggestion strip.
    pub fn filter_bigrams(&mut self, max_per_word: usize, max_target_f: u32) {
        let frequencies: BTreeMap<String, u32> = self
            .words
            .iter()
            .map(|(word, attributes)| (word.clone(), attributes.f))
            .collect();

        for attributes in self.words.values_mut() {
            let mut kept: BTreeMap<String, u32> = BTreeMap::new();
            let mut rank = 1u32;
            for (next_word, _) in attributes.bigrams.iter().sorted_by_key(|entry| *entry.1) {
                if rank as usize > max_per_word {
                    break;
                }
                let Some(&target_f) = frequencies.get(next_word) else {
                    continue;
                };
                if target_f > max_target_f {
                    continue;
                }
                kept.insert(next_word.clone(), rank);
                rank += 1;
            }
            attributes.bigrams = kept;
        }
    }
}

fn parse_word_attributes(word: &str, fields: &[&str]) -> WfResult<WordAttributes> {
    let mut attributes = WordAttributes::default();
    let mut f_seen = false;
    for field in fields {
        if !f_seen {
            if let Some(value) = field.strip_prefix("f=") {
                attributes.f = value.parse().map_err(|_| {
                    WordForgeError::Format(format!(
                        "word {:?} has invalid frequency {:?}",
                        word, value
                    ))
                })?;
                f_seen = true;
                continue;
            }
        }
        match *field {
            "not_a_word=true" => attributes.not_a_word = true,
            "possibly_offensive=true" => attributes.possibly_offensive = true,
            other => match other.split_once('=') {
                Some((key, value)) => attributes.set_unknown(key, value),
                None => warn!("ignoring malformed attribute {:?} on word {:?}", other, word),
            },
        }
    }
    if !f_seen {
        return Err(WordForgeError::Format(format!(
            "word {:?} has no frequency",
            word
        )));
    }
    Ok(attributes)
}

fn is_gz(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}
