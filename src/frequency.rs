//! Corpus ingestion and frequency accumulation.
//!
//! A [`FrequencyModel`] consumes sentence or word material token by token,
//! classifies each token, validates unknown candidates against the attached
//! [`Speller`] and tracks occurrence counts plus next-word adjacency. A
//! populated model is turned into an interchange list with [`FrequencyModel::export`],
//! which applies the logarithmic frequency scaling and bigram ranking.

use crate::affix;
use crate::cache;
use crate::combined::{
    DictionaryHeader, WordAttributes, WordlistCombined, MAX_FREQUENCY, MIN_FREQUENCY,
};
use crate::dict::{decapitalize, LookupError, Speller, NOSUGGEST_PREFIX};
use crate::error::{WfResult, WordForgeError};
use fnv::{FnvHashMap, FnvHashSet};
use itertools::Itertools;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use strum_macros::{Display, EnumIter};
use tracing::{info, warn};

/// Tokens at least this long are discarded outright; the dictionary
/// compiler ignores such entries anyway.
pub const MAX_WORD_LENGTH: usize = 48;

/// A next-word pair seen fewer times than this never becomes a bigram.
pub const MIN_NEXT_WORD_COUNT: u32 = 2;

/// First maximal word run inside a token: letters/digits with interior
/// apostrophes or hyphens, never at the edges. Edge-anchored character
/// classes replace lookaround, which this regex engine does not support.
const WORD_RUN_PATTERN: &str = r"[\p{L}\d](?:[\p{L}\d'-]*[\p{L}\d])?";

/// Per-word accumulator state. Discarded when the model is exported.
#[derive(Debug, Clone, Default)]
pub struct WordInfo {
    pub count: u64,
    /// How often each word directly follows this one.
    pub next: FnvHashMap<String, u32>,
    /// Validated only under nosuggest-permissive lookup.
    pub nosuggest: bool,
}

/// Outcome classes of the per-token pipeline, for run reporting. A token
/// can land in more than one class (an ambiguous token may still be
/// accepted), so these are counters, not a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum TokenClass {
    Accepted,
    Rejected,
    Ignored,
    Invalid,
    Ambiguous,
    TooLong,
    Numeric,
    NoLetters,
    DoubleDash,
}

/// Switches for [`FrequencyModel::export`].
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Map the internal nosuggest hint to `possibly_offensive`.
    pub add_nosuggest: bool,
    pub add_bigrams: bool,
    pub header: Option<DictionaryHeader>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            add_nosuggest: true,
            add_bigrams: true,
            header: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WordCountRow {
    word: String,
    count: u64,
}

/// In-memory word statistics for one corpus run. All rejection and ignore
/// state is owned by the instance, so independent ingestions never
/// interfere.
pub struct FrequencyModel {
    speller: Option<Arc<dyn Speller + Send + Sync>>,
    /// Words deliberately kept out of the list, typically names that
    /// belong in an add-on dictionary. Not counted as valid or invalid
    /// and never used for next-word data.
    ignore_words: FnvHashSet<String>,
    word_infos: FnvHashMap<String, WordInfo>,
    /// Words that failed validation once; later occurrences short-circuit.
    invalid_words: FnvHashSet<String>,
    /// Tokens without any letter. The bigram cursor ends at them.
    not_words: FnvHashSet<String>,
    /// Tokens with more than one word run, kept for later review.
    weird_things: FnvHashSet<String>,
    class_counts: FnvHashMap<TokenClass, u64>,
    count: u64,
    count_valid: u64,
    ignore_word_count: u64,
    word_run: Regex,
    letter: Regex,
    digit: Regex,
}

impl FrequencyModel {
    pub fn new() -> WfResult<Self> {
        Ok(Self {
            speller: None,
            ignore_words: FnvHashSet::default(),
            word_infos: FnvHashMap::default(),
            invalid_words: FnvHashSet::default(),
            not_words: FnvHashSet::default(),
            weird_things: FnvHashSet::default(),
            class_counts: FnvHashMap::default(),
            count: 0,
            count_valid: 0,
            ignore_word_count: 0,
            word_run: Regex::new(WORD_RUN_PATTERN)?,
            letter: Regex::new(r"\p{L}")?,
            digit: Regex::new(r"\d")?,
        })
    }

    pub fn with_speller(speller: Arc<dyn Speller + Send + Sync>) -> WfResult<Self> {
        let mut model = Self::new()?;
        model.speller = Some(speller);
        Ok(model)
    }

    pub fn set_speller(&mut self, speller: Arc<dyn Speller + Send + Sync>) {
        self.speller = Some(speller);
    }

    pub fn add_ignore_words<I: IntoIterator<Item = String>>(&mut self, words: I) {
        self.ignore_words.extend(words);
    }

    /// Total tokens that reached word extraction.
    pub fn token_count(&self) -> u64 {
        self.count
    }

    /// Tokens accepted into the count tables.
    pub fn valid_count(&self) -> u64 {
        self.count_valid
    }

    pub fn ignored_count(&self) -> u64 {
        self.ignore_word_count
    }

    pub fn word_count(&self) -> usize {
        self.word_infos.len()
    }

    pub fn word_infos(&self) -> &FnvHashMap<String, WordInfo> {
        &self.word_infos
    }

    pub fn invalid_words(&self) -> &FnvHashSet<String> {
        &self.invalid_words
    }

    pub fn not_words(&self) -> &FnvHashSet<String> {
        &self.not_words
    }

    pub fn weird_things(&self) -> &FnvHashSet<String> {
        &self.weird_things
    }

    pub fn class_count(&self, class: TokenClass) -> u64 {
        self.class_counts.get(&class).copied().unwrap_or(0)
    }

    /// Ingests one sentence or sentence fragment, updating counts and
    /// next-word adjacency. A "previous word" cursor models bigram
    /// adjacency; it resets to none at every boundary token so that
    /// punctuation, numbers and rejected words never produce bigrams
    /// across themselves.
    ///
    /// With `accept_unknown` every extracted word is admitted except a
    /// capitalized word with no previous word, which is how
    /// sentence-initial capitalization is kept out of the list. Without
    /// it, unknown words are validated through the attached speller; with
    /// no speller attached nothing unknown is admitted.
    pub fn add_line(&mut self, line: &str, accept_unknown: bool) {
        let mut previous_word: Option<String> = None;
        for raw_token in line.split_whitespace() {
            if self.word_infos.contains_key(raw_token) {
                // Known token: skip extraction and lookup entirely.
                self.add_word_internal(raw_token, false, true);
                self.note_next(previous_word.as_deref(), raw_token);
                self.bump_class(TokenClass::Accepted);
                previous_word = Some(raw_token.to_string());
                continue;
            }
            if raw_token.chars().count() >= MAX_WORD_LENGTH {
                self.bump_class(TokenClass::TooLong);
                previous_word = None;
                continue;
            }
            if raw_token.chars().all(char::is_numeric) {
                self.bump_class(TokenClass::Numeric);
                previous_word = None;
                continue;
            }
            if raw_token.contains("--") {
                // Spellers tend to accept these, but they are junk.
                self.invalid_words.insert(raw_token.to_string());
                self.bump_class(TokenClass::DoubleDash);
                previous_word = None;
                continue;
            }
            if !self.letter.is_match(raw_token) {
                self.not_words.insert(raw_token.to_string());
                self.bump_class(TokenClass::NoLetters);
                previous_word = None;
                continue;
            }

            // Dictionaries carry ASCII apostrophes; corpora often carry
            // the right single quotation mark.
            let token = raw_token.replace('\u{2019}', "'");
            let mut ambiguous = false;
            let (word_start, extracted) = {
                let mut runs = self.word_run.find_iter(&token);
                match runs.next() {
                    Some(first) => {
                        ambiguous = runs.next().is_some();
                        (first.start(), first.as_str().to_string())
                    }
                    // A token with a letter always has a run.
                    None => {
                        previous_word = None;
                        continue;
                    }
                }
            };
            self.count += 1;
            if ambiguous {
                self.weird_things.insert(token.clone());
                self.bump_class(TokenClass::Ambiguous);
                previous_word = None;
            }
            if word_start != 0 {
                // Leading junk breaks the bigram chain.
                previous_word = None;
            }

            let mut word = extracted;
            if self.ignore_words.contains(&word) {
                self.ignore_word_count += 1;
                self.bump_class(TokenClass::Ignored);
                previous_word = None;
                continue;
            }
            if self.invalid_words.contains(&word) {
                self.bump_class(TokenClass::Invalid);
                previous_word = None;
                continue;
            }
            if !self.word_infos.contains_key(&word) {
                if accept_unknown {
                    if previous_word.is_none()
                        && word.chars().next().is_some_and(char::is_uppercase)
                    {
                        // Sentence-initial capitalization must not be
                        // learned as a proper word.
                        self.bump_class(TokenClass::Rejected);
                        continue;
                    }
                } else {
                    match self.dict_check(&word, previous_word.is_none()) {
                        Ok(Some(valid_form)) => word = valid_form,
                        Ok(None) => {
                            // Remembering sentence-initial rejections
                            // would poison legitimate capitalized forms.
                            if previous_word.is_some() {
                                self.invalid_words.insert(word);
                            }
                            self.bump_class(TokenClass::Rejected);
                            previous_word = None;
                            continue;
                        }
                        Err(LookupError { .. }) => {
                            self.bump_class(TokenClass::Rejected);
                            previous_word = None;
                            continue;
                        }
                    }
                }
            }

            self.count_valid += 1;
            self.add_word_internal(&word, false, false);
            self.note_next(previous_word.as_deref(), &word);
            self.bump_class(TokenClass::Accepted);
            // Chain the cursor out only when the whole token tail is the
            // word; trailing junk means a probable sentence end.
            previous_word = if !ambiguous && token.ends_with(word.as_str()) {
                Some(word)
            } else {
                None
            };
        }
    }

    /// Non-sentence entry point: extracts the first word run of `token`
    /// and counts it, with no bigram tracking. Tokens without any word
    /// run are dropped.
    pub fn ingest_word(&mut self, token: &str) {
        let token = token.replace('\u{2019}', "'");
        let word = match self.word_run.find(&token) {
            Some(run) => run.as_str().to_string(),
            None => return,
        };
        self.add_word(&word, false);
    }

    /// Counts one occurrence of `word` as given, bypassing extraction.
    pub fn add_word(&mut self, word: &str, nosuggest: bool) {
        self.add_word_internal(word, nosuggest, true);
    }

    pub fn add_sentence_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        accept_unknown: bool,
    ) -> WfResult<()> {
        let file = File::open(path)?;
        for line in BufReader::new(file).lines() {
            self.add_line(&line?, accept_unknown);
        }
        Ok(())
    }

    pub fn add_word_file<P: AsRef<Path>>(&mut self, path: P) -> WfResult<()> {
        let file = File::open(path)?;
        for line in BufReader::new(file).lines() {
            for token in line?.split_whitespace() {
                self.ingest_word(token);
            }
        }
        Ok(())
    }

    /// Loads a `word,count` CSV, adding each row's count in one step.
    /// Returns the number of rows applied.
    pub fn add_word_count_file<P: AsRef<Path>>(&mut self, path: P) -> WfResult<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        let mut applied = 0;
        for row in reader.deserialize() {
            let row: WordCountRow = row?;
            if row.count == 0 {
                continue;
            }
            let token = row.word.replace('\u{2019}', "'");
            let word = match self.word_run.find(&token) {
                Some(run) => run.as_str().to_string(),
                None => continue,
            };
            self.word_infos.entry(word).or_default().count += row.count;
            self.count += row.count;
            self.count_valid += row.count;
            applied += 1;
        }
        Ok(applied)
    }

    /// Adds every surface form the attached speller's stem and affix
    /// tables imply, so rarely used but valid forms survive into the
    /// list. Expansion can be slow for morphology-rich dictionaries;
    /// when `cache_file` is given, a previous run's forms are reused
    /// and fresh results are written back.
    pub fn add_dictionary_words(&mut self, cache_file: Option<&Path>) -> WfResult<usize> {
        let Some(speller) = self.speller.clone() else {
            return Err(WordForgeError::Config(
                "cannot expand dictionary words without an attached speller".into(),
            ));
        };

        let mut unmunched: HashSet<String> = HashSet::new();
        if let Some(path) = cache_file {
            if path.is_file() {
                match cache::read_expansion_cache(path) {
                    Ok(words) => unmunched = words,
                    Err(err) => warn!("could not read cache {}: {}", path.display(), err),
                }
            }
        }

        if unmunched.is_empty() {
            let expanded = affix::expand_dictionary(speller.as_ref());
            // Expansion may produce fragments; keep only forms the
            // speller itself confirms, and never bare hyphen edges.
            for word in expanded {
                if word.starts_with('-')
                    || word.ends_with('-')
                    || word.chars().all(char::is_numeric)
                {
                    continue;
                }
                if matches!(speller.lookup(&word, false, false), Ok(true)) {
                    unmunched.insert(word);
                } else if matches!(speller.lookup(&word, false, true), Ok(true)) {
                    unmunched.insert(format!("{}{}", NOSUGGEST_PREFIX, word));
                }
            }
            if let Some(path) = cache_file {
                if let Err(err) = cache::write_expansion_cache(path, &unmunched) {
                    warn!("could not write cache {}: {}", path.display(), err);
                }
            }
        }

        let mut added = 0;
        for entry in &unmunched {
            let (word, nosuggest) = match entry.strip_prefix(NOSUGGEST_PREFIX) {
                Some(word) => (word, true),
                None => (entry.as_str(), false),
            };
            if self.ignore_words.contains(word) || self.word_infos.contains_key(word) {
                continue;
            }
            self.add_word_internal(word, nosuggest, true);
            added += 1;
        }
        info!("added {} words from dictionary expansion", added);
        Ok(added)
    }

    /// Validates a candidate against the speller. Returns the accepted
    /// form (possibly decapitalized) or `None` for a rejection. Exact-case
    /// matches win over decapitalized ones, and non-nosuggest matches win
    /// over nosuggest matches of the same case; a nosuggest acceptance is
    /// remembered on the word's info.
    fn dict_check(
        &mut self,
        word: &str,
        try_decapitalize: bool,
    ) -> Result<Option<String>, LookupError> {
        let Some(speller) = self.speller.clone() else {
            return Ok(None);
        };
        if try_decapitalize && word.chars().next().is_some_and(char::is_uppercase) {
            let decapitalized = decapitalize(word);
            if self.word_infos.contains_key(&decapitalized) {
                return Ok(Some(decapitalized));
            }
            // Broad check first; the exact-case probes below are all
            // subsets of it.
            if !speller.lookup(word, true, true)? {
                return Ok(None);
            }
            if speller.lookup(word, false, false)? {
                return Ok(Some(word.to_string()));
            }
            if speller.lookup(word, false, true)? {
                self.flag_nosuggest(word);
                return Ok(Some(word.to_string()));
            }
            if speller.lookup(&decapitalized, false, false)? {
                return Ok(Some(decapitalized));
            }
            if speller.lookup(&decapitalized, false, true)? {
                self.flag_nosuggest(&decapitalized);
                return Ok(Some(decapitalized));
            }
            return Ok(None);
        }
        // Mid-sentence, only the exact capitalization counts.
        if !speller.lookup(word, false, true)? {
            return Ok(None);
        }
        if speller.lookup(word, false, false)? {
            return Ok(Some(word.to_string()));
        }
        self.flag_nosuggest(word);
        Ok(Some(word.to_string()))
    }

    fn flag_nosuggest(&mut self, word: &str) {
        self.word_infos.entry(word.to_string()).or_default().nosuggest = true;
    }

    fn add_word_internal(&mut self, word: &str, nosuggest: bool, add_to_count: bool) {
        let info = self.word_infos.entry(word.to_string()).or_default();
        info.count += 1;
        if nosuggest {
            info.nosuggest = true;
        }
        if add_to_count {
            self.count += 1;
            self.count_valid += 1;
        }
    }

    fn note_next(&mut self, previous: Option<&str>, word: &str) {
        let Some(previous) = previous else { return };
        if let Some(info) = self.word_infos.get_mut(previous) {
            *info.next.entry(word.to_string()).or_insert(0) += 1;
        }
    }

    fn bump_class(&mut self, class: TokenClass) {
        *self.class_counts.entry(class).or_insert(0) += 1;
    }

    fn min_max_counts(&self) -> (u64, u64) {
        let mut min_count = u64::MAX;
        let mut max_count = 0;
        for info in self.word_infos.values() {
            if info.count == 0 {
                continue;
            }
            min_count = min_count.min(info.count);
            max_count = max_count.max(info.count);
        }
        (min_count, max_count)
    }

    /// Snapshots the model into an interchange list. Raw counts spanning
    /// many orders of magnitude are spread over the format's frequency
    /// band logarithmically, preserving relative order. Words containing
    /// digits are tracked during ingestion but cannot be represented in
    /// the target dictionary format, so they are skipped here.
    ///
    /// Bigrams get dense ranks from 1 in order of falling occurrence
    /// count, ties broken by word order so runs are reproducible; pairs
    /// seen only once are noise and dropped.
    pub fn export(&self, options: ExportOptions) -> WordlistCombined {
        let (min_count, max_count) = self.min_max_counts();
        let mut wordlist = WordlistCombined::new(options.header);
        if max_count == 0 {
            warn!("created word list is empty");
            return wordlist;
        }
        let min_f = (min_count as f64).ln();
        let f_diff = ((max_count as f64).ln() - min_f).max(1.0);
        let span = (MAX_FREQUENCY - MIN_FREQUENCY) as f64;

        for (word, info) in &self.word_infos {
            if info.count == 0 || self.digit.is_match(word) {
                continue;
            }
            let scaled = ((info.count as f64).ln() - min_f) * span / f_diff + MIN_FREQUENCY as f64;
            let mut attributes = WordAttributes::with_frequency(scaled.round() as u32);
            if options.add_nosuggest && info.nosuggest {
                attributes.possibly_offensive = true;
            }
            if options.add_bigrams {
                let mut rank = 1u32;
                for (next_word, next_count) in info
                    .next
                    .iter()
                    .sorted_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)))
                {
                    if *next_count < MIN_NEXT_WORD_COUNT {
                        break;
                    }
                    attributes.bigrams.insert(next_word.clone(), rank);
                    rank += 1;
                }
            }
            wordlist.words.insert(word.clone(), attributes);
        }
        wordlist
    }
}
