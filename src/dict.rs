use crate::error::WfResult;
use fnv::FnvHashMap;
use regex::Regex;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Affix flags are single symbols, matching the flag alphabet of the
/// spell-check dictionaries this crate consumes.
pub type AffixFlag = char;

pub const NOSUGGEST_PREFIX: &str = "nosuggest:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffixKind {
    Prefix,
    Suffix,
}

/// One stem of the spell-check dictionary together with its affix flags.
#[derive(Debug, Clone)]
pub struct StemEntry {
    pub stem: String,
    pub flags: Vec<AffixFlag>,
}

impl StemEntry {
    pub fn new(stem: &str, flags: &[AffixFlag]) -> Self {
        Self {
            stem: stem.to_string(),
            flags: flags.to_vec(),
        }
    }

    pub fn has_flag(&self, flag: AffixFlag) -> bool {
        self.flags.contains(&flag)
    }
}

/// A prefix or suffix transformation, gated by a flag and a condition
/// pattern on the form it applies to.
#[derive(Debug, Clone)]
pub struct AffixRule {
    pub kind: AffixKind,
    pub flag: AffixFlag,
    pub strip: String,
    pub add: String,
    pub crossproduct: bool,
    /// Continuation flags carried by the produced form. Second-level
    /// suffixes are keyed off these.
    pub result_flags: Vec<AffixFlag>,
    condition: Regex,
}

impl AffixRule {
    /// Compiles `condition` anchored to the affected end of the form:
    /// suffix conditions match the tail, prefix conditions the head.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: AffixKind,
        flag: AffixFlag,
        strip: &str,
        add: &str,
        condition: &str,
        crossproduct: bool,
        result_flags: &[AffixFlag],
    ) -> WfResult<Self> {
        let anchored = match kind {
            AffixKind::Suffix => format!("(?:{})$", condition),
            AffixKind::Prefix => format!("^(?:{})", condition),
        };
        Ok(Self {
            kind,
            flag,
            strip: strip.to_string(),
            add: add.to_string(),
            crossproduct,
            result_flags: result_flags.to_vec(),
            condition: Regex::new(&anchored)?,
        })
    }

    pub fn applies_to(&self, form: &str) -> bool {
        self.condition.is_match(form)
    }

    pub fn has_result_flag(&self, flag: AffixFlag) -> bool {
        self.result_flags.contains(&flag)
    }
}

/// Raised by lookup backends that cannot index a candidate (observed for
/// dotted-I forms checked against unrelated-locale dictionaries). Ingestion
/// treats this as "reject the token", never as a fatal error.
#[derive(Error, Debug, Clone)]
#[error("lookup failed for {word:?}: {reason}")]
pub struct LookupError {
    pub word: String,
    pub reason: String,
}

impl LookupError {
    pub fn new(word: &str, reason: &str) -> Self {
        Self {
            word: word.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Read-only capability over a spell-check dictionary: word lookup plus
/// access to the stem table and affix-rule tables. Both the unmunch
/// expansion and corpus validation are written against this trait so any
/// spell-check engine can be wired in behind it.
pub trait Speller {
    /// Checks a word against the dictionary. With `capitalization` the
    /// backend may fold case (sentence-case and all-caps variants match
    /// their lowercase entry); without it the word must match the stored
    /// casing exactly. `allow_nosuggest` widens the match to entries the
    /// dictionary marks as valid-but-not-suggestable.
    fn lookup(
        &self,
        word: &str,
        capitalization: bool,
        allow_nosuggest: bool,
    ) -> Result<bool, LookupError>;

    fn stems(&self) -> &[StemEntry];

    fn prefix_rules(&self, flag: AffixFlag) -> &[AffixRule];

    fn suffix_rules(&self, flag: AffixFlag) -> &[AffixRule];

    /// Flag marking stems that must not surface bare.
    fn need_affix_flag(&self) -> Option<AffixFlag>;

    /// Flag marking stems that must never surface at all.
    fn forbidden_flag(&self) -> Option<AffixFlag>;
}

/// Lowercases the leading character only ("The" -> "the"). Multi-char
/// lowercase expansions (e.g. dotted capital I) are preserved in full.
pub fn decapitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_lowercase().collect();
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

#[derive(Debug, Deserialize)]
struct StemRow {
    stem: String,
    #[serde(default)]
    flags: String,
}

#[derive(Debug, Deserialize)]
struct AffixRow {
    kind: AffixKind,
    flag: AffixFlag,
    #[serde(default)]
    strip: String,
    add: String,
    #[serde(default)]
    condition: String,
    crossproduct: bool,
    #[serde(default)]
    result_flags: String,
}

/// In-memory [`Speller`]: an explicit word set with per-word nosuggest
/// marks, plus optional stem/rule tables. This is the implementation the
/// tests and the word-list-backed CLI validation use; real hunspell
/// engines live behind the same trait out of tree.
#[derive(Default)]
pub struct MemorySpeller {
    words: FnvHashMap<String, bool>,
    stems: Vec<StemEntry>,
    prefix_rules: FnvHashMap<AffixFlag, Vec<AffixRule>>,
    suffix_rules: FnvHashMap<AffixFlag, Vec<AffixRule>>,
    need_affix: Option<AffixFlag>,
    forbidden: Option<AffixFlag>,
}

impl MemorySpeller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a plain word list, one word per line; a `nosuggest:` prefix
    /// marks valid-but-not-suggestable entries. Blank lines are skipped.
    pub fn from_word_file<P: AsRef<Path>>(path: P) -> WfResult<Self> {
        let file = File::open(path)?;
        let mut speller = Self::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            let entry = line.trim();
            if entry.is_empty() {
                continue;
            }
            match entry.strip_prefix(NOSUGGEST_PREFIX) {
                Some(word) => speller.add_nosuggest(word),
                None => speller.add_word(entry),
            }
        }
        Ok(speller)
    }

    /// Loads stems from a `stem,flags` CSV, where `flags` is a string of
    /// flag characters. Returns the number of stems added.
    pub fn load_stem_table<P: AsRef<Path>>(&mut self, path: P) -> WfResult<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        let mut added = 0;
        for row in reader.deserialize() {
            let row: StemRow = row?;
            let flags: Vec<AffixFlag> = row.flags.chars().collect();
            self.add_stem(&row.stem, &flags);
            added += 1;
        }
        Ok(added)
    }

    /// Loads affix rules from a
    /// `kind,flag,strip,add,condition,crossproduct,result_flags` CSV. An
    /// empty condition applies to every form.
    pub fn load_affix_table<P: AsRef<Path>>(&mut self, path: P) -> WfResult<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        let mut added = 0;
        for row in reader.deserialize() {
            let row: AffixRow = row?;
            let result_flags: Vec<AffixFlag> = row.result_flags.chars().collect();
            let rule = AffixRule::new(
                row.kind,
                row.flag,
                &row.strip,
                &row.add,
                &row.condition,
                row.crossproduct,
                &result_flags,
            )?;
            self.add_rule(rule);
            added += 1;
        }
        Ok(added)
    }

    /// Expands the loaded stem table and registers every surface form as
    /// a plain word, so later lookups confirm affixed forms. Returns the
    /// number of words newly registered.
    pub fn index_expansions(&mut self) -> usize {
        let forms = crate::affix::expand_dictionary(&*self);
        let before = self.words.len();
        for form in forms {
            self.words.entry(form).or_insert(false);
        }
        self.words.len() - before
    }

    pub fn add_word(&mut self, word: &str) {
        self.words.insert(word.to_string(), false);
    }

    pub fn add_nosuggest(&mut self, word: &str) {
        self.words.insert(word.to_string(), true);
    }

    pub fn add_stem(&mut self, stem: &str, flags: &[AffixFlag]) {
        self.stems.push(StemEntry::new(stem, flags));
    }

    pub fn add_rule(&mut self, rule: AffixRule) {
        let table = match rule.kind {
            AffixKind::Prefix => &mut self.prefix_rules,
            AffixKind::Suffix => &mut self.suffix_rules,
        };
        table.entry(rule.flag).or_default().push(rule);
    }

    pub fn set_need_affix(&mut self, flag: AffixFlag) {
        self.need_affix = Some(flag);
    }

    pub fn set_forbidden(&mut self, flag: AffixFlag) {
        self.forbidden = Some(flag);
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    fn entry_matches(&self, word: &str, allow_nosuggest: bool) -> bool {
        match self.words.get(word) {
            Some(&nosuggest) => allow_nosuggest || !nosuggest,
            None => false,
        }
    }
}

impl Speller for MemorySpeller {
    fn lookup(
        &self,
        word: &str,
        capitalization: bool,
        allow_nosuggest: bool,
    ) -> Result<bool, LookupError> {
        if self.entry_matches(word, allow_nosuggest) {
            return Ok(true);
        }
        if capitalization {
            let sentence_case = decapitalize(word);
            if sentence_case != word && self.entry_matches(&sentence_case, allow_nosuggest) {
                return Ok(true);
            }
            let lower = word.to_lowercase();
            if lower != word
                && lower != sentence_case
                && self.entry_matches(&lower, allow_nosuggest)
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn stems(&self) -> &[StemEntry] {
        &self.stems
    }

    fn prefix_rules(&self, flag: AffixFlag) -> &[AffixRule] {
        self.prefix_rules.get(&flag).map_or(&[], Vec::as_slice)
    }

    fn suffix_rules(&self, flag: AffixFlag) -> &[AffixRule] {
        self.suffix_rules.get(&flag).map_or(&[], Vec::as_slice)
    }

    fn need_affix_flag(&self) -> Option<AffixFlag> {
        self.need_affix
    }

    fn forbidden_flag(&self) -> Option<AffixFlag> {
        self.forbidden
    }
}
