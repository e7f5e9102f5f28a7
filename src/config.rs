//! Build plans: JSON descriptions of a whole word-list build, from
//! dictionary tables through corpus sources to the exported file.

use crate::combined::DictionaryHeader;
use crate::error::{WfResult, WordForgeError};
use crate::frequency::ExportOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A complete build description for one locale.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildPlan {
    pub locale: String,
    #[serde(default = "default_dict_type")]
    pub dict_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: u32,
    /// Spell-check dictionary tables; omit to run purely corpus-driven.
    #[serde(default)]
    pub dictionary: Option<DictionarySpec>,
    /// Words to keep out of the list, one per line.
    #[serde(default)]
    pub ignore_file: Option<PathBuf>,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub filter: Option<FilterSettings>,
    pub output: PathBuf,
}

impl BuildPlan {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> WfResult<Self> {
        let content = fs::read_to_string(path)?;
        let plan: BuildPlan = serde_json::from_str(&content)?;
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> WfResult<()> {
        if self.locale.is_empty() {
            return Err(WordForgeError::Config("plan has an empty locale".into()));
        }
        if self.sources.is_empty() && self.dictionary.is_none() {
            return Err(WordForgeError::Config(
                "plan names neither sources nor a dictionary".into(),
            ));
        }
        Ok(())
    }

    pub fn header(&self) -> DictionaryHeader {
        let description = if self.description.is_empty() {
            format!("{} word list", self.locale)
        } else {
            self.description.clone()
        };
        DictionaryHeader::new(&self.locale, &self.dict_type, &description, self.version)
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            add_nosuggest: self.export.add_nosuggest,
            add_bigrams: self.export.add_bigrams,
            header: Some(self.header()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DictionarySpec {
    /// Plain word list backing validation lookups.
    #[serde(default)]
    pub word_file: Option<PathBuf>,
    /// `stem,flags` CSV.
    #[serde(default)]
    pub stem_file: Option<PathBuf>,
    /// `kind,flag,strip,add,condition,crossproduct,result_flags` CSV.
    #[serde(default)]
    pub affix_file: Option<PathBuf>,
    pub need_affix: Option<char>,
    pub forbidden: Option<char>,
    /// Seed the model with every expanded surface form.
    #[serde(default)]
    pub expand: bool,
    /// Where expansion caches live; keyed by the table fingerprints.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl DictionarySpec {
    /// Paths contributing to the dictionary identity, for cache keying.
    pub fn table_paths(&self) -> Vec<&Path> {
        [&self.word_file, &self.stem_file, &self.affix_file]
            .into_iter()
            .flatten()
            .map(PathBuf::as_path)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Sentence material with bigram tracking.
    #[default]
    Sentences,
    /// Bare word tokens, counts only.
    Words,
    /// `word,count` CSV rows.
    WordCounts,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceSpec {
    pub path: PathBuf,
    #[serde(default)]
    pub kind: SourceKind,
    /// Admit words absent from the dictionary (sentence sources only).
    #[serde(default)]
    pub accept_unknown: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportSettings {
    #[serde(default = "default_true")]
    pub add_nosuggest: bool,
    #[serde(default = "default_true")]
    pub add_bigrams: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            add_nosuggest: true,
            add_bigrams: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterSettings {
    #[serde(default = "default_max_bigrams")]
    pub max_bigrams_per_word: usize,
    #[serde(default = "default_max_target_f")]
    pub max_bigram_target_f: u32,
}

/// Reads an ignore list, one word per line, skipping blanks and `#`
/// comment lines.
pub fn read_ignore_file<P: AsRef<Path>>(path: P) -> WfResult<Vec<String>> {
    let file = File::open(path)?;
    let mut words = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let word = line.trim();
        if word.is_empty() || word.starts_with('#') {
            continue;
        }
        words.push(word.to_string());
    }
    Ok(words)
}

fn default_dict_type() -> String {
    "main".to_string()
}

fn default_version() -> u32 {
    18
}

fn default_true() -> bool {
    true
}

fn default_max_bigrams() -> usize {
    3
}

fn default_max_target_f() -> u32 {
    200
}
