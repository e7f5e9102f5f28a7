//! Expansion cache files.
//!
//! Affix expansion over a large stem table can take minutes to hours, so
//! confirmed surface forms are cached as plain text, one form per line. A
//! leading `nosuggest:` prefix marks a form that validated only under
//! nosuggest-permissive lookup. At most one writer per cache file is
//! assumed.

use crate::error::WfResult;
use itertools::Itertools;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub fn read_expansion_cache<P: AsRef<Path>>(path: P) -> WfResult<HashSet<String>> {
    let file = File::open(path)?;
    let mut words = HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            words.insert(trimmed.to_string());
        }
    }
    Ok(words)
}

/// Writes the cache sorted, so reruns produce identical files.
pub fn write_expansion_cache<P: AsRef<Path>>(path: P, words: &HashSet<String>) -> WfResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for word in words.iter().sorted() {
        writeln!(out, "{}", word)?;
    }
    out.flush()?;
    Ok(())
}

/// Hex digest over the given dictionary source files, used to key a cache
/// file to the exact dictionary it was computed from.
pub fn dictionary_fingerprint<P: AsRef<Path>>(paths: &[P]) -> WfResult<String> {
    let mut hasher = Sha256::new();
    for path in paths {
        hasher.update(fs::read(path)?);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cache_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.cache");
        let mut words = HashSet::new();
        words.insert("walk".to_string());
        words.insert("nosuggest:darn".to_string());
        write_expansion_cache(&path, &words).unwrap();
        assert_eq!(read_expansion_cache(&path).unwrap(), words);
    }

    #[test]
    fn test_cache_skips_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.cache");
        fs::write(&path, "walk\n\n  \nran\n").unwrap();
        let words = read_expansion_cache(&path).unwrap();
        assert_eq!(words.len(), 2);
        assert!(words.contains("ran"));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("list.dic");
        fs::write(&a, "walk/S\n").unwrap();
        let first = dictionary_fingerprint(&[&a]).unwrap();
        fs::write(&a, "talk/S\n").unwrap();
        let second = dictionary_fingerprint(&[&a]).unwrap();
        assert_ne!(first, second);
        assert_eq!(first.len(), 64);
    }
}
