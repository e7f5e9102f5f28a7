//! Handoff to the external dictionary compiler.
//!
//! The combined list is staged to a temporary directory and fed to the
//! AOSP `dicttool` jar, which produces the binary keyboard dictionary.
//! The tool is opaque to this crate: a failed invocation is reported and
//! never retried.

use crate::combined::WordlistCombined;
use crate::error::{WfResult, WordForgeError};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::info;

/// Compiles `wordlist` into a binary dictionary. `target` is either a
/// `.dict` file path or a directory, in which case the file is named
/// `<type>_<locale>.dict`. Returns the path of the compiled dictionary.
///
/// Refuses to run without a header, and refuses to replace an existing
/// target unless `overwrite` is set.
pub fn compile(
    wordlist: &WordlistCombined,
    dicttool_jar: &Path,
    target: &Path,
    overwrite: bool,
) -> WfResult<PathBuf> {
    let Some(header) = &wordlist.header else {
        return Err(WordForgeError::Format(
            "cannot compile a word list without a header".into(),
        ));
    };
    if !dicttool_jar.is_file() {
        return Err(WordForgeError::Tool(format!(
            "dictionary compiler not found at {}",
            dicttool_jar.display()
        )));
    }

    let (target_dir, dict_name) = resolve_target(target, &header.dict_type, &header.locale)?;
    let destination = target_dir.join(&dict_name);
    if destination.exists() && !overwrite {
        return Err(WordForgeError::Config(format!(
            "{} already exists, not overwriting",
            destination.display()
        )));
    }

    let staging = TempDir::new()?;
    let combined_path = staging.path().join(format!(
        "{}_{}.combined",
        header.locale.to_lowercase(),
        header.dict_type
    ));
    wordlist.write_to_path(&combined_path)?;
    let built = staging.path().join(&dict_name);

    info!(
        "compiling {} with {}",
        combined_path.display(),
        dicttool_jar.display()
    );
    let status = Command::new("java")
        .arg("-jar")
        .arg(dicttool_jar)
        .arg("makedict")
        .arg("-s")
        .arg(&combined_path)
        .arg("-d")
        .arg(&built)
        .status()
        .map_err(|err| WordForgeError::Tool(format!("failed to run java: {}", err)))?;
    if !status.success() {
        return Err(WordForgeError::Tool(format!(
            "dictionary compiler exited with {}",
            status
        )));
    }
    if !built.is_file() {
        return Err(WordForgeError::Tool(
            "dictionary compiler produced no output".into(),
        ));
    }

    fs::create_dir_all(&target_dir)?;
    if fs::rename(&built, &destination).is_err() {
        // Rename fails across filesystems and the staging dir may sit on
        // its own one.
        fs::copy(&built, &destination)?;
    }
    Ok(destination)
}

fn resolve_target(
    target: &Path,
    dict_type: &str,
    locale: &str,
) -> WfResult<(PathBuf, OsString)> {
    if target.extension().is_some_and(|ext| ext == "dict") {
        let name = target.file_name().ok_or_else(|| {
            WordForgeError::Config(format!("invalid target path {}", target.display()))
        })?;
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok((dir, name.to_os_string()))
    } else {
        let name = format!("{}_{}.dict", dict_type, locale.to_lowercase());
        Ok((target.to_path_buf(), OsString::from(name)))
    }
}
