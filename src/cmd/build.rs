use crate::reports;
use clap::Args;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use wordforge::cache;
use wordforge::config::{read_ignore_file, BuildPlan, DictionarySpec, SourceKind};
use wordforge::dict::MemorySpeller;
use wordforge::error::WfResult;
use wordforge::frequency::FrequencyModel;

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Build plan JSON
    pub plan: PathBuf,

    /// Write the list here instead of the plan's output path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: BuildArgs) -> WfResult<()> {
    info!("📂 Loading build plan {}", args.plan.display());
    let plan = BuildPlan::load_from_file(&args.plan)?;
    let mut model = FrequencyModel::new()?;

    if let Some(path) = &plan.ignore_file {
        let words = read_ignore_file(path)?;
        info!("ignoring {} words from {}", words.len(), path.display());
        model.add_ignore_words(words);
    }

    if let Some(spec) = &plan.dictionary {
        let speller = build_speller(spec)?;
        info!("🔤 Dictionary ready with {} words", speller.word_count());
        model.set_speller(Arc::new(speller));
        if spec.expand {
            let cache_path = expansion_cache_path(spec)?;
            model.add_dictionary_words(cache_path.as_deref())?;
        }
    }

    for source in &plan.sources {
        info!("📖 Ingesting {}", source.path.display());
        match source.kind {
            SourceKind::Sentences => {
                model.add_sentence_file(&source.path, source.accept_unknown)?
            }
            SourceKind::Words => model.add_word_file(&source.path)?,
            SourceKind::WordCounts => {
                let rows = model.add_word_count_file(&source.path)?;
                info!("applied {} count rows", rows);
            }
        }
    }

    let mut list = model.export(plan.export_options());
    if let Some(filter) = &plan.filter {
        list.filter_bigrams(filter.max_bigrams_per_word, filter.max_bigram_target_f);
    }
    let output = args.output.unwrap_or_else(|| plan.output.clone());
    list.write_to_path(&output)?;
    info!("✅ Wrote {} words to {}", list.word_count(), output.display());

    reports::print_build_summary(&model, &list);
    Ok(())
}

fn build_speller(spec: &DictionarySpec) -> WfResult<MemorySpeller> {
    let mut speller = match &spec.word_file {
        Some(path) => MemorySpeller::from_word_file(path)?,
        None => MemorySpeller::new(),
    };
    if let Some(flag) = spec.need_affix {
        speller.set_need_affix(flag);
    }
    if let Some(flag) = spec.forbidden {
        speller.set_forbidden(flag);
    }
    if let Some(path) = &spec.stem_file {
        let stems = speller.load_stem_table(path)?;
        info!("loaded {} stems", stems);
    }
    if let Some(path) = &spec.affix_file {
        let rules = speller.load_affix_table(path)?;
        info!("loaded {} affix rules", rules);
    }
    if spec.stem_file.is_some() {
        let indexed = speller.index_expansions();
        info!("indexed {} expanded surface forms", indexed);
    }
    Ok(speller)
}

fn expansion_cache_path(spec: &DictionarySpec) -> WfResult<Option<PathBuf>> {
    let Some(dir) = &spec.cache_dir else {
        return Ok(None);
    };
    let tables = spec.table_paths();
    if tables.is_empty() {
        return Ok(None);
    }
    fs::create_dir_all(dir)?;
    let fingerprint = cache::dictionary_fingerprint(&tables)?;
    Ok(Some(dir.join(format!("{}.words", &fingerprint[..16]))))
}
