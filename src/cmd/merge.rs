use clap::Args;
use std::path::PathBuf;
use tracing::info;
use wordforge::combined::{FreqPolicy, MergeOptions, WordlistCombined};
use wordforge::error::WfResult;

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// List that receives the merge
    pub target: PathBuf,

    /// List merged into the target
    pub source: PathBuf,

    /// Where the merged list is written
    #[arg(short, long)]
    pub output: PathBuf,

    /// How conflicting frequencies reconcile
    #[arg(long, value_enum, default_value_t = FreqPolicy::Keep)]
    pub frequency: FreqPolicy,

    /// Do not admit words missing from the target
    #[arg(long)]
    pub no_new_words: bool,

    #[arg(long)]
    pub no_bigrams: bool,

    #[arg(long)]
    pub no_shortcuts: bool,

    #[arg(long)]
    pub no_offensive: bool,

    #[arg(long)]
    pub no_not_a_word: bool,

    #[arg(long)]
    pub no_unknown: bool,
}

pub fn run(args: MergeArgs) -> WfResult<()> {
    let mut target = WordlistCombined::read_from_path(&args.target)?;
    let source = WordlistCombined::read_from_path(&args.source)?;
    let before = target.word_count();

    let options = MergeOptions {
        add_words: !args.no_new_words,
        frequency: args.frequency,
        possibly_offensive: !args.no_offensive,
        not_a_word: !args.no_not_a_word,
        shortcuts: !args.no_shortcuts,
        bigrams: !args.no_bigrams,
        unknown: !args.no_unknown,
    };
    target.merge(&source.words, &options);
    target.write_to_path(&args.output)?;
    info!(
        "✅ Merged {} source words, target grew {} -> {}, wrote {}",
        source.word_count(),
        before,
        target.word_count(),
        args.output.display()
    );
    Ok(())
}
