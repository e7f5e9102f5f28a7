use clap::Args;
use std::path::PathBuf;
use tracing::info;
use wordforge::combined::WordlistCombined;
use wordforge::error::WfResult;

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    pub input: PathBuf,

    #[arg(short, long)]
    pub output: PathBuf,

    /// Most bigram rows a word may keep
    #[arg(long, default_value_t = 3)]
    pub max_bigrams: usize,

    /// Drop rows whose target word is more frequent than this
    #[arg(long, default_value_t = 200)]
    pub max_target_f: u32,
}

pub fn run(args: FilterArgs) -> WfResult<()> {
    let mut list = WordlistCombined::read_from_path(&args.input)?;
    let before = list.bigram_count();
    list.filter_bigrams(args.max_bigrams, args.max_target_f);
    let after = list.bigram_count();
    list.write_to_path(&args.output)?;
    info!(
        "✅ Kept {} of {} bigram rows, wrote {}",
        after,
        before,
        args.output.display()
    );
    Ok(())
}
