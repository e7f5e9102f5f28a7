use crate::reports;
use clap::Args;
use std::path::PathBuf;
use wordforge::combined::WordlistCombined;
use wordforge::error::WfResult;

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    pub input: PathBuf,

    /// How many of the most frequent words to show
    #[arg(long, default_value_t = 15)]
    pub top: usize,
}

pub fn run(args: StatsArgs) -> WfResult<()> {
    let list = WordlistCombined::read_from_path(&args.input)?;
    reports::print_list_report(&list, args.top);
    Ok(())
}
