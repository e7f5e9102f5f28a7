use clap::Args;
use std::path::PathBuf;
use tracing::info;
use wordforge::combined::WordlistCombined;
use wordforge::dicttool;
use wordforge::error::WfResult;

#[derive(Args, Debug, Clone)]
pub struct CompileArgs {
    /// Combined list to compile
    pub input: PathBuf,

    /// Target .dict file, or a directory for a derived file name
    pub target: PathBuf,

    /// Path to the AOSP dicttool jar
    #[arg(long, default_value = "dicttool_aosp.jar")]
    pub dicttool: PathBuf,

    /// Keep an existing target instead of replacing it
    #[arg(long)]
    pub keep_existing: bool,
}

pub fn run(args: CompileArgs) -> WfResult<()> {
    let list = WordlistCombined::read_from_path(&args.input)?;
    let path = dicttool::compile(&list, &args.dicttool, &args.target, !args.keep_existing)?;
    info!("✅ Compiled {}", path.display());
    Ok(())
}
